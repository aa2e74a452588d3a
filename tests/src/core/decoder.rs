use anvil_core::decoder::{parse_listing, parse_routine, print_listing};
use anvil_core::{Error, Instruction, MethodRef, Opcode, Operand};
use rstest::rstest;

const LISTING: &str = "\
.method instance Tool::Forge(Item,bool):bool
ldarg.0
ldarg.1
call static BaseEnchantment::GetEnchantmentFromItem(Item,Item):BaseEnchantment
stloc.0
ldloc.0
brfalse L_skip   # no enchantment
ldstr \"forged\"
pop
L_skip: ldc.i4 -1
ret
";

#[test]
fn test_listing_roundtrip() {
    let routine = parse_routine(LISTING).unwrap();
    assert_eq!(routine.method.to_string(), "Tool::Forge(Item,bool):bool");
    assert_eq!(routine.body.len(), 10);
    assert_eq!(routine.body[8].labels[0].0, "L_skip");
    assert_eq!(routine.body[8].operand, Operand::Int(-1));
    assert_eq!(routine.body[6].operand, Operand::Str("forged".into()));

    let reparsed = parse_routine(&routine.to_string()).unwrap();
    assert_eq!(reparsed, routine);
}

#[test]
fn test_instance_call_keeps_receiver_on_stack() {
    let method: MethodRef = "instance Tool::AddEnchantment(BaseEnchantment):bool".parse().unwrap();
    assert!(!method.is_static);
    assert_eq!(method.arity(), 2);
    assert_eq!(method.stack_params(), vec!["Tool", "BaseEnchantment"]);

    let generic: MethodRef = "static A::B(Dictionary<string,int>,bool):void".parse().unwrap();
    assert_eq!(generic.params, vec!["Dictionary<string,int>", "bool"]);
}

#[rstest]
#[case::unknown_opcode("frobnicate\n", "unknown opcode")]
#[case::missing_operand("call\n", "missing")]
#[case::stray_operand("ret 4\n", "unexpected operand")]
#[case::bad_integer("ldc.i4 four\n", "invalid integer")]
#[case::bad_method("call Forge\n", "invalid method reference")]
fn test_malformed_lines_fail(#[case] listing: &str, #[case] fragment: &str) {
    let err = parse_listing(listing).unwrap_err();
    match err {
        Error::ParseError { line, msg, .. } => {
            assert_eq!(line, 0);
            assert!(msg.contains(fragment), "{msg}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[rstest]
#[case::dangling("nop\nL_end:\n", Error::DanglingLabel("L_end".into()))]
#[case::duplicate("L_a: nop\nL_a: ret\n", Error::DuplicateLabel("L_a".into()))]
#[case::undefined("br L_nowhere\nret\n", Error::UndefinedLabel("L_nowhere".into()))]
fn test_label_errors(#[case] listing: &str, #[case] expected: Error) {
    assert_eq!(parse_listing(listing).unwrap_err(), expected);
}

#[test]
fn test_missing_header() {
    assert_eq!(parse_routine("nop\nret\n").unwrap_err(), Error::MissingHeader);
}

#[test]
fn test_operand_kind_is_checked() {
    let err = Instruction::new(Opcode::Call, Operand::Int(3)).unwrap_err();
    assert!(matches!(err, Error::InvalidOperand { op: Opcode::Call, .. }));

    let printed = print_listing(&[
        Instruction::bare(Opcode::Nop).unwrap().with_label("L_top"),
        Instruction::new(Opcode::Br, Operand::Label(anvil_core::decoder::Label("L_top".into()))).unwrap(),
    ]);
    assert_eq!(printed, "L_top: nop\nbr L_top\n");
}

#[rstest]
#[case::bell("a\u{7}b")]
#[case::escape_and_delete("\u{1b}[0m\u{7f}")]
#[case::quotes_and_backslashes("say \"hi\" \\ bye")]
#[case::whitespace_controls("tab\there\r\nnext\0end")]
#[case::comment_marker("# kept")]
fn test_string_literals_roundtrip(#[case] text: &str) {
    let original = vec![
        Instruction::new(Opcode::Ldstr, Operand::Str(text.to_string())).unwrap(),
        Instruction::bare(Opcode::Ret).unwrap(),
    ];
    let printed = print_listing(&original);
    assert_eq!(printed.lines().count(), 2);
    assert_eq!(parse_listing(&printed).unwrap(), original);
}

#[rstest]
#[case::min_decimal("-9223372036854775808", Some(i64::MIN))]
#[case::min_hex("-0x8000000000000000", Some(i64::MIN))]
#[case::max("9223372036854775807", Some(i64::MAX))]
#[case::double_minus("--5", None)]
#[case::minus_plus("-+5", None)]
#[case::plus("+5", None)]
#[case::overflow("9223372036854775808", None)]
#[case::empty_hex("0x", None)]
fn test_integer_literals(#[case] literal: &str, #[case] expected: Option<i64>) {
    let parsed = parse_listing(&format!("ldc.i4 {literal}\n"));
    match expected {
        Some(value) => {
            assert_eq!(parsed.unwrap()[0].operand, Operand::Int(value));
            let printed = print_listing(&[Instruction::new(Opcode::LdcI4, Operand::Int(value)).unwrap()]);
            assert_eq!(parse_listing(&printed).unwrap()[0].operand, Operand::Int(value));
        }
        None => assert!(matches!(parsed, Err(Error::ParseError { .. }))),
    }
}
