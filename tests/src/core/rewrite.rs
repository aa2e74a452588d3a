use anvil_core::patcher::{Patcher, Transpiler};
use anvil_core::pattern::{CodeMatch, Pattern};
use anvil_core::rewrite::{DiagnosticKind, Edit, Severity, rewrite};
use anvil_core::{Error, Instruction, MethodRef, Opcode, Routine};
use pretty_assertions::assert_eq;

fn lookup() -> MethodRef {
    MethodRef::new_static("BaseEnchantment", "GetEnchantmentFromItem", &["Item", "Item"], "BaseEnchantment")
}

fn substitute() -> MethodRef {
    MethodRef::new_static("ForgeChoice", "SubstituteEnchantment", &["Item", "Item"], "BaseEnchantment")
}

fn lookup_shape() -> Pattern {
    Pattern::new(vec![
        CodeMatch::op(Opcode::Ldarg0),
        CodeMatch::op(Opcode::Ldarg1),
        CodeMatch::call(lookup()),
        CodeMatch::op(Opcode::Stloc0),
        CodeMatch::op(Opcode::Ldloc0),
    ])
    .unwrap()
}

fn bare(op: Opcode) -> Instruction {
    Instruction::bare(op).unwrap()
}

/// `ldarg.0; ldarg.1; call lookup; stloc.0; ldloc.0; ret`, with labels on two of them.
fn body() -> Vec<Instruction> {
    vec![
        bare(Opcode::Ldarg0).with_label("L_entry"),
        bare(Opcode::Ldarg1),
        Instruction::call(lookup()).with_label("L_call"),
        bare(Opcode::Stloc0),
        bare(Opcode::Ldloc0),
        bare(Opcode::Ret),
    ]
}

#[test]
fn test_canonical_shape_redirects_one_call() {
    let input = body();
    let edits = [Edit::required("substitute", lookup_shape(), 2, substitute())];
    let outcome = rewrite(&input, &edits);

    assert!(outcome.is_patched());
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.instructions.len(), input.len());
    for (index, (before, after)) in input.iter().zip(&outcome.instructions).enumerate() {
        assert_eq!(before.labels, after.labels);
        if index == 2 {
            assert_eq!(after.callee(), Some(&substitute()));
        } else {
            assert_eq!(before, after);
        }
    }
    assert_eq!(outcome.applied[0].index, 2);
    assert_eq!(outcome.applied[0].previous, lookup());
}

#[test]
fn test_missing_shape_leaves_input_untouched() {
    let mut input = body();
    input.swap(3, 4);
    let edits = [Edit::required("substitute", lookup_shape(), 2, substitute())];
    let outcome = rewrite(&input, &edits);

    assert!(!outcome.is_patched());
    assert_eq!(outcome.instructions, input);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].severity, Severity::Error);
    assert_eq!(
        outcome.diagnostics[0].kind,
        DiagnosticKind::PatternNotFound { search_start: 0 }
    );
}

#[test]
fn test_one_failed_required_edit_discards_the_rest() {
    let innate = MethodRef::new_static("MeleeWeapon", "attemptAddRandomInnateEnchantment", &["Item"], "Item");
    let edits = [
        Edit::required("substitute", lookup_shape(), 2, substitute()),
        Edit::required("innate", Pattern::new(vec![CodeMatch::call(innate.clone())]).unwrap(), 0, innate),
    ];
    let outcome = rewrite(&body(), &edits);

    assert!(!outcome.is_patched());
    assert!(outcome.applied.is_empty());
    assert_eq!(outcome.instructions, body());
    assert_eq!(outcome.diagnostics[0].edit, "innate");
    assert_eq!(
        outcome.diagnostics[0].kind,
        DiagnosticKind::PatternNotFound { search_start: 1 }
    );
}

#[test]
fn test_optional_edit_only_warns() {
    let other = MethodRef::new_static("Game1", "IncrementForgeStats", &[], "void");
    let edits = [
        Edit::required("substitute", lookup_shape(), 2, substitute()),
        Edit::optional("stats", Pattern::new(vec![CodeMatch::call(other.clone())]).unwrap(), 0, other),
    ];
    let outcome = rewrite(&body(), &edits);

    assert!(outcome.is_patched());
    assert!(!outcome.has_errors());
    assert_eq!(outcome.diagnostics[0].severity, Severity::Warning);
}

#[rstest::rstest]
#[case::past_the_end(9, DiagnosticKind::TargetOutOfRange { index: 9 })]
#[case::not_a_call(0, DiagnosticKind::NotACall { index: 0, found: Opcode::Ldarg0 })]
fn test_bad_offsets_are_reported(#[case] offset: usize, #[case] expected: DiagnosticKind) {
    let outcome = rewrite(&body(), &[Edit::required("substitute", lookup_shape(), offset, substitute())]);
    assert_eq!(outcome.diagnostics[0].kind, expected);
    assert_eq!(outcome.instructions, body());
}

#[test]
fn test_incompatible_replacement_is_rejected() {
    let wrong = MethodRef::new_static("ForgeChoice", "SubstituteEnchantment", &["Item"], "BaseEnchantment");
    let outcome = rewrite(&body(), &[Edit::required("substitute", lookup_shape(), 2, wrong)]);
    assert!(matches!(
        outcome.diagnostics[0].kind,
        DiagnosticKind::IncompatibleCallee { .. }
    ));
}

struct Redirect {
    target: MethodRef,
}

impl Transpiler for Redirect {
    fn name(&self) -> &'static str {
        "Redirect"
    }

    fn target(&self) -> &MethodRef {
        &self.target
    }

    fn edits(&self) -> anvil_core::Result<Vec<Edit>> {
        Ok(vec![Edit::required("substitute", lookup_shape(), 2, substitute())])
    }
}

#[test]
fn test_patcher_records_and_snitches() {
    let method = MethodRef::new_instance("Tool", "Forge", &["Item", "bool"], "bool");
    let mut routine = Routine {
        method: method.clone(),
        body: body(),
    };
    let mut patcher = Patcher::new("tests.owner");
    let outcome = patcher.patch(&mut routine, &Redirect { target: method.clone() }).unwrap();

    assert!(outcome.is_patched());
    assert!(anvil_core::calls(&routine.body, &substitute()));
    let key = method.to_string();
    assert_eq!(patcher.patched_routines().collect::<Vec<_>>(), vec![key.as_str()]);
    assert_eq!(patcher.patches_for(&key)[0].redirected, 1);

    let summary = patcher.snitch(&key, Some("tests.owner"), false).unwrap();
    assert_eq!(
        summary,
        format!("Patched method {key}\n\tTranspiled with method: Redirect (owner tests.owner, 1 call site(s))")
    );
    assert_eq!(patcher.snitch_all(None, true), vec![summary.clone()]);
    assert!(patcher.snitch(&key, Some("someone.else"), true).is_none());
}

#[test]
fn test_patcher_rejects_other_routines() {
    let mut routine = Routine {
        method: MethodRef::new_instance("Tool", "Sharpen", &[], "void"),
        body: body(),
    };
    let target = MethodRef::new_instance("Tool", "Forge", &["Item", "bool"], "bool");
    let err = Patcher::new("tests.owner")
        .patch(&mut routine, &Redirect { target })
        .unwrap_err();
    assert!(matches!(err, Error::TargetMismatch { transpiler: "Redirect", .. }));
    assert_eq!(routine.body, body());
}
