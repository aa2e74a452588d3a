//! Turns textual routine listings into instruction sequences and back.
//!
//! A listing looks like this:
//!
//! ```text
//! .method Tool::Forge(Item,bool,GameLocation):bool
//!        ldarg.0
//!        ldarg.1
//!        call static BaseEnchantment::GetEnchantmentFromItem(Item,Item):BaseEnchantment
//!        stloc.0
//!        ldloc.0
//!        brfalse L_skip      # jump targets are plain labels
//! L_skip: ret
//! ```

use crate::opcode::{Opcode, OperandKind};
use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Reference to a callable routine: declaring type, name and stack signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    /// Declaring type, e.g. `BaseEnchantment`.
    pub declaring_type: String,
    /// Method name.
    pub name: String,
    /// Declared parameter types, excluding the receiver.
    pub params: Vec<String>,
    /// Return type (`void` for none).
    pub returns: String,
    /// Whether the method takes no receiver.
    pub is_static: bool,
}

impl MethodRef {
    /// Builds a static method reference.
    pub fn new_static(declaring_type: &str, name: &str, params: &[&str], returns: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            returns: returns.to_string(),
            is_static: true,
        }
    }

    /// Builds an instance method reference.
    pub fn new_instance(declaring_type: &str, name: &str, params: &[&str], returns: &str) -> Self {
        Self {
            is_static: false,
            ..Self::new_static(declaring_type, name, params, returns)
        }
    }

    /// Types the call pops off the stack, receiver first.
    pub fn stack_params(&self) -> Vec<&str> {
        let receiver = (!self.is_static).then_some(self.declaring_type.as_str());
        receiver
            .into_iter()
            .chain(self.params.iter().map(String::as_str))
            .collect()
    }

    /// Number of stack slots the call consumes.
    pub fn arity(&self) -> usize {
        self.params.len() + usize::from(!self.is_static)
    }

    /// Returns true if a call to `other` can replace a call to `self` without
    /// disturbing the surrounding stack: same consumed types, same produced type.
    pub fn is_call_compatible(&self, other: &MethodRef) -> bool {
        self.stack_params() == other.stack_params() && self.returns == other.returns
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(
            f,
            "{}::{}({}):{}",
            self.declaring_type,
            self.name,
            self.params.join(","),
            self.returns
        )
    }
}

impl FromStr for MethodRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMethodRef(s.to_string());
        let trimmed = s.trim();
        let (is_static, rest) = match trimmed.strip_prefix("static ") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed.strip_prefix("instance ").unwrap_or(trimmed)),
        };

        let open = rest.find('(').ok_or_else(invalid)?;
        let close = rest.rfind(')').ok_or_else(invalid)?;
        if close < open {
            return Err(invalid());
        }
        let (declaring_type, name) = rest[..open].rsplit_once("::").ok_or_else(invalid)?;
        if declaring_type.is_empty() || name.is_empty() {
            return Err(invalid());
        }
        let returns = rest[close + 1..]
            .trim()
            .strip_prefix(':')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(invalid)?;

        Ok(Self {
            declaring_type: declaring_type.trim().to_string(),
            name: name.trim().to_string(),
            params: split_params(&rest[open + 1..close]),
            returns: returns.to_string(),
            is_static,
        })
    }
}

/// Splits a parameter list on top-level commas so `Dictionary<K,V>` stays whole.
fn split_params(list: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                params.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// A jump target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub String);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instruction operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    None,
    Method(MethodRef),
    Int(i64),
    Str(String),
    Label(Label),
    Local(u16),
    Field(String),
    Type(String),
}

impl Operand {
    /// The kind of this operand.
    pub const fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Method(_) => OperandKind::Method,
            Operand::Int(_) => OperandKind::Int,
            Operand::Str(_) => OperandKind::Str,
            Operand::Label(_) => OperandKind::Label,
            Operand::Local(_) => OperandKind::Local,
            Operand::Field(_) => OperandKind::Field,
            Operand::Type(_) => OperandKind::Type,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Method(m) => write!(f, "{m}"),
            Operand::Int(v) => write!(f, "{v}"),
            Operand::Str(s) => write!(f, "\"{}\"", quote(s)),
            Operand::Label(l) => write!(f, "{l}"),
            Operand::Local(slot) => write!(f, "{slot}"),
            Operand::Field(name) | Operand::Type(name) => f.write_str(name),
        }
    }
}

/// Single instruction: opcode, operand, and the labels that point at it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// Opcode
    pub op: Opcode,
    /// Operand; its kind always matches `op.operand_kind()`.
    pub operand: Operand,
    /// Labels that branch instructions may target.
    pub labels: Vec<Label>,
}

impl Instruction {
    /// Builds an instruction, checking the operand kind against the opcode.
    pub fn new(op: Opcode, operand: Operand) -> Result<Self> {
        let expected = op.operand_kind();
        if operand.kind() != expected {
            return Err(Error::InvalidOperand {
                op,
                expected,
                found: operand.kind(),
            });
        }
        Ok(Self {
            op,
            operand,
            labels: Vec::new(),
        })
    }

    /// Builds an operand-less instruction.
    pub fn bare(op: Opcode) -> Result<Self> {
        Self::new(op, Operand::None)
    }

    /// Builds a `call` to the given method.
    pub fn call(method: MethodRef) -> Self {
        Self {
            op: Opcode::Call,
            operand: Operand::Method(method),
            labels: Vec::new(),
        }
    }

    /// Attaches a label to this instruction.
    pub fn with_label(mut self, label: &str) -> Self {
        self.labels.push(Label(label.to_string()));
        self
    }

    /// The callee, if this is a call.
    pub fn callee(&self) -> Option<&MethodRef> {
        match (&self.operand, self.op.is_call()) {
            (Operand::Method(m), true) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.labels {
            write!(f, "{label}: ")?;
        }
        if matches!(self.operand, Operand::None) {
            write!(f, "{}", self.op)
        } else {
            write!(f, "{} {}", self.op, self.operand)
        }
    }
}

/// A routine: its signature plus its body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    /// Signature of the routine.
    pub method: MethodRef,
    /// Instruction body.
    pub body: Vec<Instruction>,
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".method {}", self.method)?;
        f.write_str(&print_listing(&self.body))
    }
}

/// Parses a routine listing with a `.method` header.
pub fn parse_routine(listing: &str) -> Result<Routine> {
    let mut header = None;
    let mut rest = String::with_capacity(listing.len());
    for line in listing.lines() {
        match line.trim().strip_prefix(".method") {
            Some(sig) if header.is_none() => header = Some(sig.trim().parse::<MethodRef>()?),
            _ => rest.push_str(line),
        }
        rest.push('\n');
    }
    let method = header.ok_or(Error::MissingHeader)?;
    let body = parse_listing(&rest)?;
    Ok(Routine { method, body })
}

/// Parses a headerless listing into instructions.
///
/// Line numbers in errors are zero-based, matching the position in `listing`.
pub fn parse_listing(listing: &str) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let mut pending: Vec<Label> = Vec::new();

    for (line_no, raw) in listing.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() || line.starts_with(".method") {
            continue;
        }
        let parse_err = |msg: &str| Error::ParseError {
            line: line_no,
            msg: msg.to_string(),
            raw: raw.to_string(),
        };

        let mut rest = line;
        loop {
            let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let token = &rest[..token_end];
            match token.strip_suffix(':') {
                Some(name) if is_label_ident(name) => {
                    pending.push(Label(name.to_string()));
                    rest = rest[token_end..].trim_start();
                    if rest.is_empty() {
                        break;
                    }
                }
                _ => break,
            }
        }
        if rest.is_empty() {
            continue;
        }

        let mnemonic_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let op = rest[..mnemonic_end]
            .parse::<Opcode>()
            .map_err(|e| parse_err(&e.to_string()))?;
        let operand_text = rest[mnemonic_end..].trim();
        let operand = parse_operand(op.operand_kind(), operand_text).map_err(|msg| parse_err(&msg))?;

        let mut instruction = Instruction::new(op, operand).map_err(|e| parse_err(&e.to_string()))?;
        instruction.labels = std::mem::take(&mut pending);
        instructions.push(instruction);
    }

    if let Some(label) = pending.into_iter().next() {
        return Err(Error::DanglingLabel(label.0));
    }
    validate_labels(&instructions)?;
    Ok(instructions)
}

/// Prints instructions one per line, labels first.
pub fn print_listing(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}

/// Checks that labels are unique and every branch target exists.
pub fn validate_labels(instructions: &[Instruction]) -> Result<()> {
    let mut defined = HashSet::new();
    for label in instructions.iter().flat_map(|i| &i.labels) {
        if !defined.insert(label) {
            return Err(Error::DuplicateLabel(label.0.clone()));
        }
    }
    for instruction in instructions {
        if let Operand::Label(target) = &instruction.operand
            && !defined.contains(target)
        {
            return Err(Error::UndefinedLabel(target.0.clone()));
        }
    }
    Ok(())
}

fn parse_operand(kind: OperandKind, text: &str) -> std::result::Result<Operand, String> {
    if kind != OperandKind::None && text.is_empty() {
        return Err(format!("missing {kind} operand"));
    }
    match kind {
        OperandKind::None if text.is_empty() => Ok(Operand::None),
        OperandKind::None => Err(format!("unexpected operand `{text}`")),
        OperandKind::Method => text
            .parse::<MethodRef>()
            .map(Operand::Method)
            .map_err(|e| e.to_string()),
        OperandKind::Int => parse_int(text)
            .map(Operand::Int)
            .ok_or_else(|| format!("invalid integer `{text}`")),
        OperandKind::Str => unquote(text)
            .map(Operand::Str)
            .ok_or_else(|| format!("invalid string literal `{text}`")),
        OperandKind::Label if is_label_ident(text) => Ok(Operand::Label(Label(text.to_string()))),
        OperandKind::Label => Err(format!("invalid label `{text}`")),
        OperandKind::Local => text
            .parse::<u16>()
            .map(Operand::Local)
            .map_err(|_| format!("invalid local slot `{text}`")),
        OperandKind::Field => Ok(Operand::Field(text.to_string())),
        OperandKind::Type => Ok(Operand::Type(text.to_string())),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits.strip_prefix("0x") {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u64::from_str_radix(hex, 16).ok()?
        }
        None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse::<u64>().ok()?,
        _ => return None,
    };
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Escapes a string literal body so that [`unquote`] reads it back unchanged.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

fn unquote(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                'u' => {
                    if chars.next()? != '{' {
                        return None;
                    }
                    let mut hex = String::new();
                    loop {
                        match chars.next()? {
                            '}' => break,
                            digit => hex.push(digit),
                        }
                    }
                    out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
                }
                other => out.push(other),
            },
            '"' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

fn is_label_ident(s: &str) -> bool {
    !s.is_empty()
        && !s.contains("::")
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..idx],
            _ => {}
        }
    }
    line
}
