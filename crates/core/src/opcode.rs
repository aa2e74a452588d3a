//! The instruction set understood by the listing decoder and the rewriter.
//!
//! This is the subset of stack-machine opcodes that shows up in the routines we
//! patch. Each opcode fixes the kind of operand it carries; see
//! [`Opcode::operand_kind`].

use crate::result::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stack-machine opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Nop,
    Ldarg0,
    Ldarg1,
    Ldarg2,
    Ldarg3,
    LdargS,
    Ldloc0,
    Ldloc1,
    Ldloc2,
    Ldloc3,
    LdlocS,
    Stloc0,
    Stloc1,
    Stloc2,
    Stloc3,
    StlocS,
    Ldnull,
    LdcI4,
    Ldstr,
    Ldfld,
    Stfld,
    Call,
    Callvirt,
    Newobj,
    Isinst,
    Br,
    Brtrue,
    Brfalse,
    Beq,
    Bne,
    Dup,
    Pop,
    Ret,
}

/// The kind of operand an opcode carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    None,
    Method,
    Int,
    Str,
    Label,
    Local,
    Field,
    Type,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::None => "empty",
            OperandKind::Method => "method",
            OperandKind::Int => "integer",
            OperandKind::Str => "string",
            OperandKind::Label => "label",
            OperandKind::Local => "local slot",
            OperandKind::Field => "field",
            OperandKind::Type => "type",
        };
        f.write_str(name)
    }
}

const MNEMONICS: &[(Opcode, &str)] = &[
    (Opcode::Nop, "nop"),
    (Opcode::Ldarg0, "ldarg.0"),
    (Opcode::Ldarg1, "ldarg.1"),
    (Opcode::Ldarg2, "ldarg.2"),
    (Opcode::Ldarg3, "ldarg.3"),
    (Opcode::LdargS, "ldarg.s"),
    (Opcode::Ldloc0, "ldloc.0"),
    (Opcode::Ldloc1, "ldloc.1"),
    (Opcode::Ldloc2, "ldloc.2"),
    (Opcode::Ldloc3, "ldloc.3"),
    (Opcode::LdlocS, "ldloc.s"),
    (Opcode::Stloc0, "stloc.0"),
    (Opcode::Stloc1, "stloc.1"),
    (Opcode::Stloc2, "stloc.2"),
    (Opcode::Stloc3, "stloc.3"),
    (Opcode::StlocS, "stloc.s"),
    (Opcode::Ldnull, "ldnull"),
    (Opcode::LdcI4, "ldc.i4"),
    (Opcode::Ldstr, "ldstr"),
    (Opcode::Ldfld, "ldfld"),
    (Opcode::Stfld, "stfld"),
    (Opcode::Call, "call"),
    (Opcode::Callvirt, "callvirt"),
    (Opcode::Newobj, "newobj"),
    (Opcode::Isinst, "isinst"),
    (Opcode::Br, "br"),
    (Opcode::Brtrue, "brtrue"),
    (Opcode::Brfalse, "brfalse"),
    (Opcode::Beq, "beq"),
    (Opcode::Bne, "bne.un"),
    (Opcode::Dup, "dup"),
    (Opcode::Pop, "pop"),
    (Opcode::Ret, "ret"),
];

impl Opcode {
    /// Returns the operand kind this opcode requires.
    pub const fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::Call | Opcode::Callvirt | Opcode::Newobj => OperandKind::Method,
            Opcode::LdcI4 => OperandKind::Int,
            Opcode::Ldstr => OperandKind::Str,
            Opcode::Br | Opcode::Brtrue | Opcode::Brfalse | Opcode::Beq | Opcode::Bne => {
                OperandKind::Label
            }
            Opcode::LdargS | Opcode::LdlocS | Opcode::StlocS => OperandKind::Local,
            Opcode::Ldfld | Opcode::Stfld => OperandKind::Field,
            Opcode::Isinst => OperandKind::Type,
            _ => OperandKind::None,
        }
    }

    /// Returns true if the opcode invokes a method.
    #[inline]
    pub const fn is_call(self) -> bool {
        matches!(self, Opcode::Call | Opcode::Callvirt)
    }

    /// Returns true if the opcode transfers control to a label.
    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(self.operand_kind(), OperandKind::Label)
    }

    /// The textual mnemonic used in listings.
    pub fn mnemonic(self) -> &'static str {
        MNEMONICS
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, name)| *name)
            .unwrap_or("?")
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        // Short-form branches decode to their long form; offsets are not modelled.
        let normalized = match lowered.as_str() {
            "br.s" => "br",
            "brtrue.s" => "brtrue",
            "brfalse.s" => "brfalse",
            "beq.s" => "beq",
            "bne.un.s" => "bne.un",
            "ldc.i4.s" => "ldc.i4",
            other => other,
        };
        MNEMONICS
            .iter()
            .find(|(_, name)| *name == normalized)
            .map(|(op, _)| *op)
            .ok_or_else(|| Error::UnknownOpcode(s.to_string()))
    }
}
