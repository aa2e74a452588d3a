//! Core results and error types

use crate::opcode::{Opcode, OperandKind};
use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A label was attached to the end of a listing with no instruction after it.
    #[error("label '{0}' does not precede any instruction")]
    DanglingLabel(String),

    /// The same label was declared twice in one routine.
    #[error("label '{0}' declared more than once")]
    DuplicateLabel(String),

    /// A pattern was constructed with no predicates.
    #[error("pattern must contain at least one predicate")]
    EmptyPattern,

    /// The operand does not fit the opcode.
    #[error("opcode {op} expects a {expected} operand, got {found}")]
    InvalidOperand {
        /// The opcode being constructed.
        op: Opcode,
        /// The operand kind the opcode requires.
        expected: OperandKind,
        /// The operand kind that was supplied.
        found: OperandKind,
    },

    /// A method reference could not be parsed.
    #[error("invalid method reference: {0}")]
    InvalidMethodRef(String),

    /// Failed to parse a listing at the specified line.
    #[error("listing parse error at line {line}: {msg} ⇒ `{raw}`")]
    ParseError {
        /// The line number where parsing failed.
        line: usize,
        /// Description of the parsing error.
        msg: String,
        /// The raw content that failed to parse.
        raw: String,
    },

    /// A routine listing is missing its `.method` header.
    #[error("routine listing has no .method header")]
    MissingHeader,

    /// A transpiler was asked to patch a routine other than its target.
    #[error("transpiler '{transpiler}' targets {expected}, not {found}")]
    TargetMismatch {
        /// Name of the transpiler.
        transpiler: &'static str,
        /// The routine the transpiler declares as its target.
        expected: String,
        /// The routine it was handed.
        found: String,
    },

    /// A branch refers to a label that no instruction carries.
    #[error("branch to undefined label '{0}'")]
    UndefinedLabel(String),

    /// The mnemonic is not part of the supported instruction set.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
