//! Ordered instruction predicates used to locate a call site.

use crate::decoder::{Instruction, MethodRef, Operand};
use crate::opcode::Opcode;
use crate::result::{Error, Result};

/// Predicate over a single instruction.
///
/// Unset fields match anything, so `CodeMatch::any()` accepts every instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeMatch {
    opcode: Option<Opcode>,
    operand: Option<Operand>,
}

impl CodeMatch {
    /// Matches any instruction.
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches instructions with the given opcode, whatever their operand.
    pub fn op(op: Opcode) -> Self {
        Self {
            opcode: Some(op),
            operand: None,
        }
    }

    /// Matches a `call` (not `callvirt`) to exactly this method.
    pub fn call(method: MethodRef) -> Self {
        Self::op(Opcode::Call).with_operand(Operand::Method(method))
    }

    /// Additionally require the operand to equal `operand`.
    pub fn with_operand(mut self, operand: Operand) -> Self {
        self.operand = Some(operand);
        self
    }

    /// Tests the predicate against one instruction. Labels never take part.
    pub fn matches(&self, instruction: &Instruction) -> bool {
        self.opcode.is_none_or(|op| op == instruction.op)
            && self
                .operand
                .as_ref()
                .is_none_or(|operand| *operand == instruction.operand)
    }
}

/// Non-empty ordered sequence of predicates matched against consecutive instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    matches: Vec<CodeMatch>,
}

impl Pattern {
    /// Builds a pattern, rejecting an empty predicate list.
    pub fn new(matches: Vec<CodeMatch>) -> Result<Self> {
        if matches.is_empty() {
            return Err(Error::EmptyPattern);
        }
        Ok(Self { matches })
    }

    /// Number of instructions a match spans.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Always false; a pattern holds at least one predicate.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns the first index `>= start` where every predicate holds on consecutive
    /// instructions.
    pub fn find_from(&self, instructions: &[Instruction], start: usize) -> Option<usize> {
        let tail = instructions.get(start..)?;
        tail.windows(self.matches.len())
            .position(|window| {
                self.matches
                    .iter()
                    .zip(window)
                    .all(|(predicate, instruction)| predicate.matches(instruction))
            })
            .map(|offset| start + offset)
    }
}
