//! Call-site rewriting.
//!
//! An [`Edit`] locates a call with a [`Pattern`] and overwrites the instruction at
//! `match_start + offset` with a call to a different, stack-compatible callee. The
//! instruction keeps its labels and nothing is inserted or removed, so every other
//! index and every jump target in the routine stays valid.
//!
//! ```text
//! // before                                   // after
//! ldarg.0                                      ldarg.0
//! ldarg.1                                      ldarg.1
//! call BaseEnchantment::GetEnchantmentFromItem call Shim::SubstituteEnchantment
//! stloc.0                                      stloc.0
//! ldloc.0                                      ldloc.0
//! ```
//!
//! Edits run in order. Each one scans from the instruction after the previous
//! edit's match start. If any required edit cannot be applied the whole rewrite is
//! abandoned and the original sequence comes back untouched.

use crate::decoder::{Instruction, MethodRef, Operand};
use crate::opcode::Opcode;
use crate::pattern::Pattern;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// One call-site replacement.
#[derive(Clone, Debug)]
pub struct Edit {
    /// Name used in diagnostics.
    pub name: String,
    /// Locates the call site.
    pub pattern: Pattern,
    /// Index of the call to replace, relative to the match start.
    pub offset: usize,
    /// The callee the call site should invoke instead.
    pub replacement: MethodRef,
    /// Whether the routine is only correct to patch if this edit lands.
    pub required: bool,
}

impl Edit {
    /// A required edit.
    pub fn required(name: &str, pattern: Pattern, offset: usize, replacement: MethodRef) -> Self {
        Self {
            name: name.to_string(),
            pattern,
            offset,
            replacement,
            required: true,
        }
    }

    /// An edit whose absence does not block the others.
    pub fn optional(name: &str, pattern: Pattern, offset: usize, replacement: MethodRef) -> Self {
        Self {
            required: false,
            ..Self::required(name, pattern, offset, replacement)
        }
    }
}

/// Why an edit could not be applied.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// The pattern never matched.
    #[error("pattern not found (searched from instruction {search_start})")]
    PatternNotFound {
        /// Index the scan started from.
        search_start: usize,
    },

    /// `match_start + offset` is past the end of the routine.
    #[error("target index {index} is outside the routine")]
    TargetOutOfRange {
        /// The computed target index.
        index: usize,
    },

    /// The target instruction is not a call.
    #[error("instruction {index} is `{found}`, not a call")]
    NotACall {
        /// Index of the target instruction.
        index: usize,
        /// The opcode found there.
        found: Opcode,
    },

    /// The replacement would change the stack shape at the call site.
    #[error("replacement {replacement} is not call-compatible with {original}")]
    IncompatibleCallee {
        /// The callee found at the call site.
        original: String,
        /// The proposed replacement.
        replacement: String,
    },
}

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A failed edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Name of the edit that failed.
    pub edit: String,
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Error for required edits, warning otherwise.
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edit '{}': {}", self.edit, self.kind)
    }
}

/// A successfully applied edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedEdit {
    /// Name of the edit.
    pub edit: String,
    /// Index of the rewritten instruction.
    pub index: usize,
    /// The callee that was replaced.
    pub previous: MethodRef,
    /// The callee now invoked.
    pub replacement: MethodRef,
}

/// Result of [`rewrite`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The rewritten sequence, or a copy of the input when unpatched.
    pub instructions: Vec<Instruction>,
    /// Edits that were applied. Empty when unpatched.
    pub applied: Vec<AppliedEdit>,
    /// Edits that failed.
    pub diagnostics: Vec<Diagnostic>,
}

impl RewriteOutcome {
    /// True if at least one edit landed and no required edit failed.
    pub fn is_patched(&self) -> bool {
        !self.applied.is_empty()
    }

    /// True if any required edit failed.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Applies `edits` to a copy of `instructions`.
pub fn rewrite(instructions: &[Instruction], edits: &[Edit]) -> RewriteOutcome {
    let mut rewritten = instructions.to_vec();
    let mut applied = Vec::new();
    let mut diagnostics = Vec::new();
    let mut cursor = 0usize;

    for edit in edits {
        debug!("Rewrite: scanning for '{}' from {}", edit.name, cursor);
        match apply_edit(&mut rewritten, edit, cursor) {
            Ok((match_start, applied_edit)) => {
                info!(
                    "Rewrite: '{}' redirected instruction {} from {} to {}",
                    edit.name, applied_edit.index, applied_edit.previous, applied_edit.replacement
                );
                applied.push(applied_edit);
                cursor = match_start + 1;
            }
            Err(kind) => {
                let severity = if edit.required {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                let diagnostic = Diagnostic {
                    edit: edit.name.clone(),
                    kind,
                    severity,
                };
                match severity {
                    Severity::Error => error!("Rewrite failed: {diagnostic}"),
                    Severity::Warning => warn!("Rewrite skipped: {diagnostic}"),
                }
                diagnostics.push(diagnostic);
            }
        }
    }

    let outcome = RewriteOutcome {
        instructions: rewritten,
        applied,
        diagnostics,
    };
    if outcome.has_errors() {
        error!(
            "Rewrite: {} required edit(s) failed, leaving routine unpatched",
            outcome
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count()
        );
        return RewriteOutcome {
            instructions: instructions.to_vec(),
            applied: Vec::new(),
            diagnostics: outcome.diagnostics,
        };
    }
    outcome
}

/// Locates and applies one edit in place; returns the match start and a record.
fn apply_edit(
    instructions: &mut [Instruction],
    edit: &Edit,
    cursor: usize,
) -> Result<(usize, AppliedEdit), DiagnosticKind> {
    let match_start = edit
        .pattern
        .find_from(instructions, cursor)
        .ok_or(DiagnosticKind::PatternNotFound {
            search_start: cursor,
        })?;
    let index = match_start + edit.offset;
    let target = instructions
        .get_mut(index)
        .ok_or(DiagnosticKind::TargetOutOfRange { index })?;

    let previous = target
        .callee()
        .cloned()
        .ok_or(DiagnosticKind::NotACall {
            index,
            found: target.op,
        })?;
    if !previous.is_call_compatible(&edit.replacement) {
        return Err(DiagnosticKind::IncompatibleCallee {
            original: previous.to_string(),
            replacement: edit.replacement.to_string(),
        });
    }

    target.op = Opcode::Call;
    target.operand = Operand::Method(edit.replacement.clone());

    Ok((
        match_start,
        AppliedEdit {
            edit: edit.name.clone(),
            index,
            previous,
            replacement: edit.replacement.clone(),
        },
    ))
}
