//! Applies transpilers to routines and remembers what was patched.

use crate::decoder::{MethodRef, Routine};
use crate::result::{Error, Result};
use crate::rewrite::{Edit, RewriteOutcome, rewrite};
use std::collections::BTreeMap;
use tracing::{error, info, trace};

/// A set of call-site edits aimed at one routine.
pub trait Transpiler {
    /// Returns the transpiler's name for logging and identification.
    fn name(&self) -> &'static str;
    /// The routine this transpiler rewrites.
    fn target(&self) -> &MethodRef;
    /// Builds the edits to apply.
    fn edits(&self) -> Result<Vec<Edit>>;
}

/// Record of one transpiler applied to a routine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchInfo {
    /// Owner that applied the patch.
    pub owner: String,
    /// Name of the transpiler.
    pub transpiler: &'static str,
    /// Number of call sites redirected.
    pub redirected: usize,
}

/// Applies transpilers on behalf of an owner and keeps a registry of patched routines.
#[derive(Debug, Default)]
pub struct Patcher {
    owner: String,
    patches: BTreeMap<String, Vec<PatchInfo>>,
}

impl Patcher {
    /// Creates a patcher for the given owner id.
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            patches: BTreeMap::new(),
        }
    }

    /// The owner id recorded on every patch.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Runs `transpiler` over `routine`.
    ///
    /// On success the routine's body is replaced and the patch recorded. If a
    /// required edit fails the routine is left exactly as it was; the outcome
    /// carries the diagnostics.
    pub fn patch(&mut self, routine: &mut Routine, transpiler: &dyn Transpiler) -> Result<RewriteOutcome> {
        if routine.method != *transpiler.target() {
            return Err(Error::TargetMismatch {
                transpiler: transpiler.name(),
                expected: transpiler.target().to_string(),
                found: routine.method.to_string(),
            });
        }

        let edits = transpiler.edits().inspect_err(|e| {
            error!(
                "Ran into errors transpiling {} to use selection: {e}",
                routine.method
            );
        })?;
        let outcome = rewrite(&routine.body, &edits);

        if outcome.is_patched() {
            info!(
                "{} patched {} ({} call site(s))",
                transpiler.name(),
                routine.method,
                outcome.applied.len()
            );
            routine.body = outcome.instructions.clone();
            self.patches
                .entry(routine.method.to_string())
                .or_default()
                .push(PatchInfo {
                    owner: self.owner.clone(),
                    transpiler: transpiler.name(),
                    redirected: outcome.applied.len(),
                });
        } else {
            error!(
                "{} left {} unpatched: {}",
                transpiler.name(),
                routine.method,
                outcome
                    .diagnostics
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            );
        }
        Ok(outcome)
    }

    /// Signatures of every routine with at least one recorded patch.
    pub fn patched_routines(&self) -> impl Iterator<Item = &str> {
        self.patches.keys().map(String::as_str)
    }

    /// Patches recorded for one routine.
    pub fn patches_for(&self, routine: &str) -> &[PatchInfo] {
        self.patches.get(routine).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Summarizes the patches on `routine`, optionally only those by `owner`.
    ///
    /// Logs the summary at trace level. Returns `None` when nothing matches; in
    /// that case a "no patches" line is logged unless `transpilers_only` is set.
    pub fn snitch(&self, routine: &str, owner: Option<&str>, transpilers_only: bool) -> Option<String> {
        let patches: Vec<&PatchInfo> = self
            .patches_for(routine)
            .iter()
            .filter(|p| owner.is_none_or(|o| p.owner == o))
            .collect();

        if patches.is_empty() {
            if !transpilers_only {
                trace!("No patches found for {routine} when attempting to snitch");
            }
            return None;
        }

        let summary = std::iter::once(format!("Patched method {routine}"))
            .chain(patches.iter().map(|patch| {
                format!(
                    "\tTranspiled with method: {} (owner {}, {} call site(s))",
                    patch.transpiler, patch.owner, patch.redirected
                )
            }))
            .collect::<Vec<_>>()
            .join("\n");
        trace!("{summary}");
        Some(summary)
    }

    /// Snitches on every patched routine.
    pub fn snitch_all(&self, owner: Option<&str>, transpilers_only: bool) -> Vec<String> {
        self.patches
            .keys()
            .filter_map(|routine| self.snitch(routine, owner, transpilers_only))
            .collect()
    }
}
