//! Applies the forge patch to a routine listing and prints the rewritten routine,
//! or a JSON report of what changed.

use super::{CliError, read_routine};
use anvil_core::patcher::Patcher;
use anvil_core::rewrite::{AppliedEdit, Diagnostic};
use anvil_forge::ForgePatch;
use anvil_forge::patch::OWNER;
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `patch` subcommand.
#[derive(Args)]
pub struct PatchArgs {
    /// Routine listing to patch. Defaults to the bundled forge routine.
    pub input: Option<PathBuf>,
    /// Print a JSON report instead of the patched listing.
    #[arg(long)]
    json: bool,
    /// Write the patched listing to a file as well.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct PatchReport<'a> {
    routine: String,
    patched: bool,
    applied: &'a [AppliedEdit],
    diagnostics: &'a [Diagnostic],
    listing: String,
}

#[async_trait]
impl super::Command for PatchArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let mut routine = read_routine(self.input.as_deref())?;
        let mut patcher = Patcher::new(OWNER);
        let outcome = patcher.patch(&mut routine, &ForgePatch::new())?;

        if let Some(path) = &self.output {
            std::fs::write(path, routine.to_string()).map_err(CliError::File)?;
        }

        if self.json {
            let report = PatchReport {
                routine: routine.method.to_string(),
                patched: outcome.is_patched(),
                applied: &outcome.applied,
                diagnostics: &outcome.diagnostics,
                listing: routine.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&report).map_err(CliError::Serialize)?);
        } else {
            for diagnostic in &outcome.diagnostics {
                eprintln!("{diagnostic}");
            }
            print!("{routine}");
        }

        if outcome.is_patched() {
            Ok(())
        } else {
            Err(CliError::Unpatched(routine.method.to_string()).into())
        }
    }
}
