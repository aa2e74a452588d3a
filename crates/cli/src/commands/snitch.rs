//! Patches a routine and reports what was patched, by whom.

use super::read_routine;
use anvil_core::patcher::Patcher;
use anvil_forge::ForgePatch;
use anvil_forge::patch::OWNER;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `snitch` subcommand.
#[derive(Args)]
pub struct SnitchArgs {
    /// Routine listing to patch. Defaults to the bundled forge routine.
    pub input: Option<PathBuf>,
    /// Only report patches made by this owner.
    #[arg(long)]
    owner: Option<String>,
    /// Also mention routines that ended up without patches.
    #[arg(long)]
    all: bool,
}

#[async_trait]
impl super::Command for SnitchArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let mut routine = read_routine(self.input.as_deref())?;
        let mut patcher = Patcher::new(OWNER);
        patcher.patch(&mut routine, &ForgePatch::new())?;

        let summaries = patcher.snitch_all(self.owner.as_deref(), !self.all);
        if summaries.is_empty() {
            if self.all {
                println!("No patches found for {}", routine.method);
            }
            return Ok(());
        }
        for summary in summaries {
            println!("{summary}");
        }
        Ok(())
    }
}
