use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;
use std::path::{Path, PathBuf};

pub mod config;
pub mod forge;
pub mod patch;
pub mod snitch;
pub mod tooltips;

use anvil_core::Routine;
use anvil_forge::Catalog;
use thiserror::Error;

/// Errors raised by the CLI itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// File read/write error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] anvil_core::Error),
    #[error(transparent)]
    Forge(#[from] anvil_forge::Error),
    #[error(transparent)]
    Menu(#[from] anvil_menu::Error),
    /// A required edit did not land.
    #[error("{0} was left unpatched")]
    Unpatched(String),
}

/// CLI subcommands for Anvil.
#[derive(Subcommand)]
pub enum Cmd {
    /// Patch a forge routine listing and print the result.
    Patch(patch::PatchArgs),
    /// Report which routines a patch run touched.
    Snitch(snitch::SnitchArgs),
    /// Print display names and generated tooltips.
    Tooltips(tooltips::TooltipsArgs),
    /// Show, create or reset the menu configuration.
    Config(config::ConfigArgs),
    /// Forge interactively, choosing the enchantment from a carousel.
    Forge(forge::ForgeArgs),
}

impl Cmd {
    /// Whether the command takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Cmd::Forge(_))
    }
}

/// Trait for executing CLI subcommands.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Patch(args) => args.execute().await,
            Cmd::Snitch(args) => args.execute().await,
            Cmd::Tooltips(args) => args.execute().await,
            Cmd::Config(args) => args.execute().await,
            Cmd::Forge(args) => args.execute().await,
        }
    }
}

/// Reads a routine listing, or the bundled forge routine when no path is given.
pub(crate) fn read_routine(path: Option<&Path>) -> Result<Routine, CliError> {
    match path {
        Some(path) => {
            let listing = std::fs::read_to_string(path)?;
            Ok(anvil_core::decoder::parse_routine(&listing)?)
        }
        None => Ok(anvil_forge::patch::forge_routine()?),
    }
}

/// Reads an enchantment catalog, or the bundled one when no path is given.
pub(crate) fn read_catalog(path: Option<&PathBuf>) -> Result<Catalog, CliError> {
    match path {
        Some(path) => Ok(Catalog::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(Catalog::builtin()?),
    }
}
