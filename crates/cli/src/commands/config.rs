//! Shows the effective menu configuration, or writes a fresh one.

use anvil_menu::MenuConfig;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `config` subcommand.
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration file (TOML).
    #[arg(default_value = "anvil.toml")]
    path: PathBuf,
    /// Overwrite the file with the default configuration.
    #[arg(long)]
    reset: bool,
}

#[async_trait]
impl super::Command for ConfigArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let mut config = MenuConfig::load_or_default(&self.path);
        if self.reset || !self.path.exists() {
            config.reset();
            config.save(&self.path)?;
            tracing::info!("Wrote default config to {}", self.path.display());
        }
        print!("{}", config.to_toml()?);
        Ok(())
    }
}
