//! Prints each enchantment's display name and tooltip for a locale.

use super::{CliError, read_catalog};
use anvil_forge::localization::CatalogSource;
use anvil_menu::MenuConfig;
use anvil_menu::assets::{Assets, Locale};
use async_trait::async_trait;
use clap::Args;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `tooltips` subcommand.
#[derive(Args)]
pub struct TooltipsArgs {
    /// Language code, e.g. `en` or `ru`.
    #[arg(long, default_value = "en")]
    locale: String,
    /// Enchantment catalog (JSON). Defaults to the bundled catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Menu configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print JSON keyed by enchantment.
    #[arg(long)]
    json: bool,
}

#[async_trait]
impl super::Command for TooltipsArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let config = self
            .config
            .as_deref()
            .map(MenuConfig::load_or_default)
            .unwrap_or_default();
        let catalog = read_catalog(self.catalog.as_ref())?;
        let keys: Vec<String> = catalog.enchantments.iter().map(|def| def.key.clone()).collect();
        let assets = Assets::new(
            CatalogSource::new(catalog, config.enable_tooltip_autogeneration),
            Locale::new(&self.locale),
        );
        let options: Vec<_> = keys.iter().map(|key| assets.option(key)).collect();

        if self.json {
            let table: BTreeMap<&str, _> = options.iter().map(|o| (o.key.as_str(), o)).collect();
            println!("{}", serde_json::to_string_pretty(&table).map_err(CliError::Serialize)?);
            return Ok(());
        }
        for option in options {
            println!("{} ({})", option.display, option.key);
            match &option.tooltip {
                Some(tooltip) => {
                    for line in tooltip.lines() {
                        println!("    {line}");
                    }
                }
                None => println!("    (no tooltip)"),
            }
        }
        Ok(())
    }
}
