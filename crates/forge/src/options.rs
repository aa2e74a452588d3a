//! Which options the player is offered for a forge.

use crate::host::ForgeHost;
use crate::item::{Enchantment, Item};
use anvil_menu::assets::{Assets, LocalizationSource};
use anvil_menu::{ChoiceKind, ChoiceOption};

/// Supplies the legal options for a tool, in display order.
pub trait OptionsProvider {
    fn options(&self, tool: &Item, kind: ChoiceKind) -> Vec<ChoiceOption>;
}

/// Options from a [`ForgeHost`], labelled through localized [`Assets`].
pub struct HostOptions<'a, H, S> {
    pub host: &'a H,
    pub assets: &'a Assets<S>,
}

impl<'a, H: ForgeHost, S: LocalizationSource> HostOptions<'a, H, S> {
    pub fn new(host: &'a H, assets: &'a Assets<S>) -> Self {
        Self { host, assets }
    }
}

impl<H: ForgeHost, S: LocalizationSource> OptionsProvider for HostOptions<'_, H, S> {
    fn options(&self, tool: &Item, kind: ChoiceKind) -> Vec<ChoiceOption> {
        let enchantments = match kind {
            ChoiceKind::Enchantment => self.host.available_enchantments(tool),
            ChoiceKind::Innate => self.host.available_innate_enchantments(tool),
        };
        enchantments
            .iter()
            .map(Enchantment::key)
            .map(|key| self.assets.option(key))
            .collect()
    }
}
