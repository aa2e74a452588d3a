//! The forge host: the routines a patch redirects away from, and a catalog-backed
//! stand-in for the game that owns them.

use crate::item::{Enchantment, Item, ItemKind, is_catalyst, is_specialized_weapon};
use crate::{Error, Result};
use anvil_menu::assets::Locale;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Catalog bundled with the crate.
pub const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

/// One enchantment the host knows about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantmentDef {
    pub key: String,
    pub applies_to: Vec<ItemKind>,
    /// Innate enchantments come from the innate catalyst, not the regular one.
    #[serde(default)]
    pub innate: bool,
    /// Display name by language code.
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

impl EnchantmentDef {
    pub fn can_apply_to(&self, item: &Item) -> bool {
        self.applies_to.contains(&item.kind)
    }
}

/// Enchantment definitions plus the localized text describing them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub enchantments: Vec<EnchantmentDef>,
    /// Lore note text by language code.
    #[serde(default)]
    pub lore_notes: BTreeMap<String, String>,
    /// Explicit tooltip translations by language code, then enchantment key.
    #[serde(default)]
    pub translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Catalog)
    }

    pub fn get(&self, key: &str) -> Option<&EnchantmentDef> {
        self.enchantments.iter().find(|def| def.key == key)
    }

    /// Display name of `key` in `locale`, falling back to English.
    pub fn display_name(&self, key: &str, locale: &Locale) -> Option<&str> {
        let def = self.get(key)?;
        def.names
            .get(&locale.language())
            .or_else(|| def.names.get("en"))
            .map(String::as_str)
    }

    pub fn lore_note(&self, locale: &Locale) -> Option<&str> {
        self.lore_notes.get(&locale.language()).map(String::as_str)
    }

    pub fn translations(&self, locale: &Locale) -> BTreeMap<String, String> {
        self.translations
            .get(&locale.language())
            .cloned()
            .unwrap_or_default()
    }
}

/// Routines and state the forge needs from the game.
pub trait ForgeHost {
    /// Picks the enchantment `catalyst` applies to `tool`.
    fn enchantment_from_item(&mut self, tool: &Item, catalyst: &Item) -> Option<Enchantment>;

    /// Replaces the weapon's innate enchantments with a random one.
    ///
    /// Enchantments in `reroll_exclude` are not picked. Without `force` a weapon
    /// that already has innate enchantments is left alone.
    fn attempt_add_random_innate_enchantment(
        &mut self,
        weapon: Item,
        rng: &mut StdRng,
        force: bool,
        reroll_exclude: Option<&[Enchantment]>,
    ) -> Item;

    /// Maps an option key back to an enchantment.
    fn resolve_enchantment(&self, key: &str) -> Option<Enchantment>;

    /// Enchantments the regular catalyst could apply to `tool`.
    fn available_enchantments(&self, tool: &Item) -> Vec<Enchantment>;

    /// Innate enchantments the innate catalyst could give `weapon`.
    fn available_innate_enchantments(&self, weapon: &Item) -> Vec<Enchantment>;

    /// Whether any player has read the lore note.
    fn lore_discovered(&self) -> bool;

    /// Whether a save is loaded.
    fn world_ready(&self) -> bool;
}

/// A [`ForgeHost`] driven by a [`Catalog`].
#[derive(Clone, Debug)]
pub struct CatalogHost {
    catalog: Catalog,
    rng: StdRng,
    pub lore_discovered: bool,
    pub world_ready: bool,
}

impl CatalogHost {
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: StdRng::seed_from_u64(seed),
            lore_discovered: false,
            world_ready: true,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn matching(&self, item: &Item, innate: bool) -> Vec<Enchantment> {
        self.catalog
            .enchantments
            .iter()
            .filter(|def| def.innate == innate && def.can_apply_to(item))
            .map(|def| Enchantment::new(&def.key))
            .filter(|e| !item.has_enchantment(e))
            .collect()
    }

    fn is_innate(&self, enchantment: &Enchantment) -> bool {
        self.catalog
            .get(enchantment.key())
            .is_some_and(|def| def.innate)
    }
}

impl ForgeHost for CatalogHost {
    fn enchantment_from_item(&mut self, tool: &Item, catalyst: &Item) -> Option<Enchantment> {
        if !is_catalyst(catalyst) {
            return None;
        }
        let picked = self.available_enchantments(tool).choose(&mut self.rng).cloned();
        debug!("Host: random enchantment for {} is {picked:?}", tool.name);
        picked
    }

    fn attempt_add_random_innate_enchantment(
        &mut self,
        mut weapon: Item,
        rng: &mut StdRng,
        force: bool,
        reroll_exclude: Option<&[Enchantment]>,
    ) -> Item {
        if !is_specialized_weapon(&weapon) {
            return weapon;
        }
        let has_innate = weapon.enchantments.iter().any(|e| self.is_innate(e));
        if has_innate && !force {
            return weapon;
        }

        weapon.enchantments.retain(|e| !self.is_innate(e));
        let exclude = reroll_exclude.unwrap_or_default();
        let candidates: Vec<Enchantment> = self
            .matching(&weapon, true)
            .into_iter()
            .filter(|e| !exclude.contains(e))
            .collect();
        if let Some(picked) = candidates.choose(rng) {
            debug!("Host: rerolled innate enchantment of {} to {picked}", weapon.name);
            weapon.enchantments.push(picked.clone());
        }
        weapon
    }

    fn resolve_enchantment(&self, key: &str) -> Option<Enchantment> {
        self.catalog.get(key).map(|def| Enchantment::new(&def.key))
    }

    fn available_enchantments(&self, tool: &Item) -> Vec<Enchantment> {
        self.matching(tool, false)
    }

    fn available_innate_enchantments(&self, weapon: &Item) -> Vec<Enchantment> {
        if !is_specialized_weapon(weapon) {
            return Vec::new();
        }
        self.matching(weapon, true)
    }

    fn lore_discovered(&self) -> bool {
        self.lore_discovered
    }

    fn world_ready(&self) -> bool {
        self.world_ready
    }
}
