//! Data-only descriptions of the items taking part in a forge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualified id of the catalyst that applies a regular enchantment.
pub const PRISMATIC_SHARD: &str = "(O)74";
/// Qualified id of the catalyst that rerolls innate enchantments.
pub const DRAGON_TOOTH: &str = "(O)852";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    MeleeWeapon,
    Slingshot,
    Axe,
    Pickaxe,
    Hoe,
    WateringCan,
    FishingRod,
    Pan,
    Object,
}

impl ItemKind {
    pub const fn is_tool(self) -> bool {
        !matches!(self, Self::Object)
    }
}

/// An enchantment, identified by its stable key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Enchantment(pub String);

impl Enchantment {
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Enchantment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique per item instance.
    pub uid: u64,
    pub qualified_id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub enchantments: Vec<Enchantment>,
}

impl Item {
    pub fn new(uid: u64, qualified_id: &str, name: &str, kind: ItemKind) -> Self {
        Self {
            uid,
            qualified_id: qualified_id.to_string(),
            name: name.to_string(),
            kind,
            enchantments: Vec::new(),
        }
    }

    pub fn prismatic_shard(uid: u64) -> Self {
        Self::new(uid, PRISMATIC_SHARD, "Prismatic Shard", ItemKind::Object)
    }

    pub fn dragon_tooth(uid: u64) -> Self {
        Self::new(uid, DRAGON_TOOTH, "Dragon Tooth", ItemKind::Object)
    }

    pub fn has_enchantment(&self, enchantment: &Enchantment) -> bool {
        self.enchantments.contains(enchantment)
    }
}

/// True for the item that applies a regular enchantment.
pub fn is_catalyst(item: &Item) -> bool {
    item.qualified_id == PRISMATIC_SHARD
}

/// True for the item that rerolls innate enchantments.
pub fn is_innate_catalyst(item: &Item) -> bool {
    item.qualified_id == DRAGON_TOOTH
}

/// True for the weapon kind that carries innate enchantments.
pub fn is_specialized_weapon(item: &Item) -> bool {
    item.kind == ItemKind::MeleeWeapon
}
