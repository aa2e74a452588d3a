//! The forge choice patch: redirects the forge's random enchantment lookups to
//! shims that honour the player's selection.

pub mod host;
pub mod item;
pub mod localization;
pub mod options;
pub mod patch;
pub mod session;
pub mod shim;

pub use host::{Catalog, CatalogHost, ForgeHost};
pub use item::{Enchantment, Item, ItemKind};
pub use patch::ForgePatch;
pub use session::{Forge, ForgeOutcome, prepare_forge};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no enchantment named {0:?}")]
    UnknownEnchantment(String),

    #[error("forge routine has no {0} call")]
    MissingCallSite(&'static str),

    #[error("invalid enchantment catalog: {0}")]
    Catalog(#[source] serde_json::Error),

    #[error(transparent)]
    Core(#[from] anvil_core::Error),

    #[error(transparent)]
    Menu(#[from] anvil_menu::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
