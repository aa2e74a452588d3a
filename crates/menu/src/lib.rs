//! Forge choice menu: a carousel of options and the mediator that hands the
//! selected option to whoever asked for it.

pub mod assets;
pub mod carousel;
pub mod choice;
pub mod config;
pub mod input;
pub mod mediator;
pub mod render;
pub mod tooltips;

pub use carousel::{Anchor, Carousel, CarouselSettings, Cue, Phase};
pub use choice::ChoiceOption;
pub use config::{ConfigError, MenuConfig, TooltipBehavior};
pub use mediator::{ChoiceKind, InvocationContext, Offer, SelectionMediator};
pub use ratatui::layout::Rect;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a carousel needs at least one option")]
    NoOptions,

    #[error("viewport {width}x{height} is too small for the carousel")]
    ViewportTooSmall { width: u16, height: u16 },

    #[error("invalid keybind: {0:?}")]
    InvalidKeybind(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
