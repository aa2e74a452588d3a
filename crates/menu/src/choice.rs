//! The options the carousel cycles through.

use serde::{Deserialize, Serialize};

/// One selectable option.
///
/// `key` is the identity; `display` and `tooltip` are presentation only and may
/// change with the locale without changing which option this is.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stable identifier.
    pub key: String,
    /// Localized label.
    pub display: String,
    /// Localized tooltip, already wrapped to the tooltip width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl ChoiceOption {
    pub fn new(key: &str, display: &str) -> Self {
        Self {
            key: key.to_string(),
            display: display.to_string(),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }
}

impl PartialEq for ChoiceOption {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl std::hash::Hash for ChoiceOption {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
