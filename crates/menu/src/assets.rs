//! Lazily loaded, locale-dependent menu assets.

use crate::choice::ChoiceOption;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

/// Column at which tooltips are wrapped when loaded.
pub const TOOLTIP_WRAP_WIDTH: usize = 30;

/// A language code such as `en` or `ru-RU`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale(String);

impl Locale {
    pub fn new(code: &str) -> Self {
        Self(code.to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// The language part of the code, lowercased.
    pub fn language(&self) -> String {
        self.0
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    pub fn is_russian(&self) -> bool {
        self.language() == "ru"
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names of the refreshable tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetName {
    DisplayNames,
    TooltipData,
}

/// Where localized tables come from.
pub trait LocalizationSource {
    /// Display name of each option, by key.
    fn display_names(&self, locale: &Locale) -> BTreeMap<String, String>;
    /// Unwrapped tooltip text, by key.
    fn tooltip_data(&self, locale: &Locale) -> BTreeMap<String, String>;
}

/// Lazily loaded display-name and tooltip tables for one locale.
///
/// Each table is loaded on first use and kept until refreshed. Changing the
/// locale drops both.
pub struct Assets<S> {
    source: S,
    locale: Locale,
    display_names: OnceCell<BTreeMap<String, String>>,
    tooltips: OnceCell<BTreeMap<String, String>>,
}

impl<S: LocalizationSource> Assets<S> {
    pub fn new(source: S, locale: Locale) -> Self {
        Self {
            source,
            locale,
            display_names: OnceCell::new(),
            tooltips: OnceCell::new(),
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn display_names(&self) -> &BTreeMap<String, String> {
        self.display_names.get_or_init(|| {
            debug!("Loading display names for {}", self.locale);
            self.source.display_names(&self.locale)
        })
    }

    /// The tooltip table, wrapped to [`TOOLTIP_WRAP_WIDTH`].
    pub fn tooltips(&self) -> &BTreeMap<String, String> {
        self.tooltips.get_or_init(|| {
            debug!("Loading tooltips for {}", self.locale);
            self.source
                .tooltip_data(&self.locale)
                .into_iter()
                .map(|(key, text)| (key, textwrap::fill(&text, TOOLTIP_WRAP_WIDTH)))
                .collect()
        })
    }

    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.display_names().get(key).map(String::as_str)
    }

    pub fn tooltip(&self, key: &str) -> Option<&str> {
        self.tooltips().get(key).map(String::as_str)
    }

    /// Builds the option for `key`; the key doubles as label when no name is known.
    pub fn option(&self, key: &str) -> ChoiceOption {
        let option = ChoiceOption::new(key, self.display_name(key).unwrap_or(key));
        match self.tooltip(key) {
            Some(tooltip) => option.with_tooltip(tooltip),
            None => option,
        }
    }

    pub fn is_loaded(&self, name: AssetName) -> bool {
        match name {
            AssetName::DisplayNames => self.display_names.get().is_some(),
            AssetName::TooltipData => self.tooltips.get().is_some(),
        }
    }

    /// Drops loaded tables so they reload on next use. `None` drops everything.
    pub fn refresh(&mut self, names: Option<&HashSet<AssetName>>) {
        let wanted = |name| names.is_none_or(|set| set.contains(&name));
        if wanted(AssetName::DisplayNames) && self.display_names.take().is_some() {
            debug!("Invalidated display names");
        }
        if wanted(AssetName::TooltipData) && self.tooltips.take().is_some() {
            debug!("Invalidated tooltip data");
        }
    }

    /// Switches locale, invalidating both tables if it changed.
    pub fn set_locale(&mut self, locale: Locale) {
        if locale != self.locale {
            debug!("Locale changed from {} to {}", self.locale, locale);
            self.locale = locale;
            self.refresh(None);
        }
    }
}
