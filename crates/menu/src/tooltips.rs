//! Tooltip generation from the in-game lore note.
//!
//! The only in-game descriptions of the enchantments live in one journal scrap, a
//! `^`-separated list of `Name: description` entries written in the player's
//! language. The note is keyed by localized display name, so each enchantment is
//! looked up by its display name and the result stored under its stable key.

use crate::assets::Locale;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error};

/// Id of the journal scrap holding the enchantment descriptions.
pub const LORE_NOTE_ID: u32 = 1008;

/// Case-insensitive map from localized enchantment name to description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoreMap(HashMap<String, String>);

impl LoreMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.trim().to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Splits the lore note into its entries.
///
/// Entries without a name before the colon are skipped. Both the ASCII colon and
/// the full-width colon used by CJK translations are accepted.
pub fn parse_lore_note(note: &str) -> LoreMap {
    let entries = note
        .split('^')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let index = entry.find([':', '：'])?;
            let name = entry[..index].trim();
            let colon_len = entry[index..].chars().next().map_or(1, char::len_utf8);
            (!name.is_empty()).then(|| {
                (
                    name.to_lowercase(),
                    entry[index + colon_len..].trim().to_string(),
                )
            })
        })
        .collect();
    LoreMap(entries)
}

/// A locale-specific way to find a description when the full display name is not
/// in the lore note.
pub trait FallbackStrategy {
    fn lookup<'m>(&self, display_name: &str, lore: &'m LoreMap) -> Option<&'m str>;
}

/// Russian display names read "<name> чары" while the note lists the bare name,
/// so each word is tried on its own. The last word that matches wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct RussianWordFallback;

impl FallbackStrategy for RussianWordFallback {
    fn lookup<'m>(&self, display_name: &str, lore: &'m LoreMap) -> Option<&'m str> {
        display_name
            .split_whitespace()
            .filter(|word| *word != "чары")
            .filter_map(|word| lore.get(word))
            .last()
    }
}

/// The fallback registered for `locale`, if any.
pub fn fallback_for(locale: &Locale) -> Option<Box<dyn FallbackStrategy>> {
    locale
        .is_russian()
        .then(|| Box::new(RussianWordFallback) as Box<dyn FallbackStrategy>)
}

/// Everything tooltip generation reads.
#[derive(Clone, Copy, Debug)]
pub struct TooltipInputs<'a> {
    pub autogeneration_enabled: bool,
    /// Translations are unreliable before a save is loaded.
    pub world_ready: bool,
    pub locale: &'a Locale,
    /// Localized display name of every offerable enchantment, by key.
    pub display_names: &'a BTreeMap<String, String>,
    /// Explicit tooltip translations, by key. These win over the lore note.
    pub translations: &'a BTreeMap<String, String>,
    /// Raw text of the lore note, if the host has it.
    pub lore_note: Option<&'a str>,
}

/// Builds the tooltip table, keyed by enchantment key.
pub fn generate_tooltips(inputs: &TooltipInputs<'_>) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    if !inputs.autogeneration_enabled || !inputs.world_ready {
        debug!("Tooltip autogeneration skipped");
        return table;
    }

    let Some(note) = inputs.lore_note else {
        error!("Error: journal scrap {LORE_NOTE_ID} not found, no tooltips generated");
        return table;
    };
    let lore = parse_lore_note(note);
    let fallback = fallback_for(inputs.locale);

    for (key, display_name) in inputs.display_names {
        let tooltip = inputs
            .translations
            .get(key)
            .map(String::as_str)
            .or_else(|| lore.get(display_name))
            .or_else(|| fallback.as_ref().and_then(|f| f.lookup(display_name, &lore)));
        if let Some(tooltip) = tooltip {
            table.insert(key.clone(), tooltip.to_string());
        }
    }
    debug!(
        "Generated {} tooltip(s) from {} lore entries",
        table.len(),
        lore.len()
    );
    table
}
