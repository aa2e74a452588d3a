use crate::host::Catalog;
use anvil_menu::assets::{Locale, LocalizationSource};
use anvil_menu::tooltips::{TooltipInputs, generate_tooltips};
use std::collections::BTreeMap;

/// Serves display names and generated tooltips from a [`Catalog`].
#[derive(Clone, Debug)]
pub struct CatalogSource {
    pub catalog: Catalog,
    pub autogeneration_enabled: bool,
    pub world_ready: bool,
}

impl CatalogSource {
    pub fn new(catalog: Catalog, autogeneration_enabled: bool) -> Self {
        Self {
            catalog,
            autogeneration_enabled,
            world_ready: true,
        }
    }
}

impl LocalizationSource for CatalogSource {
    fn display_names(&self, locale: &Locale) -> BTreeMap<String, String> {
        self.catalog
            .enchantments
            .iter()
            .filter_map(|def| {
                self.catalog
                    .display_name(&def.key, locale)
                    .map(|name| (def.key.clone(), name.to_string()))
            })
            .collect()
    }

    fn tooltip_data(&self, locale: &Locale) -> BTreeMap<String, String> {
        let display_names = self.display_names(locale);
        let translations = self.catalog.translations(locale);
        generate_tooltips(&TooltipInputs {
            autogeneration_enabled: self.autogeneration_enabled,
            world_ready: self.world_ready,
            locale,
            display_names: &display_names,
            translations: &translations,
            lore_note: self.catalog.lore_note(locale),
        })
    }
}
