use anvil_menu::assets::{AssetName, Assets, Locale, LocalizationSource, TOOLTIP_WRAP_WIDTH};
use anvil_menu::tooltips::{TooltipInputs, generate_tooltips, parse_lore_note};
use anvil_menu::{MenuConfig, TooltipBehavior};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::{BTreeMap, HashSet};

const NOTE: &str = "I found these written on a scrap:^Vampiric: Heals on kills.^bug killer: Pierces armor.^Вампир: Лечит.^Сенокос: Больше сена.";

fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn generate(
    locale: &str,
    display_names: &[(&str, &str)],
    translations: &[(&str, &str)],
    autogeneration_enabled: bool,
    world_ready: bool,
) -> BTreeMap<String, String> {
    let locale = Locale::new(locale);
    let display_names = names(display_names);
    let translations = names(translations);
    generate_tooltips(&TooltipInputs {
        autogeneration_enabled,
        world_ready,
        locale: &locale,
        display_names: &display_names,
        translations: &translations,
        lore_note: Some(NOTE),
    })
}

#[rstest]
#[case::exact_name("en", "Vampiric", Some("Heals on kills."))]
#[case::case_insensitive("en", "Bug Killer", Some("Pierces armor."))]
#[case::unknown("en", "Crusader", None)]
#[case::russian_word("ru", "Вампир чары", Some("Лечит."))]
#[case::russian_needs_ru_locale("en", "Вампир чары", None)]
#[case::russian_last_word_wins("ru-RU", "Вампир Сенокос чары", Some("Больше сена."))]
fn test_lore_lookup(#[case] locale: &str, #[case] display: &str, #[case] expected: Option<&str>) {
    let table = generate(locale, &[("Key", display)], &[], true, true);
    assert_eq!(table.get("Key").map(String::as_str), expected);
}

#[test]
fn test_translation_wins_over_lore() {
    let table = generate(
        "en",
        &[("Vampiric", "Vampiric"), ("Master", "Master")],
        &[("Vampiric", "Translated."), ("Master", "Fishing +1.")],
        true,
        true,
    );
    assert_eq!(table, names(&[("Master", "Fishing +1."), ("Vampiric", "Translated.")]));
}

#[rstest]
#[case::disabled(false, true)]
#[case::no_world(true, false)]
fn test_generation_can_be_skipped(#[case] enabled: bool, #[case] world_ready: bool) {
    let table = generate("en", &[("Vampiric", "Vampiric")], &[("Vampiric", "x")], enabled, world_ready);
    assert!(table.is_empty());
}

#[test]
fn test_missing_note_yields_nothing() {
    let locale = Locale::default();
    let display_names = names(&[("Vampiric", "Vampiric")]);
    let table = generate_tooltips(&TooltipInputs {
        autogeneration_enabled: true,
        world_ready: true,
        locale: &locale,
        display_names: &display_names,
        translations: &BTreeMap::new(),
        lore_note: None,
    });
    assert!(table.is_empty());
}

#[test]
fn test_note_entries_without_names_are_dropped() {
    let lore = parse_lore_note("^:nameless^Artful：Spins faster.^no colon here");
    assert_eq!(lore.len(), 1);
    assert_eq!(lore.get("artful"), Some("Spins faster."));
}

struct NoteSource;

impl LocalizationSource for NoteSource {
    fn display_names(&self, locale: &Locale) -> BTreeMap<String, String> {
        let name = if locale.is_russian() { "Вампир чары" } else { "Vampiric" };
        names(&[("Vampiric", name)])
    }

    fn tooltip_data(&self, locale: &Locale) -> BTreeMap<String, String> {
        let display_names = self.display_names(locale);
        let translations = if locale.is_russian() {
            BTreeMap::new()
        } else {
            names(&[(
                "Vampiric",
                "Gain a small amount of health back every time you slay a monster.",
            )])
        };
        generate_tooltips(&TooltipInputs {
            autogeneration_enabled: true,
            world_ready: true,
            locale,
            display_names: &display_names,
            translations: &translations,
            lore_note: Some(NOTE),
        })
    }
}

#[test]
fn test_assets_wrap_and_follow_locale() {
    let mut assets = Assets::new(NoteSource, Locale::default());
    let tooltip = assets.tooltip("Vampiric").unwrap();
    assert!(tooltip.lines().count() > 1);
    assert!(tooltip.lines().all(|line| line.chars().count() <= TOOLTIP_WRAP_WIDTH));

    assets.set_locale(Locale::new("ru"));
    assert!(!assets.is_loaded(AssetName::TooltipData));
    let option = assets.option("Vampiric");
    assert_eq!(option.display, "Вампир чары");
    assert_eq!(option.tooltip.as_deref(), Some("Лечит."));
}

#[test]
fn test_refresh_only_reloads_loaded_tables() {
    let mut assets = Assets::new(NoteSource, Locale::default());
    assets.display_names();
    assets.refresh(Some(&HashSet::from([AssetName::DisplayNames, AssetName::TooltipData])));
    assert!(!assets.is_loaded(AssetName::DisplayNames));
    assert!(!assets.is_loaded(AssetName::TooltipData));
    assert_eq!(assets.display_name("Vampiric"), Some("Vampiric"));
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anvil.toml");
    let mut config = MenuConfig::default();
    config.tooltip_behavior = TooltipBehavior::On;
    config.right_arrow = vec!["D".into(), "Right".into()];
    config.save(&path).unwrap();

    let loaded = MenuConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(std::fs::read_to_string(&path).unwrap().contains("tooltip_behavior = \"On\""));
}
