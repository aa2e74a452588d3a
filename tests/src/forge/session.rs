use anvil_core::patcher::Patcher;
use anvil_forge::localization::CatalogSource;
use anvil_forge::options::HostOptions;
use anvil_forge::patch::{OWNER, forge_routine};
use anvil_forge::{
    Catalog, CatalogHost, Enchantment, Forge, ForgeHost, ForgeOutcome, ForgePatch, Item, ItemKind, prepare_forge,
};
use anvil_menu::assets::{Assets, Locale};
use anvil_menu::input::NavCommand;
use anvil_menu::{Anchor, ChoiceKind, InvocationContext, MenuConfig, Offer, Rect, SelectionMediator};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

struct Bench {
    host: CatalogHost,
    assets: Assets<CatalogSource>,
    mediator: SelectionMediator,
    config: MenuConfig,
}

impl Bench {
    fn new(locale: &str) -> Self {
        let catalog = Catalog::builtin().unwrap();
        Self {
            host: CatalogHost::new(catalog.clone(), 5),
            assets: Assets::new(CatalogSource::new(catalog, true), Locale::new(locale)),
            mediator: SelectionMediator::new(),
            config: MenuConfig::default(),
        }
    }

    fn offer(&mut self, tool: &Item, catalyst: &Item) -> Offer {
        prepare_forge(
            &self.host,
            &HostOptions::new(&self.host, &self.assets),
            &mut self.mediator,
            &self.config,
            tool,
            catalyst,
            Anchor::Viewport(Rect::new(0, 0, 100, 30)),
        )
        .unwrap()
    }

    fn forge(&mut self, forge: &Forge, tool: Item, catalyst: &Item) -> (Item, ForgeOutcome) {
        let mut rng = StdRng::seed_from_u64(17);
        forge.run(&mut self.host, &mut self.mediator, tool, catalyst, &mut rng)
    }
}

fn patched() -> Forge {
    let mut routine = forge_routine().unwrap();
    assert!(Patcher::new(OWNER).patch(&mut routine, &ForgePatch::new()).unwrap().is_patched());
    Forge::bind_calls(&routine).unwrap()
}

fn unpatched() -> Forge {
    Forge::bind_calls(&forge_routine().unwrap()).unwrap()
}

fn sword() -> Item {
    Item::new(9, "(W)4", "Galaxy Sword", ItemKind::MeleeWeapon)
}

#[test]
fn test_chosen_enchantment_is_applied() {
    let mut bench = Bench::new("en");
    assert_eq!(bench.offer(&sword(), &Item::prismatic_shard(1)), Offer::Menu);
    let carousel = bench.mediator.carousel().unwrap();
    assert_eq!(carousel.options().len(), 5);
    let second = carousel.options()[1].clone();

    bench.mediator.apply_commands(&[NavCommand::Advance], false);
    let (sword, outcome) = bench.forge(&patched(), sword(), &Item::prismatic_shard(1));

    assert_eq!(outcome, ForgeOutcome::Enchanted(Enchantment::new(&second.key)));
    assert_eq!(sword.enchantments, vec![Enchantment::new(&second.key)]);
    assert!(bench.mediator.context().is_none());
}

#[test]
fn test_unpatched_forge_ignores_the_choice() {
    let mut bench = Bench::new("en");
    bench.offer(&sword(), &Item::prismatic_shard(1));
    let (sword, outcome) = bench.forge(&unpatched(), sword(), &Item::prismatic_shard(1));

    let ForgeOutcome::Enchanted(picked) = outcome else {
        panic!("expected an enchantment, got {outcome:?}");
    };
    assert!(sword.has_enchantment(&picked));
    // nothing consumed the pending choice
    let context = InvocationContext::new(9, ChoiceKind::Enchantment);
    assert!(bench.mediator.current_choice(&context).is_some());
}

#[test]
fn test_last_available_enchantment_needs_no_menu() {
    let mut bench = Bench::new("en");
    let mut rod = Item::new(3, "(T)AdvancedIridiumRod", "Advanced Iridium Rod", ItemKind::FishingRod);
    rod.enchantments = ["Preserving", "AutoHook", "Efficient"]
        .into_iter()
        .map(Enchantment::new)
        .collect();

    let offer = bench.offer(&rod, &Item::prismatic_shard(1));
    let Offer::Direct(option) = offer else {
        panic!("expected a direct offer, got {offer:?}");
    };
    assert_eq!(option.key, "Master");
    assert_eq!(option.tooltip.as_deref(), Some("Adds one level to fishing\nskill while held."));

    let (_, outcome) = bench.forge(&patched(), rod, &Item::prismatic_shard(1));
    assert_eq!(outcome, ForgeOutcome::Enchanted(Enchantment::new("Master")));
}

#[test]
fn test_innate_choice_is_appended() {
    let mut bench = Bench::new("en");
    let mut weapon = sword();
    weapon.enchantments.push(Enchantment::new("Vampiric"));

    assert_eq!(bench.offer(&weapon, &Item::dragon_tooth(1)), Offer::Menu);
    bench.mediator.apply_commands(&[NavCommand::Retreat], false);
    let last = bench.mediator.carousel().unwrap().current().key.clone();

    let (weapon, outcome) = bench.forge(&patched(), weapon, &Item::dragon_tooth(1));
    assert_eq!(outcome, ForgeOutcome::InnateRerolled);
    assert_eq!(
        weapon.enchantments,
        vec![Enchantment::new("Vampiric"), Enchantment::new(&last)]
    );
}

#[test]
fn test_innate_override_off_rolls_randomly() {
    let mut bench = Bench::new("en");
    bench.config.override_innate_enchantments = false;
    assert_eq!(bench.offer(&sword(), &Item::dragon_tooth(1)), Offer::Skipped);
    assert!(bench.mediator.context().is_none());

    let (weapon, outcome) = bench.forge(&patched(), sword(), &Item::dragon_tooth(1));
    assert_eq!(outcome, ForgeOutcome::InnateRerolled);
    assert_eq!(weapon.enchantments.len(), 1);
    assert!(bench.host.available_innate_enchantments(&sword()).contains(&weapon.enchantments[0]));
}

#[test]
fn test_other_catalysts_change_nothing() {
    let mut bench = Bench::new("en");
    let quartz = Item::new(4, "(O)80", "Quartz", ItemKind::Object);
    assert_eq!(bench.offer(&sword(), &quartz), Offer::Skipped);
    let (weapon, outcome) = bench.forge(&patched(), sword(), &quartz);
    assert_eq!(outcome, ForgeOutcome::Unchanged);
    assert!(weapon.enchantments.is_empty());
}

#[test]
fn test_russian_labels_and_tooltips() {
    let mut bench = Bench::new("ru");
    bench.host.lore_discovered = true;
    bench.offer(&sword(), &Item::prismatic_shard(1));
    let carousel = bench.mediator.carousel().unwrap();
    assert!(carousel.settings().show_tooltip);

    let vampiric = carousel
        .options()
        .iter()
        .find(|o| o.key == "Vampiric")
        .unwrap();
    assert!(vampiric.display.ends_with("чары"));
    assert!(vampiric.tooltip.is_some());
}
