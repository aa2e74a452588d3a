use anvil_menu::input::{Bindings, NavCommand, PointerEvent};
use anvil_menu::{
    Anchor, CarouselSettings, ChoiceKind, ChoiceOption, Cue, InvocationContext, MenuConfig, Offer, Rect,
    SelectionMediator,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use rstest::rstest;

const FORGE: InvocationContext = InvocationContext::new(100, ChoiceKind::Enchantment);

fn anchor() -> Anchor {
    Anchor::Viewport(Rect::new(0, 0, 100, 30))
}

fn abc() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("A", "Artful"),
        ChoiceOption::new("B", "Bug Killer").with_tooltip("Pierces armor."),
        ChoiceOption::new("C", "Crusader"),
    ]
}

fn hover_label(mediator: &mut SelectionMediator) {
    let region = mediator.carousel().unwrap().layout().hover_region;
    mediator.apply_pointer(PointerEvent::Moved { x: region.x, y: region.y }, false);
}

#[rstest]
#[case::tooltips_on(true, Some("Pierces armor."))]
#[case::tooltips_off(false, None)]
fn test_pick_second_of_three(#[case] show_tooltip: bool, #[case] tooltip: Option<&str>) {
    let mut mediator = SelectionMediator::new();
    let offer = mediator
        .offer_choices(FORGE, abc(), CarouselSettings { show_tooltip }, anchor())
        .unwrap();
    assert_eq!(offer, Offer::Menu);

    let bindings = Bindings::default();
    let commands = bindings.commands_for_key(&KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
    assert_eq!(commands, vec![NavCommand::Advance]);
    assert_eq!(mediator.apply_commands(&commands, true), vec![Cue::Shwip]);
    assert_eq!(mediator.current_choice(&FORGE).unwrap().key, "B");

    hover_label(&mut mediator);
    assert_eq!(mediator.carousel().unwrap().tooltip(), tooltip);

    assert_eq!(mediator.consume(&FORGE).unwrap().key, "B");
    assert!(mediator.current_choice(&FORGE).is_none());
    assert!(!mediator.is_open());
}

#[test]
fn test_consume_only_once() {
    let mut mediator = SelectionMediator::new();
    mediator
        .offer_choices(FORGE, abc(), CarouselSettings { show_tooltip: false }, anchor())
        .unwrap();
    assert!(mediator.consume(&FORGE).is_some());
    assert!(mediator.consume(&FORGE).is_none());

    mediator.cancel(&FORGE);
    assert!(mediator.context().is_none());
}

#[test]
fn test_single_option_skips_the_widget() {
    let mut mediator = SelectionMediator::new();
    let only = ChoiceOption::new("Master", "Master");
    let offer = mediator
        .offer_choices(FORGE, vec![only.clone()], CarouselSettings { show_tooltip: true }, anchor())
        .unwrap();

    assert_eq!(offer, Offer::Direct(only.clone()));
    assert!(mediator.carousel().is_none());
    assert!(!mediator.is_open());
    assert!(mediator.apply_commands(&[NavCommand::Advance], true).is_empty());
    assert_eq!(mediator.consume(&FORGE), Some(only));
}

#[test]
fn test_new_offer_replaces_pending_choice() {
    let mut mediator = SelectionMediator::new();
    mediator
        .offer_choices(FORGE, abc(), CarouselSettings { show_tooltip: false }, anchor())
        .unwrap();
    let innate = InvocationContext::new(100, ChoiceKind::Innate);
    mediator
        .offer_choices(
            innate,
            vec![ChoiceOption::new("Crit", "Crit"), ChoiceOption::new("Defense", "Defense")],
            CarouselSettings { show_tooltip: false },
            anchor(),
        )
        .unwrap();

    assert!(mediator.current_choice(&FORGE).is_none());
    assert_eq!(mediator.consume(&innate).unwrap().key, "Crit");
}

#[test]
fn test_tiny_viewport_offers_nothing() {
    let mut mediator = SelectionMediator::new();
    let err = mediator
        .offer_choices(
            FORGE,
            abc(),
            CarouselSettings { show_tooltip: false },
            Anchor::Viewport(Rect::new(0, 0, 20, 5)),
        )
        .unwrap_err();
    assert!(matches!(err, anvil_menu::Error::ViewportTooSmall { width: 20, height: 5 }));
    assert!(mediator.context().is_none());
}

#[test]
fn test_configured_keys_drive_the_carousel() {
    let config = MenuConfig::from_toml("left_arrow = [\"A\"]\nright_arrow = [\"D\", \"Ctrl+Right\"]\n").unwrap();
    let bindings = Bindings::from_config(&config).unwrap();
    let mut mediator = SelectionMediator::new();
    mediator
        .offer_choices(FORGE, abc(), CarouselSettings { show_tooltip: false }, anchor())
        .unwrap();

    for key in [
        KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT),
        // unbound: only Ctrl+Right moves forward
        KeyEvent::new(KeyCode::Right, KeyModifiers::NONE),
    ] {
        mediator.apply_commands(&bindings.commands_for_key(&key), false);
    }
    assert_eq!(mediator.current_choice(&FORGE).unwrap().key, "B");

    mediator.apply_commands(
        &bindings.commands_for_key(&KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL)),
        false,
    );
    assert_eq!(mediator.current_choice(&FORGE).unwrap().key, "C");
}

#[test]
fn test_clicks_on_buttons_navigate() {
    let mut mediator = SelectionMediator::new();
    mediator
        .offer_choices(FORGE, abc(), CarouselSettings { show_tooltip: false }, anchor())
        .unwrap();
    let back = mediator.carousel().unwrap().layout().back_button;
    let cue = mediator.apply_pointer(PointerEvent::Clicked { x: back.x, y: back.y }, true);
    assert_eq!(cue, Some(Cue::Shwip));
    assert_eq!(mediator.current_choice(&FORGE).unwrap().key, "C");
}
