//! Interactive forge: offers the carousel in the terminal, then runs the forge
//! routine and prints what happened to the tool.

use super::{CliError, read_catalog};
use anvil_core::patcher::Patcher;
use anvil_forge::localization::CatalogSource;
use anvil_forge::options::HostOptions;
use anvil_forge::patch::{OWNER, forge_routine};
use anvil_forge::{CatalogHost, Forge, ForgeOutcome, ForgePatch, Item, ItemKind, prepare_forge};
use anvil_menu::assets::{Assets, Locale};
use anvil_menu::input::{Bindings, PointerEvent};
use anvil_menu::render::render_carousel;
use anvil_menu::{Anchor, Cue, MenuConfig, Offer, SelectionMediator};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ToolPreset {
    Sword,
    Slingshot,
    Axe,
    Pickaxe,
    Hoe,
    WateringCan,
    FishingRod,
    Pan,
}

impl ToolPreset {
    fn item(self) -> Item {
        let (id, name, kind) = match self {
            Self::Sword => ("(W)4", "Galaxy Sword", ItemKind::MeleeWeapon),
            Self::Slingshot => ("(W)33", "Master Slingshot", ItemKind::Slingshot),
            Self::Axe => ("(T)IridiumAxe", "Iridium Axe", ItemKind::Axe),
            Self::Pickaxe => ("(T)IridiumPickaxe", "Iridium Pickaxe", ItemKind::Pickaxe),
            Self::Hoe => ("(T)IridiumHoe", "Iridium Hoe", ItemKind::Hoe),
            Self::WateringCan => ("(T)IridiumWateringCan", "Iridium Watering Can", ItemKind::WateringCan),
            Self::FishingRod => ("(T)AdvancedIridiumRod", "Advanced Iridium Rod", ItemKind::FishingRod),
            Self::Pan => ("(T)IridiumPan", "Iridium Pan", ItemKind::Pan),
        };
        Item::new(1, id, name, kind)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CatalystPreset {
    PrismaticShard,
    DragonTooth,
}

impl CatalystPreset {
    fn item(self) -> Item {
        match self {
            Self::PrismaticShard => Item::prismatic_shard(2),
            Self::DragonTooth => Item::dragon_tooth(2),
        }
    }
}

/// Arguments for the `forge` subcommand.
#[derive(Args)]
pub struct ForgeArgs {
    /// Tool to forge.
    #[arg(long, value_enum, default_value = "sword")]
    tool: ToolPreset,
    /// Catalyst to forge it with.
    #[arg(long, value_enum, default_value = "prismatic-shard")]
    catalyst: CatalystPreset,
    /// Seed for the host's random rolls.
    #[arg(long)]
    seed: Option<u64>,
    /// Language code for names and tooltips.
    #[arg(long, default_value = "en")]
    locale: String,
    /// Menu configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enchantment catalog (JSON). Defaults to the bundled catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Treat the lore note as already read.
    #[arg(long)]
    lore: bool,
    /// Run the forge routine without the patch.
    #[arg(long)]
    unpatched: bool,
    /// Write debug logs to this file.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

/// How the carousel was left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exit {
    Confirmed,
    Cancelled,
}

#[async_trait]
impl super::Command for ForgeArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        if let Some(path) = &self.log {
            let file = File::create(path).map_err(CliError::File)?;
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_ansi(false)
                .without_time()
                .with_writer(Mutex::new(file))
                .init();
        }

        let config = self
            .config
            .as_deref()
            .map(MenuConfig::load_or_default)
            .unwrap_or_default();
        let bindings = Bindings::from_config(&config).map_err(CliError::Menu)?;
        let catalog = read_catalog(self.catalog.as_ref())?;
        let seed = self.seed.unwrap_or_else(rand::random);
        let mut host = CatalogHost::new(catalog.clone(), seed);
        host.lore_discovered = self.lore;
        let assets = Assets::new(
            CatalogSource::new(catalog, config.enable_tooltip_autogeneration),
            Locale::new(&self.locale),
        );

        let mut routine = forge_routine()?;
        if !self.unpatched {
            let mut patcher = Patcher::new(OWNER);
            let outcome = patcher.patch(&mut routine, &ForgePatch::new())?;
            if !outcome.is_patched() {
                return Err(CliError::Unpatched(routine.method.to_string()).into());
            }
            patcher.snitch_all(Some(OWNER), true);
        }
        let forge = Forge::bind_calls(&routine)?;

        let tool = self.tool.item();
        let catalyst = self.catalyst.item();
        let mut mediator = SelectionMediator::new();

        let (width, height) = crossterm::terminal::size()?;
        let offer = prepare_forge(
            &host,
            &HostOptions::new(&host, &assets),
            &mut mediator,
            &config,
            &tool,
            &catalyst,
            Anchor::Viewport(Rect::new(0, 0, width, height)),
        );
        let exit = match offer {
            Ok(Offer::Menu) => {
                let shown = with_terminal(|terminal| {
                    run_carousel(terminal, &mut mediator, &bindings, &tool, event::read)
                });
                settle(shown, &mut mediator)
            }
            Ok(offer) => {
                debug!("Offer for {}: {offer:?}", tool.name);
                Exit::Confirmed
            }
            Err(e) => {
                error!("Could not show the forge menu: {e}");
                Exit::Confirmed
            }
        };

        if exit == Exit::Cancelled {
            println!("Forge cancelled; {} is unchanged.", tool.name);
            return Ok(());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let (tool, outcome) = forge.run(&mut host, &mut mediator, tool, &catalyst, &mut rng);
        match outcome {
            ForgeOutcome::Enchanted(enchantment) => {
                let name = assets.display_name(enchantment.key()).unwrap_or(enchantment.key());
                println!("{} gained {name}.", tool.name);
            }
            ForgeOutcome::InnateRerolled => println!("{} had its innate enchantments rerolled.", tool.name),
            ForgeOutcome::Unchanged => println!("Nothing happened to {}.", tool.name),
        }
        let names: Vec<&str> = tool
            .enchantments
            .iter()
            .map(|e| assets.display_name(e.key()).unwrap_or(e.key()))
            .collect();
        println!("Enchantments: {}", names.join(", "));
        info!("Forged {} with seed {seed}", tool.name);
        Ok(())
    }
}

/// Runs `f` on a raw-mode alternate screen with mouse capture, restoring the
/// terminal afterwards. A failed restore is logged; `f`'s result is kept.
fn with_terminal<T>(
    f: impl FnOnce(&mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<T>,
) -> io::Result<T> {
    enable_raw_mode()?;
    let res = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
        .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())))
        .and_then(|mut terminal| f(&mut terminal));
    if let Err(e) = restore_terminal() {
        error!("Failed to restore the terminal: {e}");
    }
    res
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)
}

/// How the forge proceeds once the carousel is gone. A menu that failed falls
/// back to forging without a choice.
fn settle(shown: io::Result<Exit>, mediator: &mut SelectionMediator) -> Exit {
    match shown {
        Ok(exit) => exit,
        Err(e) => {
            error!("Forge menu failed, forging without a choice: {e}");
            mediator.dismiss();
            Exit::Confirmed
        }
    }
}

/// Drives the carousel from `next_event` until it is confirmed or cancelled.
///
/// A frame that fails to draw is logged and skipped; input errors end the loop.
fn run_carousel<B: Backend>(
    terminal: &mut Terminal<B>,
    mediator: &mut SelectionMediator,
    bindings: &Bindings,
    tool: &Item,
    mut next_event: impl FnMut() -> io::Result<Event>,
) -> io::Result<Exit> {
    let mut last_cue = None;
    loop {
        if let Err(e) = terminal.draw(|f| draw(f, mediator, tool, last_cue)) {
            error!("Failed to draw the forge menu: {e}");
        }

        match next_event()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => return Ok(Exit::Confirmed),
                KeyCode::Esc | KeyCode::Char('q') => {
                    mediator.dismiss();
                    return Ok(Exit::Cancelled);
                }
                _ => {
                    let commands = bindings.commands_for_key(&key);
                    if let Some(cue) = mediator.apply_commands(&commands, true).pop() {
                        last_cue = Some(cue);
                    }
                }
            },
            Event::Mouse(mouse) => {
                if let Some(pointer) = PointerEvent::from_mouse(mouse)
                    && let Some(cue) = mediator.apply_pointer(pointer, true)
                {
                    last_cue = Some(cue);
                }
            }
            Event::Resize(width, height) => {
                if let Some(carousel) = mediator.carousel_mut()
                    && let Err(e) = carousel.relayout(Anchor::Viewport(Rect::new(0, 0, width, height)))
                {
                    error!("Carousel relayout failed, keeping last layout: {e}");
                }
            }
            _ => {}
        }
    }
}

fn draw(f: &mut Frame<'_>, mediator: &mut SelectionMediator, tool: &Item, cue: Option<Cue>) {
    let area = f.area();
    let header = Line::from(vec![
        Span::styled(
            " Anvil ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" Forging {}", tool.name)),
    ]);
    f.render_widget(Paragraph::new(header), Rect::new(area.x, area.y, area.width, area.height.min(1)));

    let footer = Line::from(vec![
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::styled(" Choose  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" Forge  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" Cancel", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if cue == Some(Cue::Shwip) { "  shwip" } else { "" },
            Style::default().fg(Color::Magenta),
        ),
    ]);
    if area.height > 1 {
        f.render_widget(
            Paragraph::new(footer),
            Rect::new(area.x, area.y + area.height - 1, area.width, 1),
        );
    }

    if let Some(carousel) = mediator.carousel_mut() {
        render_carousel(f, carousel);
    }
}
