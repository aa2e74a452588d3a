//! The carousel: a cyclic single-slot choice widget.
//!
//! A carousel is built `Open` for one invocation and ends `Closed`; it is never
//! reopened. While open it owns its options and index, lays itself out from an
//! [`Anchor`], tracks whether the pointer is over the label, and reports a
//! [`Cue`] whenever the selection moves.

use crate::choice::ChoiceOption;
use crate::config::MenuConfig;
use crate::{Error, Result};
use ratatui::layout::Rect;
use ratatui::text::Line;
use tracing::debug;

/// Width of the carousel body, in cells.
pub const WIDTH: u16 = 40;
/// Height of the carousel body, in cells.
pub const HEIGHT: u16 = 7;
/// Height of the framed label box.
pub const BOX_HEIGHT: u16 = 3;
/// Horizontal padding added around the label inside the box.
pub const BOX_PADDING: u16 = 6;
pub const BUTTON_WIDTH: u16 = 5;
pub const BUTTON_HEIGHT: u16 = 3;
/// Gap between the carousel body and each control.
pub const BUTTON_GAP: u16 = 3;
/// Frames a control stays highlighted after being pressed.
pub const PULSE_FRAMES: u8 = 3;

/// The frame is sized for this label up front so it does not jump as the user
/// cycles through shorter and longer names.
pub const REFERENCE_LABEL: &str = "Matador de Insetos";

/// Normalizes a raw index into `[0, len)`, wrapping negative values.
///
/// Returns 0 for an empty list.
pub fn normalize_index(raw: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    raw.rem_euclid(len as i64) as usize
}

/// Where the carousel positions itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Centered in the viewport.
    Viewport(Rect),
    /// Next to a hosting parent menu.
    Parent(Rect),
}

/// Lifecycle of a carousel instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Open,
    Closed,
}

/// Feedback the host should play when the selection moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Shwip,
}

/// Settings fixed for the lifetime of one carousel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarouselSettings {
    /// Whether hover tooltips are shown at all.
    pub show_tooltip: bool,
}

impl CarouselSettings {
    /// Resolves the tooltip mode once, given whether the player has found the lore
    /// that explains the choices.
    pub fn from_config(config: &MenuConfig, lore_discovered: bool) -> Self {
        Self {
            show_tooltip: config.tooltip_behavior.should_show(lore_discovered),
        }
    }
}

/// Screen regions of a laid-out carousel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarouselLayout {
    /// The carousel body.
    pub area: Rect,
    /// The retreat control.
    pub back_button: Rect,
    /// The advance control.
    pub forward_button: Rect,
    /// Region over the label that triggers the tooltip.
    pub hover_region: Rect,
}

impl CarouselLayout {
    fn compute(anchor: Anchor, inherent_width: u16) -> Result<Self> {
        let (x, y) = match anchor {
            Anchor::Parent(parent) => (parent.x.saturating_add(12), parent.y.saturating_sub(4)),
            Anchor::Viewport(view) => {
                let needed = WIDTH + 2 * (BUTTON_GAP + BUTTON_WIDTH);
                if view.width < needed || view.height < HEIGHT {
                    return Err(Error::ViewportTooSmall {
                        width: view.width,
                        height: view.height,
                    });
                }
                let centered_x = ((view.width - WIDTH) / 2).saturating_sub(8);
                let centered_y = ((view.height - HEIGHT) / 2).saturating_sub(3);
                (
                    view.x + centered_x.max(BUTTON_GAP + BUTTON_WIDTH),
                    view.y + centered_y,
                )
            }
        };

        let area = Rect::new(x, y, WIDTH, HEIGHT);
        let button_y = y + HEIGHT / 2 - BUTTON_HEIGHT / 2;
        let back_button = Rect::new(
            x.saturating_sub(BUTTON_GAP + BUTTON_WIDTH),
            button_y,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        );
        let forward_button = Rect::new(
            x.saturating_add(WIDTH + BUTTON_GAP),
            button_y,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        );
        let hover_width = (inherent_width + BOX_PADDING).min(WIDTH);
        let hover_region = Rect::new(
            x + (WIDTH - hover_width) / 2,
            y + HEIGHT / 2 - BOX_HEIGHT / 2,
            hover_width,
            BOX_HEIGHT,
        );

        Ok(Self {
            area,
            back_button,
            forward_button,
            hover_region,
        })
    }
}

/// Returns true if the point lies inside `rect`.
pub const fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Display width of a label in cells.
pub fn label_width(label: &str) -> u16 {
    Line::from(label).width().try_into().unwrap_or(u16::MAX)
}

/// The carousel widget state.
#[derive(Clone, Debug)]
pub struct Carousel {
    options: Vec<ChoiceOption>,
    index: usize,
    phase: Phase,
    settings: CarouselSettings,
    inherent_width: u16,
    layout: CarouselLayout,
    hovered: bool,
    pointer: Option<(u16, u16)>,
    back_pulse: u8,
    forward_pulse: u8,
}

impl Carousel {
    /// Builds an open carousel over a non-empty option list.
    pub fn new(options: Vec<ChoiceOption>, settings: CarouselSettings, anchor: Anchor) -> Result<Self> {
        if options.is_empty() {
            return Err(Error::NoOptions);
        }
        let inherent_width = label_width(REFERENCE_LABEL) + 2;
        let layout = CarouselLayout::compute(anchor, inherent_width)?;
        debug!("Carousel: opened with {} options", options.len());
        Ok(Self {
            options,
            index: 0,
            phase: Phase::Open,
            settings,
            inherent_width,
            layout,
            hovered: false,
            pointer: None,
            back_pulse: 0,
            forward_pulse: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Current index, always in `[0, len)`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sets the index from a raw, possibly negative value.
    pub fn set_index(&mut self, raw: i64) {
        self.index = normalize_index(raw, self.options.len());
    }

    /// The currently selected option.
    pub fn current(&self) -> &ChoiceOption {
        &self.options[self.index]
    }

    pub fn settings(&self) -> CarouselSettings {
        self.settings
    }

    pub fn layout(&self) -> &CarouselLayout {
        &self.layout
    }

    /// Width reserved for labels, from [`REFERENCE_LABEL`].
    pub fn inherent_width(&self) -> u16 {
        self.inherent_width
    }

    /// Moves to the next option, wrapping.
    pub fn advance(&mut self, play_sound: bool) -> Option<Cue> {
        if !self.is_open() {
            debug!("Carousel: advance ignored, carousel is closed");
            return None;
        }
        self.set_index(self.index as i64 + 1);
        self.forward_pulse = PULSE_FRAMES;
        play_sound.then_some(Cue::Shwip)
    }

    /// Moves to the previous option, wrapping.
    pub fn retreat(&mut self, play_sound: bool) -> Option<Cue> {
        if !self.is_open() {
            debug!("Carousel: retreat ignored, carousel is closed");
            return None;
        }
        self.set_index(self.index as i64 - 1);
        self.back_pulse = PULSE_FRAMES;
        play_sound.then_some(Cue::Shwip)
    }

    /// Updates the hover flag from a pointer position.
    pub fn hover(&mut self, x: u16, y: u16) {
        if !self.is_open() {
            return;
        }
        self.pointer = Some((x, y));
        self.hovered = contains(self.layout.hover_region, x, y);
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> Option<(u16, u16)> {
        self.pointer
    }

    /// Handles a click; either mouse button acts on the controls.
    pub fn click(&mut self, x: u16, y: u16, play_sound: bool) -> Option<Cue> {
        if contains(self.layout.back_button, x, y) {
            self.retreat(play_sound)
        } else if contains(self.layout.forward_button, x, y) {
            self.advance(play_sound)
        } else {
            None
        }
    }

    /// Recomputes the layout after a resize. On failure the previous layout is kept.
    pub fn relayout(&mut self, anchor: Anchor) -> Result<()> {
        self.layout = CarouselLayout::compute(anchor, self.inherent_width)?;
        if let Some((x, y)) = self.pointer {
            self.hovered = contains(self.layout.hover_region, x, y);
        }
        Ok(())
    }

    /// Closes the carousel for good.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Carousel: closed on '{}'", self.current().key);
        }
        self.phase = Phase::Closed;
        self.hovered = false;
    }

    /// The tooltip to draw right now, if any.
    pub fn tooltip(&self) -> Option<&str> {
        if self.is_open() && self.settings.show_tooltip && self.hovered {
            self.current().tooltip.as_deref()
        } else {
            None
        }
    }

    /// The framed label box, sized to the wider of the reference label and the
    /// current label.
    pub fn frame_rect(&self) -> Rect {
        let label = label_width(&self.current().display);
        let width = (self.inherent_width.max(label) + BOX_PADDING).min(WIDTH);
        let area = self.layout.area;
        Rect::new(
            area.x + (WIDTH - width) / 2,
            area.y + HEIGHT / 2 - BOX_HEIGHT / 2,
            width,
            BOX_HEIGHT,
        )
    }

    /// Pulse frames left on each control, `(back, forward)`.
    pub fn pulses(&self) -> (u8, u8) {
        (self.back_pulse, self.forward_pulse)
    }

    /// Decays the press pulses by one frame.
    pub fn tick(&mut self) {
        self.back_pulse = self.back_pulse.saturating_sub(1);
        self.forward_pulse = self.forward_pulse.saturating_sub(1);
    }
}
