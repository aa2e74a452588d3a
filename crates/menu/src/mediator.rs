//! Hand-off between the widget the player sees and the shim that needs the answer.
//!
//! The mediator holds at most one pending choice, tagged with the invocation that
//! requested it. A shim only ever sees the choice offered for its own invocation,
//! and consuming it tears the widget down.

use crate::Result;
use crate::carousel::{Anchor, Carousel, CarouselSettings, Cue};
use crate::choice::ChoiceOption;
use crate::input::{NavCommand, PointerEvent};
use tracing::{debug, warn};

/// Which forge routine call a choice feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChoiceKind {
    /// The enchantment applied by the catalyst.
    Enchantment,
    /// The innate enchantment added by the innate catalyst.
    Innate,
}

/// Identifies one forge invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InvocationContext {
    /// Unique id of the tool being forged.
    pub tool_uid: u64,
    pub kind: ChoiceKind,
}

impl InvocationContext {
    pub const fn new(tool_uid: u64, kind: ChoiceKind) -> Self {
        Self { tool_uid, kind }
    }
}

/// What [`SelectionMediator::offer_choices`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Offer {
    /// No options; nothing is pending.
    Skipped,
    /// Exactly one option; it is pending without a widget.
    Direct(ChoiceOption),
    /// A carousel is open.
    Menu,
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Direct {
        context: InvocationContext,
        option: ChoiceOption,
    },
    Menu {
        context: InvocationContext,
        carousel: Carousel,
    },
}

/// Owns the pending choice and the carousel showing it.
#[derive(Debug, Default)]
pub struct SelectionMediator {
    slot: Slot,
}

impl SelectionMediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers `options` for `context`, replacing anything still pending.
    ///
    /// Fails only if the carousel cannot be laid out; nothing is pending then.
    pub fn offer_choices(
        &mut self,
        context: InvocationContext,
        options: Vec<ChoiceOption>,
        settings: CarouselSettings,
        anchor: Anchor,
    ) -> Result<Offer> {
        if let Some(stale) = self.context() {
            warn!("Mediator: replacing pending choice for {stale:?} with {context:?}");
        }
        self.clear();

        let mut options = options;
        match options.len() {
            0 => {
                debug!("Mediator: no options for {context:?}");
                Ok(Offer::Skipped)
            }
            1 => {
                let option = options.remove(0);
                debug!("Mediator: single option '{}' for {context:?}", option.key);
                self.slot = Slot::Direct {
                    context,
                    option: option.clone(),
                };
                Ok(Offer::Direct(option))
            }
            n => {
                let carousel = Carousel::new(options, settings, anchor)?;
                debug!("Mediator: offering {n} options for {context:?}");
                self.slot = Slot::Menu { context, carousel };
                Ok(Offer::Menu)
            }
        }
    }

    /// The pending choice, if it belongs to `context`.
    pub fn current_choice(&self, context: &InvocationContext) -> Option<&ChoiceOption> {
        match &self.slot {
            Slot::Direct { context: owner, option } if owner == context => Some(option),
            Slot::Menu { context: owner, carousel } if owner == context && carousel.is_open() => {
                Some(carousel.current())
            }
            _ => None,
        }
    }

    /// Takes the pending choice for `context` and closes the widget.
    pub fn consume(&mut self, context: &InvocationContext) -> Option<ChoiceOption> {
        let choice = self.current_choice(context)?.clone();
        debug!("Mediator: consumed '{}' for {context:?}", choice.key);
        self.clear();
        Some(choice)
    }

    /// Drops whatever is pending for `context`. A no-op otherwise.
    pub fn cancel(&mut self, context: &InvocationContext) {
        if self.context().as_ref() == Some(context) {
            debug!("Mediator: cancelled {context:?}");
            self.clear();
        }
    }

    /// Drops whatever is pending, whoever owns it.
    pub fn dismiss(&mut self) {
        if let Some(context) = self.context() {
            debug!("Mediator: dismissed {context:?}");
        }
        self.clear();
    }

    fn clear(&mut self) {
        if let Slot::Menu { carousel, .. } = &mut self.slot {
            carousel.close();
        }
        self.slot = Slot::Empty;
    }

    /// The invocation owning the pending choice.
    pub fn context(&self) -> Option<InvocationContext> {
        match &self.slot {
            Slot::Empty => None,
            Slot::Direct { context, .. } | Slot::Menu { context, .. } => Some(*context),
        }
    }

    /// True while a carousel is showing.
    pub fn is_open(&self) -> bool {
        matches!(&self.slot, Slot::Menu { carousel, .. } if carousel.is_open())
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        match &self.slot {
            Slot::Menu { carousel, .. } => Some(carousel),
            _ => None,
        }
    }

    pub fn carousel_mut(&mut self) -> Option<&mut Carousel> {
        match &mut self.slot {
            Slot::Menu { carousel, .. } => Some(carousel),
            _ => None,
        }
    }

    /// Feeds navigation commands to the open carousel, in order.
    pub fn apply_commands(&mut self, commands: &[NavCommand], play_sound: bool) -> Vec<Cue> {
        let Some(carousel) = self.carousel_mut() else {
            return Vec::new();
        };
        commands
            .iter()
            .filter_map(|command| match command {
                NavCommand::Retreat => carousel.retreat(play_sound),
                NavCommand::Advance => carousel.advance(play_sound),
            })
            .collect()
    }

    /// Feeds a pointer event to the open carousel.
    pub fn apply_pointer(&mut self, event: PointerEvent, play_sound: bool) -> Option<Cue> {
        let carousel = self.carousel_mut()?;
        match event {
            PointerEvent::Moved { x, y } => {
                carousel.hover(x, y);
                None
            }
            PointerEvent::Clicked { x, y } => carousel.click(x, y, play_sound),
        }
    }
}
