//! One forge from start to finish: offering the choice, then running the forge
//! routine with each recognised call routed to the host or to its shim.

use crate::host::ForgeHost;
use crate::item::{Enchantment, Item, is_catalyst, is_innate_catalyst, is_specialized_weapon};
use crate::options::OptionsProvider;
use crate::patch;
use crate::shim;
use crate::{Error, Result};
use anvil_core::{MethodRef, Routine};
use anvil_menu::{Anchor, CarouselSettings, ChoiceKind, InvocationContext, MenuConfig, Offer, SelectionMediator};
use rand::rngs::StdRng;
use tracing::{debug, warn};

/// Which choice, if any, a tool and catalyst pair calls for.
pub fn choice_kind(tool: &Item, catalyst: &Item, config: &MenuConfig) -> Option<ChoiceKind> {
    if is_catalyst(catalyst) {
        Some(ChoiceKind::Enchantment)
    } else if is_innate_catalyst(catalyst) && is_specialized_weapon(tool) {
        config
            .override_innate_enchantments
            .then_some(ChoiceKind::Innate)
    } else {
        None
    }
}

/// Offers the player a choice for forging `catalyst` into `tool`.
pub fn prepare_forge<H: ForgeHost, P: OptionsProvider>(
    host: &H,
    options: &P,
    mediator: &mut SelectionMediator,
    config: &MenuConfig,
    tool: &Item,
    catalyst: &Item,
    anchor: Anchor,
) -> Result<Offer> {
    let Some(kind) = choice_kind(tool, catalyst, config) else {
        debug!("No choice to offer for {} + {}", tool.name, catalyst.name);
        mediator.dismiss();
        return Ok(Offer::Skipped);
    };
    let settings = CarouselSettings::from_config(config, host.lore_discovered());
    let choices = options.options(tool, kind);
    Ok(mediator.offer_choices(InvocationContext::new(tool.uid, kind), choices, settings, anchor)?)
}

/// Where a recognised call site goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// The host's enchantment lookup.
    EnchantmentFromItem,
    /// The shim for the enchantment lookup.
    SubstituteEnchantment,
    /// The host's innate reroll.
    AddRandomInnate,
    /// The shim for the innate reroll.
    SubstituteInnate,
}

impl Binding {
    fn for_callee(callee: &MethodRef) -> Option<Self> {
        [
            (patch::get_enchantment_from_item(), Self::EnchantmentFromItem),
            (patch::substitute_enchantment(), Self::SubstituteEnchantment),
            (patch::attempt_add_random_innate_enchantment(), Self::AddRandomInnate),
            (patch::substitute_innate_enchantment(), Self::SubstituteInnate),
        ]
        .into_iter()
        .find_map(|(method, binding)| (method == *callee).then_some(binding))
    }

    pub const fn is_substitute(self) -> bool {
        matches!(self, Self::SubstituteEnchantment | Self::SubstituteInnate)
    }
}

/// What a forge did to the tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForgeOutcome {
    Enchanted(Enchantment),
    InnateRerolled,
    Unchanged,
}

/// The forge routine with its call sites bound to host routines or shims.
#[derive(Clone, Debug)]
pub struct Forge {
    enchantment: Binding,
    innate: Binding,
}

impl Forge {
    /// Binds the first enchantment lookup and the first innate reroll found in
    /// `routine`, in whichever form the routine currently calls them.
    pub fn bind_calls(routine: &Routine) -> Result<Self> {
        let bindings: Vec<(usize, Binding)> = anvil_core::call_sites(&routine.body)
            .filter_map(|(index, callee)| Binding::for_callee(callee).map(|b| (index, b)))
            .collect();
        for (index, binding) in &bindings {
            debug!("Forge: call at {index} bound to {binding:?}");
        }

        let find = |wanted: [Binding; 2], name: &'static str| {
            bindings
                .iter()
                .map(|(_, b)| *b)
                .find(|b| wanted.contains(b))
                .ok_or(Error::MissingCallSite(name))
        };
        Ok(Self {
            enchantment: find(
                [Binding::EnchantmentFromItem, Binding::SubstituteEnchantment],
                "enchantment lookup",
            )?,
            innate: find(
                [Binding::AddRandomInnate, Binding::SubstituteInnate],
                "innate reroll",
            )?,
        })
    }

    pub fn is_patched(&self) -> bool {
        self.enchantment.is_substitute() && self.innate.is_substitute()
    }

    pub fn bindings(&self) -> (Binding, Binding) {
        (self.enchantment, self.innate)
    }

    /// Forges `catalyst` into `tool`.
    ///
    /// Mirrors the routine: an enchantment the tool lacks is added; otherwise the
    /// innate catalyst rerolls the weapon's innate enchantments.
    pub fn run<H: ForgeHost>(
        &self,
        host: &mut H,
        mediator: &mut SelectionMediator,
        mut tool: Item,
        catalyst: &Item,
        rng: &mut StdRng,
    ) -> (Item, ForgeOutcome) {
        let enchantment = match self.enchantment {
            Binding::SubstituteEnchantment => shim::substitute_enchantment(host, mediator, &tool, catalyst),
            _ => host.enchantment_from_item(&tool, catalyst),
        };
        if let Some(enchantment) = enchantment {
            if !tool.has_enchantment(&enchantment) {
                tool.enchantments.push(enchantment.clone());
                return (tool, ForgeOutcome::Enchanted(enchantment));
            }
            warn!("Forge: {} already has {enchantment}", tool.name);
        }

        if !is_innate_catalyst(catalyst) {
            return (tool, ForgeOutcome::Unchanged);
        }
        let before = tool.enchantments.clone();
        let tool = match self.innate {
            Binding::SubstituteInnate => {
                shim::substitute_innate_enchantment(host, mediator, tool, rng, true, None)
            }
            _ => host.attempt_add_random_innate_enchantment(tool, rng, true, None),
        };
        let outcome = if tool.enchantments == before {
            ForgeOutcome::Unchanged
        } else {
            ForgeOutcome::InnateRerolled
        };
        (tool, outcome)
    }
}
