//! Redirect shims.
//!
//! Each shim stands in for one host routine at a patched call site. It returns
//! the player's pending choice when one exists for this forge and otherwise
//! defers to the routine it replaced. No failure escapes a shim: it is logged
//! and the original routine runs instead.

use crate::host::ForgeHost;
use crate::item::{Enchantment, Item, is_catalyst, is_specialized_weapon};
use crate::{Error, Result};
use anvil_menu::{ChoiceKind, InvocationContext, SelectionMediator};
use rand::rngs::StdRng;
use tracing::{debug, error};

/// Stands in for the host's enchantment lookup.
pub fn substitute_enchantment<H: ForgeHost + ?Sized>(
    host: &mut H,
    mediator: &mut SelectionMediator,
    tool: &Item,
    catalyst: &Item,
) -> Option<Enchantment> {
    let context = InvocationContext::new(tool.uid, ChoiceKind::Enchantment);
    match take_selection(host, mediator, &context, is_catalyst(catalyst)) {
        Ok(Some(enchantment)) => return Some(enchantment),
        Ok(None) => {}
        Err(e) => error!("Failed in forcing selection of enchantment: {e}"),
    }
    host.enchantment_from_item(tool, catalyst)
}

/// Stands in for the host's innate reroll.
pub fn substitute_innate_enchantment<H: ForgeHost + ?Sized>(
    host: &mut H,
    mediator: &mut SelectionMediator,
    mut weapon: Item,
    rng: &mut StdRng,
    force: bool,
    reroll_exclude: Option<&[Enchantment]>,
) -> Item {
    let context = InvocationContext::new(weapon.uid, ChoiceKind::Innate);
    match take_selection(host, mediator, &context, is_specialized_weapon(&weapon)) {
        Ok(Some(enchantment)) => {
            debug!("Shim: adding chosen innate {enchantment} to {}", weapon.name);
            weapon.enchantments.push(enchantment);
            return weapon;
        }
        Ok(None) => {}
        Err(e) => error!("Failed in forcing selection of innate enchantment: {e}"),
    }
    host.attempt_add_random_innate_enchantment(weapon, rng, force, reroll_exclude)
}

/// Consumes the pending choice for `context` if `eligible`.
///
/// A choice that does not resolve to an enchantment is cancelled and reported.
fn take_selection<H: ForgeHost + ?Sized>(
    host: &H,
    mediator: &mut SelectionMediator,
    context: &InvocationContext,
    eligible: bool,
) -> Result<Option<Enchantment>> {
    if !eligible {
        return Ok(None);
    }
    let Some(choice) = mediator.current_choice(context) else {
        return Ok(None);
    };
    let Some(enchantment) = host.resolve_enchantment(&choice.key) else {
        let key = choice.key.clone();
        mediator.cancel(context);
        return Err(Error::UnknownEnchantment(key));
    };
    mediator.consume(context);
    debug!("Shim: using chosen enchantment {enchantment} for {context:?}");
    Ok(Some(enchantment))
}
