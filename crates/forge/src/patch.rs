//! The forge routine patch.
//!
//! `Tool::Forge` asks the host for a random enchantment and, for the innate
//! catalyst, a random innate reroll. Both calls are redirected to the shims in
//! [`crate::shim`], which return the player's choice when there is one.

use crate::Result;
use anvil_core::patcher::Transpiler;
use anvil_core::pattern::{CodeMatch, Pattern};
use anvil_core::rewrite::Edit;
use anvil_core::{MethodRef, Opcode, Routine};

/// Owner id recorded on every patch this crate applies.
pub const OWNER: &str = "anvil.forge-choice";

/// The host's forge routine.
pub const FORGE_LISTING: &str = include_str!("../assets/forge.il");

pub fn forge_method() -> MethodRef {
    MethodRef::new_instance("Tool", "Forge", &["Item", "bool"], "bool")
}

pub fn get_enchantment_from_item() -> MethodRef {
    MethodRef::new_static(
        "BaseEnchantment",
        "GetEnchantmentFromItem",
        &["Item", "Item"],
        "BaseEnchantment",
    )
}

pub fn attempt_add_random_innate_enchantment() -> MethodRef {
    MethodRef::new_static(
        "MeleeWeapon",
        "attemptAddRandomInnateEnchantment",
        &["Item", "Random", "bool", "List<BaseEnchantment>"],
        "Item",
    )
}

pub fn substitute_enchantment() -> MethodRef {
    MethodRef::new_static(
        "ForgeChoice",
        "SubstituteEnchantment",
        &["Item", "Item"],
        "BaseEnchantment",
    )
}

pub fn substitute_innate_enchantment() -> MethodRef {
    MethodRef::new_static(
        "ForgeChoice",
        "SubstituteInnateEnchantment",
        &["Item", "Random", "bool", "List<BaseEnchantment>"],
        "Item",
    )
}

/// Parses the bundled forge routine.
pub fn forge_routine() -> Result<Routine> {
    Ok(anvil_core::decoder::parse_routine(FORGE_LISTING)?)
}

/// The two call-site edits, both required.
///
/// The enchantment call is found through the surrounding
/// `ldarg.0; ldarg.1; call; stloc.0; ldloc.0` shape so only the forge's own
/// lookup is touched. The innate call is searched for after it.
pub fn forge_edits() -> anvil_core::Result<Vec<Edit>> {
    let enchantment = Pattern::new(vec![
        CodeMatch::op(Opcode::Ldarg0),
        CodeMatch::op(Opcode::Ldarg1),
        CodeMatch::call(get_enchantment_from_item()),
        CodeMatch::op(Opcode::Stloc0),
        CodeMatch::op(Opcode::Ldloc0),
    ])?;
    let innate = Pattern::new(vec![CodeMatch::call(attempt_add_random_innate_enchantment())])?;
    Ok(vec![
        Edit::required("substitute-enchantment", enchantment, 2, substitute_enchantment()),
        Edit::required("substitute-innate-enchantment", innate, 0, substitute_innate_enchantment()),
    ])
}

/// Transpiler redirecting the forge's enchantment lookups to the shims.
#[derive(Clone, Debug)]
pub struct ForgePatch {
    target: MethodRef,
}

impl ForgePatch {
    pub fn new() -> Self {
        Self {
            target: forge_method(),
        }
    }
}

impl Default for ForgePatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Transpiler for ForgePatch {
    fn name(&self) -> &'static str {
        "ForgePatch"
    }

    fn target(&self) -> &MethodRef {
        &self.target
    }

    fn edits(&self) -> anvil_core::Result<Vec<Edit>> {
        forge_edits()
    }
}
