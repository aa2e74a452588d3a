pub mod decoder;
pub mod opcode;
pub mod patcher;
pub mod pattern;
pub mod result;
pub mod rewrite;

pub use decoder::{Instruction, MethodRef, Operand, Routine};
pub use opcode::Opcode;
pub use result::{Error, Result};

/// Returns true if any call in `body` targets `method`.
///
/// Used to check whether a routine still reaches an original callee after patching.
#[inline]
pub fn calls(body: &[Instruction], method: &MethodRef) -> bool {
    body.iter().any(|i| i.callee() == Some(method))
}

/// Returns the callees of `body` in source order.
pub fn call_sites(body: &[Instruction]) -> impl Iterator<Item = (usize, &MethodRef)> {
    body.iter()
        .enumerate()
        .filter_map(|(idx, i)| i.callee().map(|m| (idx, m)))
}
