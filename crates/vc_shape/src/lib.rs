#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod alias;
pub mod single_or_array;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use alias::{AliasError, AliasModifier, PropertyNames};
pub use single_or_array::{ShapeError, SingleOrArray, SingleOrArrayModifier};

use vc_contract::ContractRegistry;

/// Adds [`SingleOrArrayModifier`] and [`AliasModifier`] to `registry`.
///
/// Contracts computed so far are discarded.
pub fn install(registry: &mut ContractRegistry) -> &mut ContractRegistry {
    registry
        .add_modifier(SingleOrArrayModifier)
        .add_modifier(AliasModifier)
}
