#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod utils;

pub mod codec;
pub mod contract;
pub mod descriptor;
pub mod error;
pub mod info;
pub mod registry;
pub mod serde;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use contract::{ContractBuilder, Record, TypeContract};
pub use error::{ContractError, DecodeError, EncodeError, FieldError};
pub use registry::ContractRegistry;
