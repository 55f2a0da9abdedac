#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

pub use vc_contract as contract;
pub use vc_shape as shape;

#[cfg(feature = "json")]
pub mod json;

pub use vc_shape::install;

/// Commonly used items.
pub mod prelude {
    pub use vc_contract::{
        ContractBuilder, ContractError, ContractRegistry, DecodeError, EncodeError, FieldError,
        Record, impl_field_type,
    };
    pub use vc_shape::{PropertyNames, SingleOrArray};

    #[cfg(feature = "auto_register")]
    pub use vc_contract::auto_register;
}
