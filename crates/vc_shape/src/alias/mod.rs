//! Multiple keys for one field.
//!
//! A member tagged with [`PropertyNames`] is read from any of its names and
//! written under its serialization name only. [`AliasModifier`] rewrites
//! the contract: the field's descriptor is replaced by one descriptor per
//! name, all sharing a setter that
//!
//! 1. marks the field as written on the record being decoded, failing on a
//!    second write if the names throw on duplicates, and
//! 2. writes the value through the first available path: the decode
//!    constructor, the field's setter, a settable property, the property's
//!    backing slot or a plain field of the same name.
//!
//! The path is chosen once, when the contract is computed. A field with
//! none of them is a configuration error.

mod attribute;
mod error;
mod modifier;
mod session;
mod strategy;

pub use attribute::PropertyNames;
pub use error::AliasError;
pub use modifier::AliasModifier;
