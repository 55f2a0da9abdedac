use alloc::string::String;

use thiserror::Error;
use vc_contract::ContractError;

use crate::alias::AliasModifier;

/// A configuration error raised while expanding aliased fields.
///
/// Reported as [`ContractError::Modifier`], before any document is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AliasError {
    #[error("`{field}` declares no names")]
    EmptyAliasSet { field: String },
    #[error("`{field}` is both aliased and renamed")]
    ConfigurationConflict { field: String },
    #[error("alias `{name}` of `{field}` is already used by another field")]
    DuplicateFieldName { field: String, name: String },
    #[error("`{field}` has no setter, constructor parameter, backing slot or field to write")]
    UnwritableAliasedField { field: String },
}

impl AliasError {
    #[inline]
    pub(crate) fn at(self, owner: &'static str) -> ContractError {
        ContractError::modifier(AliasModifier::NAME, owner, self)
    }
}
