use alloc::string::String;

use thiserror::Error;
use vc_contract::ContractError;

use crate::single_or_array::SingleOrArrayModifier;

/// A configuration error raised while adapting a single-or-array field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("`{field}` has type `{ty}`, which is not a sequence")]
    UnsupportedFieldShape { field: String, ty: &'static str },
    #[error("`{field}` holds `{actual}` elements, not `{declared}`")]
    ElementTypeMismatch {
        field: String,
        declared: &'static str,
        actual: &'static str,
    },
}

impl ShapeError {
    #[inline]
    pub(crate) fn at(self, owner: &'static str) -> ContractError {
        ContractError::modifier(SingleOrArrayModifier::NAME, owner, self)
    }
}
