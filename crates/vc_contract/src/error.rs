use alloc::boxed::Box;
use alloc::string::String;
use core::error::Error;

use thiserror::Error;

type BoxedError = Box<dyn Error + Send + Sync + 'static>;

// -----------------------------------------------------------------------------
// ContractError

/// A configuration error found while building a [`TypeContract`].
///
/// These are raised before any document is read, the first time a
/// contract is requested for the type.
///
/// [`TypeContract`]: crate::TypeContract
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ContractError {
    #[error("type `{0}` has no registered contract")]
    Unregistered(&'static str),
    #[error("`{0}` has no constructor usable for decoding")]
    NoConstructor(&'static str),
    #[error("`{0}` has several constructors and none of them is designated")]
    AmbiguousConstructor(&'static str),
    #[error("`{owner}` designates {count} constructors")]
    MultipleDesignatedConstructors { owner: &'static str, count: usize },
    #[error("constructor of `{owner}` matches `{name}` with more than one parameter")]
    AmbiguousConstructorBinding { owner: &'static str, name: String },
    #[error("`{owner}` contains more than one field named `{name}`")]
    DuplicateFieldName { owner: &'static str, name: String },
    #[error("modifier `{modifier}` rejected `{owner}`: {source}")]
    Modifier {
        modifier: &'static str,
        owner: &'static str,
        #[source]
        source: BoxedError,
    },
}

impl ContractError {
    /// Wraps an error raised by a [`ContractModifier`].
    ///
    /// [`ContractModifier`]: crate::registry::ContractModifier
    pub fn modifier(
        modifier: &'static str,
        owner: &'static str,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::Modifier {
            modifier,
            owner,
            source: Box::new(source),
        }
    }

    /// Returns the modifier error if it has type `E`.
    pub fn modifier_error<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Modifier { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// FieldError

/// An error raised while writing or reading one field.
///
/// Only [`DuplicateKey`](Self::DuplicateKey) depends on the document.
/// The other variants point at a record whose declared accessors or
/// constructors do not fit its fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    #[error("`{field}` on `{owner}` was supplied more than once")]
    DuplicateKey { field: String, owner: &'static str },
    #[error("`{field}` on `{owner}` has no writable target")]
    Unwritable { field: String, owner: &'static str },
    #[error("`{field}` expected a value of type `{expected}`")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    #[error("constructor of `{owner}` requires argument `{param}`")]
    MissingArgument { param: String, owner: &'static str },
    #[error("`{0}` cannot be constructed")]
    NotConstructible(&'static str),
    #[error("{0}")]
    Custom(String),
}

impl FieldError {
    /// Returns `true` if the document, not the record declaration, caused
    /// this error.
    #[inline]
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    #[inline]
    pub(crate) fn type_mismatch<T: ?Sized>(field: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: core::any::type_name::<T>(),
        }
    }
}

// -----------------------------------------------------------------------------
// DecodeError

/// The error returned by [`ContractRegistry::decode`].
///
/// [`ContractRegistry::decode`]: crate::ContractRegistry::decode
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("malformed input: {0}")]
    Format(#[source] BoxedError),
}

impl DecodeError {
    /// Returns `true` for errors caused by the document rather than by the
    /// record declaration: malformed input and duplicate keys.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::Contract(_) => false,
            Self::Field(err) => err.is_data_error(),
            Self::Format(_) => true,
        }
    }
}

// -----------------------------------------------------------------------------
// EncodeError

/// The error returned by [`ContractRegistry::encode`].
///
/// [`ContractRegistry::encode`]: crate::ContractRegistry::encode
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EncodeError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("serializer failed: {0}")]
    Format(#[source] BoxedError),
}
