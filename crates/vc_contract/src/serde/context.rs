use core::cell::RefCell;
use core::fmt::Display;

use serde_core::de::DeserializeSeed;
use serde_core::{Deserializer, Serializer};

use crate::error::{DecodeError, EncodeError};
use crate::info::FieldType;
use crate::registry::ContractRegistry;
use crate::serde::ValueSeed;

#[cfg(all(debug_assertions, feature = "debug"))]
use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// DecodeContext

/// State shared by every codec during one top-level decode call.
///
/// The context records the first engine error it sees. The format error
/// that travels through the deserializer only carries its message; the
/// registry then reports the recorded error instead.
pub struct DecodeContext<'r> {
    registry: &'r ContractRegistry,
    failure: RefCell<Option<DecodeError>>,
    #[cfg(all(debug_assertions, feature = "debug"))]
    stack: RefCell<Vec<&'static str>>,
}

impl<'r> DecodeContext<'r> {
    pub(crate) fn new(registry: &'r ContractRegistry) -> Self {
        Self {
            registry,
            failure: RefCell::new(None),
            #[cfg(all(debug_assertions, feature = "debug"))]
            stack: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'r ContractRegistry {
        self.registry
    }

    /// Decodes a `T` with the codec the registry resolves for it.
    pub fn decode_value<'de, T, D>(&self, deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FieldType,
        D: Deserializer<'de>,
    {
        let codec = match self.registry.codec_for(&T::type_spec()) {
            Ok(codec) => codec,
            Err(err) => return Err(self.fail(err)),
        };
        let Some(value) = ValueSeed::new(&*codec, self).deserialize(deserializer)? else {
            return Ok(None);
        };
        match value.downcast::<T>() {
            Ok(value) => Ok(Some(*value)),
            Err(_) => Err(self.custom_error(format_args!(
                "codec did not produce a `{}`",
                core::any::type_name::<T>()
            ))),
        }
    }

    /// Records `err` and returns a format error carrying its message.
    pub fn fail<E: serde_core::de::Error>(&self, err: impl Into<DecodeError>) -> E {
        let err = err.into();
        let result = self.custom_error(&err);
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
        result
    }

    /// Creates a format error.
    ///
    /// With the `debug` feature in debug builds the message ends with the
    /// stack of records being decoded.
    pub fn custom_error<E: serde_core::de::Error>(&self, msg: impl Display) -> E {
        #[cfg(all(debug_assertions, feature = "debug"))]
        {
            let stack = self.stack.borrow();
            if !stack.is_empty() {
                return E::custom(format_args!("{msg} (stack: {})", stack.join(" -> ")));
            }
        }
        E::custom(msg)
    }

    #[inline]
    pub(crate) fn enter(&self, _record: &'static str) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.stack.borrow_mut().push(_record);
    }

    #[inline]
    pub(crate) fn leave(&self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.stack.borrow_mut().pop();
    }

    pub(crate) fn take_failure(&self) -> Option<DecodeError> {
        self.failure.borrow_mut().take()
    }
}

// -----------------------------------------------------------------------------
// EncodeContext

/// State shared by every codec during one top-level encode call.
pub struct EncodeContext<'r> {
    registry: &'r ContractRegistry,
    failure: RefCell<Option<EncodeError>>,
}

impl<'r> EncodeContext<'r> {
    pub(crate) fn new(registry: &'r ContractRegistry) -> Self {
        Self {
            registry,
            failure: RefCell::new(None),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'r ContractRegistry {
        self.registry
    }

    /// Encodes `value` with the codec the registry resolves for `T`.
    pub fn encode_value<T, S>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: FieldType,
        S: Serializer,
    {
        let codec = match self.registry.codec_for(&T::type_spec()) {
            Ok(codec) => codec,
            Err(err) => return Err(self.fail(err)),
        };
        let encoded = match codec.encode(self, value) {
            Ok(encoded) => encoded,
            Err(err) => return Err(self.fail(err)),
        };
        erased_serde::serialize(&*encoded, serializer)
    }

    /// Records `err` and returns a serializer error carrying its message.
    pub fn fail<E: serde_core::ser::Error>(&self, err: impl Into<EncodeError>) -> E {
        let err = err.into();
        let result = E::custom(&err);
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
        result
    }

    pub(crate) fn take_failure(&self) -> Option<EncodeError> {
        self.failure.borrow_mut().take()
    }
}
