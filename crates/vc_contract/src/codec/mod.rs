//! Value codecs: how one field value is read and written.
//!
//! [`ValueCodec`] is the type-erased interface stored in descriptors.
//! [`Codec`] is the typed interface meant to be implemented by users,
//! and [`TypedCodec`] adapts one into the other.

mod record;
mod sequence;
mod serde_codec;

pub use sequence::SequenceCodec;
pub use serde_codec::SerdeCodec;

pub(crate) use record::RecordCodec;

use alloc::boxed::Box;
use core::any::Any;

use serde_core::{Deserializer, Serialize, Serializer};

use crate::error::{EncodeError, FieldError};
use crate::info::{BoxedValue, FieldType};
use crate::serde::{DecodeContext, EncodeContext};

// -----------------------------------------------------------------------------
// ValueCodec

/// A type-erased codec for one value type.
pub trait ValueCodec: Send + Sync + 'static {
    /// Reads one value.
    ///
    /// `Ok(None)` means "no value": the field is left untouched, or the
    /// element is skipped when decoding a sequence.
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Option<BoxedValue>, erased_serde::Error>;

    /// Prepares `value` for writing.
    fn encode<'a>(
        &'a self,
        ctx: &'a EncodeContext<'_>,
        value: &'a dyn Any,
    ) -> Result<Box<dyn erased_serde::Serialize + 'a>, EncodeError>;
}

// -----------------------------------------------------------------------------
// Codec

/// A typed codec for [`Codec::Value`].
///
/// The context gives access to the registry, so a codec may delegate to
/// the codec of another type through [`DecodeContext::decode_value`] and
/// [`EncodeContext::encode_value`].
///
/// # Example
///
/// ```
/// use serde_core::{Deserialize, Deserializer, Serializer};
/// use vc_contract::codec::Codec;
/// use vc_contract::serde::{DecodeContext, EncodeContext};
///
/// /// Reads and writes a `u32` as a decimal string.
/// struct Stringly;
///
/// impl Codec for Stringly {
///     type Value = u32;
///
///     fn decode<'de, D: Deserializer<'de>>(
///         &self,
///         _ctx: &DecodeContext<'_>,
///         deserializer: D,
///     ) -> Result<Option<u32>, D::Error> {
///         let text = <String as Deserialize>::deserialize(deserializer)?;
///         text.parse().map(Some).map_err(serde_core::de::Error::custom)
///     }
///
///     fn encode<S: Serializer>(
///         &self,
///         _ctx: &EncodeContext<'_>,
///         value: &u32,
///         serializer: S,
///     ) -> Result<S::Ok, S::Error> {
///         serializer.collect_str(value)
///     }
/// }
/// ```
pub trait Codec: Send + Sync + 'static {
    type Value: FieldType;

    fn decode<'de, D: Deserializer<'de>>(
        &self,
        ctx: &DecodeContext<'_>,
        deserializer: D,
    ) -> Result<Option<Self::Value>, D::Error>;

    fn encode<S: Serializer>(
        &self,
        ctx: &EncodeContext<'_>,
        value: &Self::Value,
        serializer: S,
    ) -> Result<S::Ok, S::Error>;
}

// -----------------------------------------------------------------------------
// TypedCodec

/// Adapts a [`Codec`] into a [`ValueCodec`].
#[repr(transparent)]
pub struct TypedCodec<C>(C);

impl<C: Codec> TypedCodec<C> {
    #[inline]
    pub const fn new(codec: C) -> Self {
        Self(codec)
    }

    #[inline]
    pub fn inner(&self) -> &C {
        &self.0
    }
}

impl<C: Codec> ValueCodec for TypedCodec<C> {
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Option<BoxedValue>, erased_serde::Error> {
        let value = self.0.decode(ctx, deserializer)?;
        Ok(value.map(|value| Box::new(value) as BoxedValue))
    }

    fn encode<'a>(
        &'a self,
        ctx: &'a EncodeContext<'_>,
        value: &'a dyn Any,
    ) -> Result<Box<dyn erased_serde::Serialize + 'a>, EncodeError> {
        let value = value
            .downcast_ref::<C::Value>()
            .ok_or_else(|| FieldError::type_mismatch::<C::Value>(core::any::type_name::<C>()))?;
        Ok(Box::new(TypedEncoder {
            codec: &self.0,
            ctx,
            value,
        }))
    }
}

struct TypedEncoder<'a, C: Codec> {
    codec: &'a C,
    ctx: &'a EncodeContext<'a>,
    value: &'a C::Value,
}

impl<C: Codec> Serialize for TypedEncoder<'_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.codec.encode(self.ctx, self.value, serializer)
    }
}
