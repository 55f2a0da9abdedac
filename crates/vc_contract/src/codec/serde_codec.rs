use alloc::boxed::Box;
use core::any::Any;
use core::marker::PhantomData;

use serde_core::de::DeserializeOwned;
use serde_core::{Deserialize, Serialize};

use crate::codec::ValueCodec;
use crate::error::{EncodeError, FieldError};
use crate::info::BoxedValue;
use crate::serde::{DecodeContext, EncodeContext};

/// Encodes `T` through its own serde impls.
pub struct SerdeCodec<T>(PhantomData<fn() -> T>);

impl<T> SerdeCodec<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SerdeCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueCodec for SerdeCodec<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Option<BoxedValue>, erased_serde::Error> {
        let value = <T as Deserialize>::deserialize(deserializer)?;
        Ok(Some(Box::new(value)))
    }

    fn encode<'a>(
        &'a self,
        _ctx: &'a EncodeContext<'_>,
        value: &'a dyn Any,
    ) -> Result<Box<dyn erased_serde::Serialize + 'a>, EncodeError> {
        match value.downcast_ref::<T>() {
            Some(value) => Ok(Box::new(value)),
            None => Err(FieldError::type_mismatch::<T>("value").into()),
        }
    }
}
