use alloc::boxed::Box;
use core::any::Any;

use serde_core::de::DeserializeSeed;

use crate::codec::ValueCodec;
use crate::error::EncodeError;
use crate::info::{BoxedValue, TypeSpec};
use crate::serde::{DecodeContext, EncodeContext, RecordEncoder, RecordSeed};

/// Reads and writes a nested record through its contract.
///
/// The contract is looked up lazily, so records may refer to each other.
pub(crate) struct RecordCodec {
    ty: TypeSpec,
}

impl RecordCodec {
    #[inline]
    pub fn new(ty: TypeSpec) -> Self {
        Self { ty }
    }
}

impl ValueCodec for RecordCodec {
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Option<BoxedValue>, erased_serde::Error> {
        let contract = match ctx.registry().contract_for(&self.ty) {
            Ok(contract) => contract,
            Err(err) => return Err(ctx.fail(err)),
        };
        RecordSeed::new(contract, ctx)
            .deserialize(deserializer)
            .map(Some)
    }

    fn encode<'a>(
        &'a self,
        ctx: &'a EncodeContext<'_>,
        value: &'a dyn Any,
    ) -> Result<Box<dyn erased_serde::Serialize + 'a>, EncodeError> {
        let contract = ctx.registry().contract_for(&self.ty)?;
        Ok(Box::new(RecordEncoder::new(contract, value, ctx)))
    }
}
