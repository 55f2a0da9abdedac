use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use serde_core::de::{SeqAccess, Visitor};
use serde_core::{Deserializer, Serialize, Serializer};

use crate::codec::ValueCodec;
use crate::error::{EncodeError, FieldError};
use crate::info::{BoxedValue, SequenceSpec};
use crate::serde::{DecodeContext, EncodeContext, ValueSeed};

/// Upper bound for preallocation from an untrusted size hint.
const MAX_PREALLOC: usize = 1024;

/// Reads and writes a sequence, delegating each element to `element`.
///
/// Elements for which the element codec produces no value are skipped.
pub struct SequenceCodec {
    spec: SequenceSpec,
    element: Arc<dyn ValueCodec>,
}

impl SequenceCodec {
    #[inline]
    pub fn new(spec: SequenceSpec, element: Arc<dyn ValueCodec>) -> Self {
        Self { spec, element }
    }

    #[inline]
    pub fn spec(&self) -> &SequenceSpec {
        &self.spec
    }

    #[inline]
    pub fn element_codec(&self) -> &Arc<dyn ValueCodec> {
        &self.element
    }
}

impl ValueCodec for SequenceCodec {
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Option<BoxedValue>, erased_serde::Error> {
        deserializer
            .deserialize_seq(SequenceVisitor { codec: self, ctx })
            .map(Some)
    }

    fn encode<'a>(
        &'a self,
        ctx: &'a EncodeContext<'_>,
        value: &'a dyn Any,
    ) -> Result<Box<dyn erased_serde::Serialize + 'a>, EncodeError> {
        let Some(items) = self.spec.elements(value) else {
            return Err(FieldError::type_mismatch::<Self>("sequence").into());
        };
        let mut encoded = Vec::with_capacity(items.len());
        for item in items {
            encoded.push(self.element.encode(ctx, item)?);
        }
        Ok(Box::new(SequenceEncoder(encoded)))
    }
}

struct SequenceVisitor<'a, 'r> {
    codec: &'a SequenceCodec,
    ctx: &'a DecodeContext<'r>,
}

impl<'de> Visitor<'de> for SequenceVisitor<'_, '_> {
    type Value = BoxedValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a sequence of `{}`", self.codec.spec.element().path())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut items = Vec::with_capacity(capacity);
        let seed = || ValueSeed::new(&*self.codec.element, self.ctx);
        while let Some(item) = seq.next_element_seed(seed())? {
            if let Some(item) = item {
                items.push(item);
            }
        }
        self.codec.spec.collect(items).ok_or_else(|| {
            self.ctx.custom_error(format_args!(
                "sequence element is not a `{}`",
                self.codec.spec.element().path()
            ))
        })
    }
}

struct SequenceEncoder<'a>(Vec<Box<dyn erased_serde::Serialize + 'a>>);

impl Serialize for SequenceEncoder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}
