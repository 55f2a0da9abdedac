use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use serde_core::de::value::{
    BorrowedBytesDeserializer, BorrowedStrDeserializer, BytesDeserializer,
    EnumAccessDeserializer, MapAccessDeserializer, SeqAccessDeserializer, StrDeserializer,
};
use serde_core::de::{
    DeserializeSeed, EnumAccess, Error, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use serde_core::Deserializer;
use vc_contract::codec::{SequenceCodec, ValueCodec};
use vc_contract::descriptor::FieldDescriptor;
use vc_contract::error::EncodeError;
use vc_contract::info::{BoxedValue, SequenceSpec};
use vc_contract::serde::{DecodeContext, EncodeContext, ValueSeed};
use vc_contract::{ContractError, ContractRegistry};

use crate::single_or_array::attribute::ElementChoice;
use crate::single_or_array::{ShapeError, SingleOrArray};

// -----------------------------------------------------------------------------
// UnionShapeBinding

/// The codec installed on a single-or-array field.
///
/// Both element and sequence codecs are resolved once, when the contract
/// is computed, and shared by every decode of the field.
pub(crate) struct UnionShapeBinding {
    sequence: SequenceSpec,
    single: Arc<dyn ValueCodec>,
    many: SequenceCodec,
}

impl UnionShapeBinding {
    pub(crate) fn resolve(
        owner: &'static str,
        descriptor: &FieldDescriptor,
        attribute: &SingleOrArray,
        registry: &ContractRegistry,
    ) -> Result<Self, ContractError> {
        let field = || descriptor.name().to_string();
        let ty = descriptor.ty();
        let Some(sequence) = ty.as_sequence().copied() else {
            return Err(ShapeError::UnsupportedFieldShape {
                field: field(),
                ty: ty.path(),
            }
            .at(owner));
        };
        let element = sequence.element();

        let single = match &attribute.element {
            ElementChoice::Deduced => registry.codec_for(&element)?,
            ElementChoice::Declared(declared) | ElementChoice::Custom { ty: declared, .. }
                if *declared != element =>
            {
                return Err(ShapeError::ElementTypeMismatch {
                    field: field(),
                    declared: declared.path(),
                    actual: element.path(),
                }
                .at(owner));
            }
            ElementChoice::Declared(_) => registry.codec_for(&element)?,
            ElementChoice::Custom { codec, .. } => codec.clone(),
        };

        Ok(Self {
            sequence,
            many: SequenceCodec::new(sequence, single.clone()),
            single,
        })
    }

    fn wrap<E: Error>(&self, ctx: &DecodeContext<'_>, item: Option<BoxedValue>) -> Result<BoxedValue, E> {
        let items: Vec<BoxedValue> = item.into_iter().collect();
        self.sequence.collect(items).ok_or_else(|| {
            ctx.custom_error(format_args!(
                "single value is not a `{}`",
                self.sequence.element().path()
            ))
        })
    }
}

impl ValueCodec for UnionShapeBinding {
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Option<BoxedValue>, erased_serde::Error> {
        deserializer
            .deserialize_any(ShapeVisitor { binding: self, ctx })
            .map(Some)
    }

    fn encode<'a>(
        &'a self,
        ctx: &'a EncodeContext<'_>,
        value: &'a dyn Any,
    ) -> Result<Box<dyn erased_serde::Serialize + 'a>, EncodeError> {
        self.many.encode(ctx, value)
    }
}

// -----------------------------------------------------------------------------
// ShapeVisitor

/// Dispatches on the shape of the next value: a sequence goes to the
/// sequence codec, anything else to the element codec.
struct ShapeVisitor<'a, 'r> {
    binding: &'a UnionShapeBinding,
    ctx: &'a DecodeContext<'r>,
}

impl ShapeVisitor<'_, '_> {
    fn single<'de, D: Deserializer<'de>>(self, deserializer: D) -> Result<BoxedValue, D::Error> {
        let item = ValueSeed::new(&*self.binding.single, self.ctx).deserialize(deserializer)?;
        self.binding.wrap(self.ctx, item)
    }
}

macro_rules! forward_scalar {
    ($($visit:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            fn $visit<E: Error>(self, v: $ty) -> Result<Self::Value, E> {
                self.single(<$ty as IntoDeserializer<'de, E>>::into_deserializer(v))
            }
        )*
    };
}

impl<'de> Visitor<'de> for ShapeVisitor<'_, '_> {
    type Value = BoxedValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let element = self.binding.sequence.element();
        write!(formatter, "a `{}` or a sequence of them", element.path())
    }

    forward_scalar! {
        visit_bool: bool,
        visit_i8: i8,
        visit_i16: i16,
        visit_i32: i32,
        visit_i64: i64,
        visit_i128: i128,
        visit_u8: u8,
        visit_u16: u16,
        visit_u32: u32,
        visit_u64: u64,
        visit_u128: u128,
        visit_f32: f32,
        visit_f64: f64,
        visit_char: char,
        visit_string: String,
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        self.single(StrDeserializer::new(v))
    }

    fn visit_borrowed_str<E: Error>(self, v: &'de str) -> Result<Self::Value, E> {
        self.single(BorrowedStrDeserializer::new(v))
    }

    fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        self.single(BytesDeserializer::new(v))
    }

    fn visit_borrowed_bytes<E: Error>(self, v: &'de [u8]) -> Result<Self::Value, E> {
        self.single(BorrowedBytesDeserializer::new(v))
    }

    fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        self.single(BytesDeserializer::new(&v))
    }

    // null and omitted values both become an empty sequence
    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        self.binding.wrap(self.ctx, None)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        self.binding.wrap(self.ctx, None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        self.single(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        let seed = ValueSeed::new(&self.binding.many, self.ctx);
        match seed.deserialize(SeqAccessDeserializer::new(seq))? {
            Some(value) => Ok(value),
            None => self.binding.wrap(self.ctx, None),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        self.single(MapAccessDeserializer::new(map))
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Self::Value, A::Error> {
        self.single(EnumAccessDeserializer::new(data))
    }
}
