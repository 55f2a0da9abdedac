use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;

use serde_core::de::{DeserializeSeed, Error, IgnoredAny, MapAccess, Visitor};
use serde_core::{Deserialize, Deserializer};

use crate::TypeContract;
use crate::codec::ValueCodec;
use crate::info::BoxedValue;
use crate::registry::UnknownKeys;
use crate::serde::DecodeContext;

// -----------------------------------------------------------------------------
// Ident parser

#[derive(Debug, Clone, Eq, PartialEq)]
struct Ident(String);

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdentVisitor;

        impl<'de> Visitor<'de> for IdentVisitor {
            type Value = Ident;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a field name")
            }

            #[inline]
            fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Ident(value.to_string()))
            }

            #[inline]
            fn visit_string<E: Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(Ident(value))
            }
        }

        // map keys, not struct identifiers
        deserializer.deserialize_str(IdentVisitor)
    }
}

// -----------------------------------------------------------------------------
// ValueSeed

/// Decodes one value with a type-erased codec.
pub struct ValueSeed<'a, 'r> {
    codec: &'a dyn ValueCodec,
    ctx: &'a DecodeContext<'r>,
}

impl<'a, 'r> ValueSeed<'a, 'r> {
    #[inline]
    pub fn new(codec: &'a dyn ValueCodec, ctx: &'a DecodeContext<'r>) -> Self {
        Self { codec, ctx }
    }
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_, '_> {
    type Value = Option<BoxedValue>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        self.codec
            .decode(self.ctx, &mut erased)
            .map_err(<D::Error as Error>::custom)
    }
}

// -----------------------------------------------------------------------------
// RecordSeed

/// Decodes one record through its contract.
pub struct RecordSeed<'a, 'r> {
    contract: Arc<TypeContract>,
    ctx: &'a DecodeContext<'r>,
}

impl<'a, 'r> RecordSeed<'a, 'r> {
    #[inline]
    pub fn new(contract: Arc<TypeContract>, ctx: &'a DecodeContext<'r>) -> Self {
        Self { contract, ctx }
    }
}

impl<'de> DeserializeSeed<'de> for RecordSeed<'_, '_> {
    type Value = BoxedValue;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(RecordVisitor {
            contract: &self.contract,
            ctx: self.ctx,
        })
    }
}

struct RecordVisitor<'a, 'r> {
    contract: &'a TypeContract,
    ctx: &'a DecodeContext<'r>,
}

impl<'de> Visitor<'de> for RecordVisitor<'_, '_> {
    type Value = BoxedValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a map for `{}`", self.contract.type_path())
    }

    fn visit_map<V: MapAccess<'de>>(self, mut map: V) -> Result<Self::Value, V::Error> {
        self.ctx.enter(self.contract.type_path());
        let result = visit_record(&mut map, self.contract, self.ctx);
        self.ctx.leave();
        result
    }
}

/// Reads the keys of one record and applies them to a fresh target.
///
/// Unknown keys are skipped or rejected per the registry options. A known
/// key goes to its descriptor's setter; a descriptor without one may still
/// feed a constructor parameter, otherwise the value is dropped.
fn visit_record<'de, V: MapAccess<'de>>(
    map: &mut V,
    contract: &TypeContract,
    ctx: &DecodeContext<'_>,
) -> Result<BoxedValue, V::Error> {
    let mut target = contract
        .new_target()
        .map_err(|err| ctx.fail::<V::Error>(err))?;
    let unknown_keys = ctx.registry().options().unknown_keys;

    while let Some(Ident(key)) = map.next_key::<Ident>()? {
        let Some(descriptor) = contract.field(&key) else {
            if unknown_keys == UnknownKeys::Reject {
                return Err(ctx.custom_error(format_args!(
                    "unknown field `{key}` on `{}`",
                    contract.type_path()
                )));
            }
            log::trace!("skipping unknown field `{key}` on `{}`", contract.type_path());
            map.next_value::<IgnoredAny>()?;
            continue;
        };

        let Some(codec) = descriptor.resolved_codec() else {
            return Err(ctx.custom_error(format_args!(
                "field `{key}` on `{}` has no codec",
                contract.type_path()
            )));
        };

        let Some(value) = map.next_value_seed(ValueSeed::new(&**codec, ctx))? else {
            continue;
        };

        match descriptor.setter() {
            Some(set) => set(&mut target, value).map_err(|err| ctx.fail::<V::Error>(err))?,
            None => {
                if !target.bind(descriptor.member_name(), value) {
                    log::trace!(
                        "discarding read-only field `{key}` on `{}`",
                        contract.type_path()
                    );
                }
            }
        }
    }

    target.finish().map_err(|err| ctx.fail(err))
}
