use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use serde_core::ser::{Error, SerializeMap};
use serde_core::{Serialize, Serializer};

use crate::TypeContract;
use crate::descriptor::{FieldDescriptor, FieldRef};
use crate::serde::EncodeContext;

/// Encodes one record through its contract.
///
/// A descriptor is written when it has a getter, its predicate accepts the
/// instance and the getter produces a value. Fields appear in contract
/// order, which is sorted by [`FieldDescriptor::order`].
pub struct RecordEncoder<'a> {
    contract: Arc<TypeContract>,
    value: &'a dyn Any,
    ctx: &'a EncodeContext<'a>,
}

impl<'a> RecordEncoder<'a> {
    #[inline]
    pub fn new(contract: Arc<TypeContract>, value: &'a dyn Any, ctx: &'a EncodeContext<'a>) -> Self {
        Self {
            contract,
            value,
            ctx,
        }
    }
}

impl Serialize for RecordEncoder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.value.type_id() != self.contract.ty().id() {
            return Err(S::Error::custom(format_args!(
                "value is not a `{}`",
                self.contract.type_path()
            )));
        }

        let fields = self
            .contract
            .descriptors()
            .iter()
            .filter_map(|descriptor| self.read(descriptor))
            .collect::<Vec<_>>();

        let mut state = serializer.serialize_map(Some(fields.len()))?;

        for (descriptor, field) in &fields {
            let Some(codec) = descriptor.resolved_codec() else {
                return Err(S::Error::custom(format_args!(
                    "field `{}` on `{}` has no codec",
                    descriptor.name(),
                    self.contract.type_path()
                )));
            };
            let encoded = match codec.encode(self.ctx, field.as_any()) {
                Ok(encoded) => encoded,
                Err(err) => return Err(self.ctx.fail(err)),
            };
            state.serialize_entry(descriptor.name(), &encoded)?;
        }

        state.end()
    }
}

impl<'a> RecordEncoder<'a> {
    fn read<'d>(&self, descriptor: &'d FieldDescriptor) -> Option<(&'d FieldDescriptor, FieldRef<'a>)> {
        let get = descriptor.getter()?;
        if !descriptor.should_serialize(self.value) {
            return None;
        }
        Some((descriptor, get(self.value)?))
    }
}
