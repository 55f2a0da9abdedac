//! The per-field entries of a [`TypeContract`](crate::TypeContract).

use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::codec::ValueCodec;
use crate::error::FieldError;
use crate::info::{BoxedValue, MemberInfo, TypeSpec};
use crate::serde::DecodeTarget;

// -----------------------------------------------------------------------------
// FieldRef

/// A field value read from an instance.
///
/// Getters usually borrow from the instance; computed fields produce
/// an owned value instead.
pub enum FieldRef<'a> {
    Borrowed(&'a dyn Any),
    Owned(BoxedValue),
}

impl FieldRef<'_> {
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        match self {
            Self::Borrowed(value) => *value,
            Self::Owned(value) => &**value,
        }
    }
}

// -----------------------------------------------------------------------------
// Accessors

/// Reads a field from an instance.
pub type Getter = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<FieldRef<'a>> + Send + Sync>;

/// Applies a decoded value to the record under construction.
pub type Setter = Arc<dyn Fn(&mut DecodeTarget, BoxedValue) -> Result<(), FieldError> + Send + Sync>;

/// Decides per instance whether a field is written on encode.
pub type ShouldSerialize = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

#[inline]
pub fn getter<F>(f: F) -> Getter
where
    F: for<'a> Fn(&'a dyn Any) -> Option<FieldRef<'a>> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
pub fn setter<F>(f: F) -> Setter
where
    F: Fn(&mut DecodeTarget, BoxedValue) -> Result<(), FieldError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
pub fn should_serialize<F>(f: F) -> ShouldSerialize
where
    F: Fn(&dyn Any) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A predicate that never emits the field.
#[inline]
pub fn never_serialize() -> ShouldSerialize {
    should_serialize(|_| false)
}

// -----------------------------------------------------------------------------
// NumberHandling

/// How numeric values of a field are read and written.
///
/// The engine carries the hint and adapters copy it; codecs that understand
/// it may read it through [`FieldDescriptor::number_handling`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NumberHandling {
    #[default]
    Strict,
    AllowReadingFromString,
    WriteAsString,
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One keyed field of a record as seen by the engine.
///
/// A descriptor without a getter is never written on encode.
/// A descriptor without a setter is still matched on decode: its value is
/// bound to a constructor parameter of the same name or discarded.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    ty: TypeSpec,
    get: Option<Getter>,
    set: Option<Setter>,
    should_serialize: Option<ShouldSerialize>,
    order: i32,
    codec: Option<Arc<dyn ValueCodec>>,
    number_handling: NumberHandling,
    member: Option<Arc<MemberInfo>>,
    resolved: Option<Arc<dyn ValueCodec>>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeSpec) -> Self {
        Self {
            name: name.into(),
            ty,
            get: None,
            set: None,
            should_serialize: None,
            order: 0,
            codec: None,
            number_handling: NumberHandling::Strict,
            member: None,
            resolved: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn set_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.name = name.into();
    }

    #[inline]
    pub fn ty(&self) -> TypeSpec {
        self.ty
    }

    #[inline]
    pub fn getter(&self) -> Option<&Getter> {
        self.get.as_ref()
    }

    #[inline]
    pub fn set_getter(&mut self, get: Option<Getter>) {
        self.get = get;
    }

    #[inline]
    pub fn setter(&self) -> Option<&Setter> {
        self.set.as_ref()
    }

    #[inline]
    pub fn set_setter(&mut self, set: Option<Setter>) {
        self.set = set;
    }

    /// Returns the predicate, `None` meaning "always".
    #[inline]
    pub fn should_serialize_fn(&self) -> Option<&ShouldSerialize> {
        self.should_serialize.as_ref()
    }

    #[inline]
    pub fn set_should_serialize(&mut self, predicate: Option<ShouldSerialize>) {
        self.should_serialize = predicate;
    }

    /// Evaluates the predicate for `instance`.
    #[inline]
    pub fn should_serialize(&self, instance: &dyn Any) -> bool {
        match &self.should_serialize {
            Some(predicate) => predicate(instance),
            None => true,
        }
    }

    #[inline]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[inline]
    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    /// Returns the codec override, if any.
    #[inline]
    pub fn codec(&self) -> Option<&Arc<dyn ValueCodec>> {
        self.codec.as_ref()
    }

    #[inline]
    pub fn set_codec(&mut self, codec: Option<Arc<dyn ValueCodec>>) {
        self.codec = codec;
        self.resolved = None;
    }

    #[inline]
    pub fn number_handling(&self) -> NumberHandling {
        self.number_handling
    }

    #[inline]
    pub fn set_number_handling(&mut self, handling: NumberHandling) {
        self.number_handling = handling;
    }

    /// Returns the member this descriptor was created from.
    #[inline]
    pub fn member(&self) -> Option<&Arc<MemberInfo>> {
        self.member.as_ref()
    }

    #[inline]
    pub fn set_member(&mut self, member: Option<Arc<MemberInfo>>) {
        self.member = member;
    }

    /// The name of the underlying member, or the key if there is none.
    #[inline]
    pub fn member_name(&self) -> &str {
        match &self.member {
            Some(member) => member.name(),
            None => &self.name,
        }
    }

    /// Returns the attribute of type `T` on the underlying member.
    #[inline]
    pub fn get_attribute<T: Any>(&self) -> Option<&T> {
        self.member.as_ref()?.get_attribute::<T>()
    }

    #[inline]
    pub fn has_attribute<T: Any>(&self) -> bool {
        self.get_attribute::<T>().is_some()
    }

    /// The codec chosen when the contract was finalized.
    #[inline]
    pub(crate) fn resolved_codec(&self) -> Option<&Arc<dyn ValueCodec>> {
        self.resolved.as_ref()
    }

    #[inline]
    pub(crate) fn set_resolved_codec(&mut self, codec: Arc<dyn ValueCodec>) {
        self.resolved = Some(codec);
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty.path())
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("should_serialize", &self.should_serialize.is_some())
            .field("order", &self.order)
            .field("codec", &self.codec.is_some())
            .field("number_handling", &self.number_handling)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::string::String;

    struct Sample {
        name: String,
    }

    #[test]
    fn getter_borrows_and_owns() {
        let borrowed = getter(|instance: &dyn Any| {
            let sample = instance.downcast_ref::<Sample>()?;
            Some(FieldRef::Borrowed(&sample.name as &dyn Any))
        });
        let owned = getter(|instance: &dyn Any| {
            let sample = instance.downcast_ref::<Sample>()?;
            Some(FieldRef::Owned(Box::new(sample.name.len())))
        });

        let sample = Sample {
            name: String::from("John"),
        };
        let name = borrowed(&sample).unwrap();
        assert_eq!(name.as_any().downcast_ref::<String>().unwrap(), "John");
        let len = owned(&sample).unwrap();
        assert_eq!(len.as_any().downcast_ref::<usize>(), Some(&4));
        assert!(borrowed(&0_u8).is_none());
    }

    #[test]
    fn should_serialize_defaults_to_always() {
        let mut descriptor = FieldDescriptor::new("Name", TypeSpec::of::<String>());
        assert!(descriptor.should_serialize(&0_u8));
        descriptor.set_should_serialize(Some(never_serialize()));
        assert!(!descriptor.should_serialize(&0_u8));
        assert_eq!(descriptor.member_name(), "Name");
        assert!(!descriptor.has_attribute::<u32>());
    }
}
