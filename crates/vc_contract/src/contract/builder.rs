use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::marker::PhantomData;

use crate::codec::{Codec, TypedCodec, ValueCodec};
use crate::contract::{DefaultConstructor, TypeContract};
use crate::descriptor::{FieldDescriptor, FieldRef, Getter, NumberHandling, getter, setter};
use crate::error::FieldError;
use crate::info::{
    BoxedValue, ConstructorArgs, ConstructorInfo, CustomAttributes, FieldType, MemberInfo,
    MemberKind, Rename, TypeSpec, Writer, writer,
};

// -----------------------------------------------------------------------------
// Record

/// A type that is decoded and encoded through a [`TypeContract`].
///
/// # Example
///
/// ```
/// use vc_contract::{ContractBuilder, ContractRegistry, Record, impl_field_type};
///
/// #[derive(Default)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// impl_field_type!(record User);
///
/// impl Record for User {
///     fn contract() -> ContractBuilder<Self> {
///         ContractBuilder::<Self>::new()
///             .with_default()
///             .property("Name", |u| &u.name, |u, v| u.name = v)
///             .property("Age", |u| &u.age, |u, v| u.age = v)
///     }
/// }
///
/// let mut registry = ContractRegistry::new();
/// registry.register::<User>();
/// let contract = registry.contract::<User>().unwrap();
/// assert_eq!(contract.descriptors().len(), 2);
/// ```
pub trait Record: FieldType + Sized {
    fn contract() -> ContractBuilder<Self>;
}

// -----------------------------------------------------------------------------
// ContractBuilder

struct PendingDescriptor {
    get: Getter,
    settable: bool,
    order: i32,
    codec: Option<Arc<dyn ValueCodec>>,
    number_handling: NumberHandling,
}

struct PendingMember {
    name: &'static str,
    kind: MemberKind,
    ty: TypeSpec,
    writer: Option<Writer>,
    attributes: CustomAttributes,
    descriptor: Option<PendingDescriptor>,
}

/// Declares the members, accessors and constructors of a record.
///
/// Methods such as [`attribute`](Self::attribute) and
/// [`order`](Self::order) apply to the most recently declared member.
/// Attributes given before any member apply to the record itself.
/// [`order`](Self::order), [`codec`](Self::codec) and
/// [`number_handling`](Self::number_handling) do nothing after a member
/// that exposes no field.
pub struct ContractBuilder<T> {
    members: Vec<PendingMember>,
    default_ctor: Option<DefaultConstructor>,
    constructors: Vec<ConstructorInfo>,
    attributes: CustomAttributes,
    marker: PhantomData<fn() -> T>,
}

impl<T: FieldType> Default for ContractBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldType> ContractBuilder<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            default_ctor: None,
            constructors: Vec::new(),
            attributes: CustomAttributes::new(),
            marker: PhantomData,
        }
    }

    // -------------------------------------------------------------------------
    // Construction

    /// Decodes by creating `T::default()` and writing fields in place.
    pub fn with_default(self) -> Self
    where
        T: Default,
    {
        self.default_with(T::default)
    }

    pub fn default_with(mut self, create: fn() -> T) -> Self {
        self.default_ctor = Some(Arc::new(move || Box::new(create()) as BoxedValue));
        self
    }

    /// Declares a parameterized constructor.
    ///
    /// It is used for decoding when it is the only constructor, or when it
    /// is [designated](Self::designated_constructor).
    pub fn constructor<F>(mut self, params: impl IntoIterator<Item = &'static str>, build: F) -> Self
    where
        F: Fn(&mut ConstructorArgs) -> Result<T, FieldError> + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorInfo::new(params, build));
        self
    }

    /// Declares the constructor decoding must use.
    pub fn designated_constructor<F>(
        mut self,
        params: impl IntoIterator<Item = &'static str>,
        build: F,
    ) -> Self
    where
        F: Fn(&mut ConstructorArgs) -> Result<T, FieldError> + Send + Sync + 'static,
    {
        self.constructors
            .push(ConstructorInfo::new(params, build).designated());
        self
    }

    // -------------------------------------------------------------------------
    // Members

    fn push(
        mut self,
        name: &'static str,
        kind: MemberKind,
        ty: TypeSpec,
        writer: Option<Writer>,
        descriptor: Option<PendingDescriptor>,
    ) -> Self {
        self.members.push(PendingMember {
            name,
            kind,
            ty,
            writer,
            attributes: CustomAttributes::new(),
            descriptor,
        });
        self
    }

    fn exposed(get: Getter, settable: bool) -> Option<PendingDescriptor> {
        Some(PendingDescriptor {
            get,
            settable,
            order: 0,
            codec: None,
            number_handling: NumberHandling::Strict,
        })
    }

    /// A plain data field, readable and writable.
    pub fn field<V, G, S>(self, name: &'static str, get: G, set: S) -> Self
    where
        V: FieldType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let descriptor = Self::exposed(borrowed_getter::<T, V, G>(get), true);
        let write = writer::<T, V, S>(name, set);
        self.push(name, MemberKind::Field, TypeSpec::of::<V>(), Some(write), descriptor)
    }

    /// A property with a public getter and setter.
    pub fn property<V, G, S>(self, name: &'static str, get: G, set: S) -> Self
    where
        V: FieldType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let descriptor = Self::exposed(borrowed_getter::<T, V, G>(get), true);
        let write = writer::<T, V, S>(name, set);
        self.push(name, MemberKind::Property, TypeSpec::of::<V>(), Some(write), descriptor)
    }

    /// A property without any setter.
    pub fn read_only<V, G>(self, name: &'static str, get: G) -> Self
    where
        V: FieldType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
    {
        let descriptor = Self::exposed(borrowed_getter::<T, V, G>(get), false);
        self.push(name, MemberKind::Property, TypeSpec::of::<V>(), None, descriptor)
    }

    /// A property whose setter is not part of the public contract.
    ///
    /// Decoding does not write it, but adapters may reach the setter
    /// through the member.
    pub fn init_only<V, G, S>(self, name: &'static str, get: G, set: S) -> Self
    where
        V: FieldType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let descriptor = Self::exposed(borrowed_getter::<T, V, G>(get), false);
        let write = writer::<T, V, S>(name, set);
        self.push(name, MemberKind::Property, TypeSpec::of::<V>(), Some(write), descriptor)
    }

    /// A read-only property computed from the instance.
    pub fn computed<V, G>(self, name: &'static str, compute: G) -> Self
    where
        V: FieldType,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let get = getter(move |instance: &dyn Any| {
            let instance = instance.downcast_ref::<T>()?;
            Some(FieldRef::Owned(Box::new(compute(instance))))
        });
        let descriptor = Self::exposed(get, false);
        self.push(name, MemberKind::Property, TypeSpec::of::<V>(), None, descriptor)
    }

    /// The hidden storage behind property `name`. Not exposed as a field.
    pub fn backing_slot<V, S>(self, name: &'static str, set: S) -> Self
    where
        V: FieldType,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let write = writer::<T, V, S>(name, set);
        self.push(name, MemberKind::BackingSlot, TypeSpec::of::<V>(), Some(write), None)
    }

    /// A data field that is not exposed as a field.
    pub fn hidden_field<V, S>(self, name: &'static str, set: S) -> Self
    where
        V: FieldType,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let write = writer::<T, V, S>(name, set);
        self.push(name, MemberKind::Field, TypeSpec::of::<V>(), Some(write), None)
    }

    // -------------------------------------------------------------------------
    // Modifiers of the last member

    /// Attaches an attribute to the last member, or to the record when no
    /// member has been declared yet.
    pub fn attribute<A: Any + Send + Sync>(mut self, attribute: A) -> Self {
        match self.members.last_mut() {
            Some(member) => member.attributes.insert(attribute),
            None => self.attributes.insert(attribute),
        }
        self
    }

    /// Exposes the last member under `name`, ignoring the naming policy.
    #[inline]
    pub fn rename(self, name: &'static str) -> Self {
        self.attribute(Rename(name))
    }

    /// Sets the position of the last member's field. Lower comes first.
    pub fn order(mut self, order: i32) -> Self {
        if let Some(descriptor) = self.last_descriptor() {
            descriptor.order = order;
        }
        self
    }

    /// Encodes the last member's field with `codec`.
    pub fn codec<C: Codec>(mut self, codec: C) -> Self {
        if let Some(descriptor) = self.last_descriptor() {
            descriptor.codec = Some(Arc::new(TypedCodec::new(codec)));
        }
        self
    }

    pub fn number_handling(mut self, handling: NumberHandling) -> Self {
        if let Some(descriptor) = self.last_descriptor() {
            descriptor.number_handling = handling;
        }
        self
    }

    // members declared with `backing_slot` or `hidden_field` expose no field
    fn last_descriptor(&mut self) -> Option<&mut PendingDescriptor> {
        self.members.last_mut()?.descriptor.as_mut()
    }

    // -------------------------------------------------------------------------
    // Build

    /// Produces the base contract, before naming and modifiers.
    pub fn build(self) -> TypeContract {
        let mut contract = TypeContract::new(T::type_spec());
        contract.default_ctor = self.default_ctor;
        contract.constructors = self.constructors.into_iter().map(Arc::new).collect();
        contract.attributes = self.attributes;

        for pending in self.members {
            let mut member = MemberInfo::new(pending.name, pending.kind, pending.ty)
                .with_custom_attributes(pending.attributes);
            if let Some(write) = pending.writer {
                member = member.with_writer(write);
            }
            let member = Arc::new(member);

            if let Some(exposed) = pending.descriptor {
                let mut descriptor = FieldDescriptor::new(member.name(), member.ty());
                descriptor.set_getter(Some(exposed.get));
                if exposed.settable {
                    let target_member = member.clone();
                    descriptor.set_setter(Some(setter(move |target, value| {
                        target.write_member(&target_member, value)
                    })));
                }
                descriptor.set_order(exposed.order);
                descriptor.set_codec(exposed.codec);
                descriptor.set_number_handling(exposed.number_handling);
                descriptor.set_member(Some(member.clone()));
                contract.descriptors.push(descriptor);
            }

            contract.members.push(member);
        }

        contract
    }
}

fn borrowed_getter<T, V, G>(get: G) -> Getter
where
    T: Any,
    V: Any,
    G: Fn(&T) -> &V + Send + Sync + 'static,
{
    getter(move |instance: &dyn Any| {
        let instance = instance.downcast_ref::<T>()?;
        Some(FieldRef::Borrowed(get(instance) as &dyn Any))
    })
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::descriptor::NumberHandling;
    use crate::info::MemberKind;
    use crate::{ContractBuilder, Record};

    #[derive(Default)]
    struct Sample {
        title: String,
        count: u32,
    }

    crate::impl_field_type!(record Sample);

    impl Record for Sample {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .backing_slot("Title", |s: &mut Sample, v: String| s.title = v)
                .order(3)
                .number_handling(NumberHandling::WriteAsString)
                .read_only("Title", |s| &s.title)
                .hidden_field("Count", |s: &mut Sample, v: u32| s.count = v)
                .order(5)
                .property("Total", |s| &s.count, |s, v| s.count = v)
                .order(-1)
        }
    }

    #[test]
    fn hints_after_hidden_members_are_ignored() {
        let contract = Sample::contract().build();
        let fields: Vec<_> = contract
            .descriptors()
            .iter()
            .map(|d| (d.name(), d.order(), d.number_handling()))
            .collect();
        assert_eq!(
            fields,
            [
                ("Title", 0, NumberHandling::Strict),
                ("Total", -1, NumberHandling::Strict)
            ]
        );
        assert_eq!(contract.members().len(), 4);
    }

    #[test]
    fn member_lookups() {
        let contract = Sample::contract().build();
        let slot = contract.member("Title", MemberKind::BackingSlot).unwrap();
        assert!(slot.is_writable());
        let property = contract.member("Title", MemberKind::Property).unwrap();
        assert!(!property.is_writable());

        assert!(contract.member("title", MemberKind::Property).is_none());
        let found = contract
            .member_ignore_case("title", MemberKind::Property)
            .unwrap();
        assert_eq!(found.name(), "Title");
        assert!(contract.member("Count", MemberKind::Property).is_none());
    }
}
