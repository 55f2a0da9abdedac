use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::fmt;

use crate::error::FieldError;
use crate::info::{BoxedValue, CustomAttributes, TypeSpec, impl_custom_attributes_fn};

/// Writes a decoded value into a member of an already-constructed instance.
pub type Writer = Arc<dyn Fn(&mut dyn Any, BoxedValue) -> Result<(), FieldError> + Send + Sync>;

/// Builds a [`Writer`] from a typed closure.
///
/// The returned writer reports [`FieldError::TypeMismatch`] when the
/// instance or the value has an unexpected type.
pub fn writer<T, V, F>(member: &'static str, write: F) -> Writer
where
    T: Any,
    V: Any,
    F: Fn(&mut T, V) + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut dyn Any, value: BoxedValue| {
        let Some(instance) = instance.downcast_mut::<T>() else {
            return Err(FieldError::TypeMismatch {
                field: member.into(),
                expected: type_name::<T>(),
            });
        };
        let value = value
            .downcast::<V>()
            .map_err(|_| FieldError::type_mismatch::<V>(member))?;
        write(instance, *value);
        Ok(())
    })
}

// -----------------------------------------------------------------------------
// MemberKind

/// How a member is declared on its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A plain data field.
    Field,
    /// An accessor pair. It may lack a public writer.
    Property,
    /// The hidden storage behind a property, named after it.
    BackingSlot,
}

// -----------------------------------------------------------------------------
// MemberInfo

/// A declared member of a record type.
///
/// Members describe what the type *has*, independently of what its
/// [`FieldDescriptor`]s expose. Adapters query members to find a write
/// path when a descriptor has none.
///
/// [`FieldDescriptor`]: crate::descriptor::FieldDescriptor
pub struct MemberInfo {
    name: &'static str,
    kind: MemberKind,
    ty: TypeSpec,
    writer: Option<Writer>,
    attributes: CustomAttributes,
}

impl MemberInfo {
    pub fn new(name: &'static str, kind: MemberKind, ty: TypeSpec) -> Self {
        Self {
            name,
            kind,
            ty,
            writer: None,
            attributes: CustomAttributes::new(),
        }
    }

    #[inline]
    pub fn with_writer(mut self, writer: Writer) -> Self {
        self.writer = Some(writer);
        self
    }

    #[inline]
    pub fn with_custom_attributes(mut self, attributes: CustomAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn ty(&self) -> TypeSpec {
        self.ty
    }

    /// Returns the privileged writer, which exists even for members that
    /// are read-only in the public contract.
    #[inline]
    pub fn writer(&self) -> Option<&Writer> {
        self.writer.as_ref()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    /// Writes `value` into `instance` through this member.
    pub fn write(
        &self,
        owner: &'static str,
        instance: &mut dyn Any,
        value: BoxedValue,
    ) -> Result<(), FieldError> {
        match &self.writer {
            Some(write) => write(instance, value),
            None => Err(FieldError::Unwritable {
                field: self.name.into(),
                owner,
            }),
        }
    }

    impl_custom_attributes_fn!(attributes);
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ty", &self.ty.path())
            .field("writable", &self.is_writable())
            .finish()
    }
}
