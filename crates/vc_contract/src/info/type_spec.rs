use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use serde_core::Serialize;
use serde_core::de::DeserializeOwned;

use crate::codec::{SerdeCodec, ValueCodec};

/// A type-erased, owned value flowing through the engine.
pub type BoxedValue = Box<dyn Any + Send>;

// -----------------------------------------------------------------------------
// Shape

/// The structural category of a value type.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A value encoded by a native codec, usually its own serde impls.
    Scalar(fn() -> Arc<dyn ValueCodec>),
    /// A type with a registered [`TypeContract`](crate::TypeContract).
    Record,
    /// An ordered, homogeneous collection.
    Sequence(SequenceSpec),
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(_) => f.write_str("Scalar"),
            Self::Record => f.write_str("Record"),
            Self::Sequence(seq) => f.debug_tuple("Sequence").field(seq).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// SequenceSpec

/// Describes a sequence type: its element type and how to convert
/// between the collection and its erased elements.
#[derive(Clone, Copy)]
pub struct SequenceSpec {
    element: fn() -> TypeSpec,
    collect: fn(Vec<BoxedValue>) -> Option<BoxedValue>,
    elements: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
}

impl SequenceSpec {
    /// Returns the element type.
    #[inline]
    pub fn element(&self) -> TypeSpec {
        (self.element)()
    }

    /// Builds the collection from decoded elements.
    ///
    /// Returns `None` if an element has the wrong type.
    #[inline]
    pub fn collect(&self, items: Vec<BoxedValue>) -> Option<BoxedValue> {
        (self.collect)(items)
    }

    /// Borrows the elements of a collection value.
    ///
    /// Returns `None` if `value` is not this collection type.
    #[inline]
    pub fn elements<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.elements)(value)
    }
}

impl fmt::Debug for SequenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceSpec")
            .field("element", &self.element().path())
            .finish()
    }
}

fn collect_vec<T: Any + Send>(items: Vec<BoxedValue>) -> Option<BoxedValue> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        out.push(*item.downcast::<T>().ok()?);
    }
    Some(Box::new(out))
}

fn vec_elements<T: Any>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    let vec = value.downcast_ref::<Vec<T>>()?;
    Some(vec.iter().map(|item| item as &dyn Any).collect())
}

fn serde_codec<T>() -> Arc<dyn ValueCodec>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    Arc::new(SerdeCodec::<T>::new())
}

// -----------------------------------------------------------------------------
// TypeSpec

/// A static description of a value type.
///
/// Descriptors, members and constructor parameters carry one, so that the
/// registry can find a codec for the value without reflection.
#[derive(Clone, Copy)]
pub struct TypeSpec {
    id: TypeId,
    path: &'static str,
    shape: Shape,
}

impl TypeSpec {
    /// Returns the spec of `T`.
    #[inline]
    pub fn of<T: FieldType>() -> Self {
        T::type_spec()
    }

    /// A scalar encoded through `T`'s own serde impls.
    pub fn serde<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            path: type_name::<T>(),
            shape: Shape::Scalar(serde_codec::<T>),
        }
    }

    /// A record type, encoded through its registered contract.
    pub fn record<T: Any + Send>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: type_name::<T>(),
            shape: Shape::Record,
        }
    }

    /// A `Vec<T>`.
    pub fn sequence<T: FieldType>() -> Self {
        Self {
            id: TypeId::of::<Vec<T>>(),
            path: type_name::<Vec<T>>(),
            shape: Shape::Sequence(SequenceSpec {
                element: <T as FieldType>::type_spec,
                collect: collect_vec::<T>,
                elements: vec_elements::<T>,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns the sequence description if this is a sequence type.
    #[inline]
    pub fn as_sequence(&self) -> Option<&SequenceSpec> {
        match &self.shape {
            Shape::Sequence(seq) => Some(seq),
            _ => None,
        }
    }
}

impl PartialEq for TypeSpec {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeSpec {}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSpec")
            .field("path", &self.path)
            .field("shape", &self.shape)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FieldType

/// A type that may appear as a field value.
///
/// Implemented for primitives, [`String`], [`Vec<T>`] and [`Option<T>`].
/// Use [`impl_field_type!`](crate::impl_field_type) for user types.
pub trait FieldType: Any + Send {
    fn type_spec() -> TypeSpec;
}

macro_rules! impl_serde_field_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                #[inline]
                fn type_spec() -> TypeSpec {
                    TypeSpec::serde::<Self>()
                }
            }
        )*
    };
}

impl_serde_field_type!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
);

impl<T: FieldType> FieldType for Vec<T> {
    #[inline]
    fn type_spec() -> TypeSpec {
        TypeSpec::sequence::<T>()
    }
}

impl<T> FieldType for Option<T>
where
    T: FieldType + Serialize + DeserializeOwned,
{
    #[inline]
    fn type_spec() -> TypeSpec {
        TypeSpec::serde::<Self>()
    }
}

/// Implements [`FieldType`] for user types.
///
/// - `record`: the type has a [`Record`](crate::Record) contract.
/// - `serde`: the type is encoded through its own serde impls.
///
/// ```ignore
/// impl_field_type!(record User, Account);
/// impl_field_type!(serde Person);
/// ```
#[macro_export]
macro_rules! impl_field_type {
    (record $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::info::FieldType for $ty {
                #[inline]
                fn type_spec() -> $crate::info::TypeSpec {
                    $crate::info::TypeSpec::record::<Self>()
                }
            }
        )+
    };
    (serde $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::info::FieldType for $ty {
                #[inline]
                fn type_spec() -> $crate::info::TypeSpec {
                    $crate::info::TypeSpec::serde::<Self>()
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_spec_round_trips_elements() {
        let spec = TypeSpec::of::<Vec<String>>();
        let seq = spec.as_sequence().unwrap();
        assert!(seq.element().is::<String>());

        let items: Vec<BoxedValue> = vec![Box::new(String::from("a")), Box::new(String::from("b"))];
        let collected = seq.collect(items).unwrap();
        let collected = collected.downcast_ref::<Vec<String>>().unwrap();
        assert_eq!(collected, &["a", "b"]);

        let borrowed = seq.elements(collected).unwrap();
        assert_eq!(borrowed.len(), 2);
        assert_eq!(borrowed[1].downcast_ref::<String>().unwrap(), "b");
    }

    #[test]
    fn sequence_collect_rejects_wrong_element() {
        let spec = TypeSpec::of::<Vec<u32>>();
        let items: Vec<BoxedValue> = vec![Box::new(1_u32), Box::new("x")];
        assert!(spec.as_sequence().unwrap().collect(items).is_none());
    }

    #[test]
    fn scalar_shapes() {
        assert!(matches!(TypeSpec::of::<u8>().shape(), Shape::Scalar(_)));
        assert!(matches!(TypeSpec::of::<Option<String>>().shape(), Shape::Scalar(_)));
        assert!(TypeSpec::of::<i32>().as_sequence().is_none());
        assert_eq!(TypeSpec::of::<u8>(), TypeSpec::serde::<u8>());
    }
}
