use alloc::sync::Arc;
use core::fmt;

use vc_contract::codec::{Codec, TypedCodec, ValueCodec};
use vc_contract::info::{FieldType, TypeSpec};

#[derive(Clone)]
pub(crate) enum ElementChoice {
    /// The element type of the field, with its registry codec.
    Deduced,
    /// A declared element type, checked against the field.
    Declared(TypeSpec),
    /// A custom element codec.
    Custom {
        ty: TypeSpec,
        codec: Arc<dyn ValueCodec>,
    },
}

/// Lets a sequence field accept a lone value as a one-element sequence.
///
/// Attach it to a `Vec<T>` member with [`ContractBuilder::attribute`] and
/// install [`SingleOrArrayModifier`](crate::single_or_array::SingleOrArrayModifier).
///
/// # Example
///
/// ```
/// use vc_contract::{ContractBuilder, ContractRegistry, Record, impl_field_type};
/// use vc_shape::{SingleOrArray, SingleOrArrayModifier};
///
/// #[derive(Default)]
/// struct Tags {
///     tags: Vec<String>,
/// }
///
/// impl_field_type!(record Tags);
///
/// impl Record for Tags {
///     fn contract() -> ContractBuilder<Self> {
///         ContractBuilder::<Self>::new()
///             .with_default()
///             .property("Tags", |t| &t.tags, |t, v| t.tags = v)
///             .attribute(SingleOrArray::new())
///     }
/// }
///
/// let mut registry = ContractRegistry::new();
/// registry.register::<Tags>().add_modifier(SingleOrArrayModifier);
///
/// let mut de = serde_json::Deserializer::from_str(r#"{"Tags":"one"}"#);
/// let tags: Tags = registry.decode(&mut de).unwrap();
/// assert_eq!(tags.tags, ["one"]);
/// ```
///
/// [`ContractBuilder::attribute`]: vc_contract::ContractBuilder::attribute
#[derive(Clone)]
pub struct SingleOrArray {
    pub(crate) element: ElementChoice,
}

impl SingleOrArray {
    /// Uses the field's element type and the codec the registry resolves
    /// for it.
    #[inline]
    pub fn new() -> Self {
        Self {
            element: ElementChoice::Deduced,
        }
    }

    /// Like [`new`](Self::new), but the field must hold `T` elements.
    #[inline]
    pub fn of<T: FieldType>() -> Self {
        Self {
            element: ElementChoice::Declared(T::type_spec()),
        }
    }

    /// Reads and writes each element with `codec`.
    ///
    /// A sequence element for which the codec produces no value is dropped.
    pub fn with_codec<C: Codec>(codec: C) -> Self {
        Self {
            element: ElementChoice::Custom {
                ty: <C::Value as FieldType>::type_spec(),
                codec: Arc::new(TypedCodec::new(codec)),
            },
        }
    }
}

impl Default for SingleOrArray {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SingleOrArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            ElementChoice::Deduced => f.write_str("SingleOrArray"),
            ElementChoice::Declared(ty) => {
                f.debug_tuple("SingleOrArray").field(&ty.path()).finish()
            }
            ElementChoice::Custom { ty, .. } => f
                .debug_struct("SingleOrArray")
                .field("element", &ty.path())
                .field("codec", &"custom")
                .finish(),
        }
    }
}
