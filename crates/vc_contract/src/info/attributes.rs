use alloc::boxed::Box;
use core::any::{Any, TypeId};

use crate::utils::TypeIdMap;

// -----------------------------------------------------------------------------
// CustomAttributes

/// Declarative attributes attached to a member or to a whole record.
///
/// Attributes are stored by their [`TypeId`], so there can only be one
/// attribute per type. Modifiers read them to decide how to rewrite a
/// contract.
///
/// # Example
///
/// ```
/// use vc_contract::info::{CustomAttributes, Rename};
///
/// let attrs = CustomAttributes::new().with_attribute(Rename("user"));
/// assert_eq!(attrs.get::<Rename>(), Some(&Rename("user")));
/// assert!(!attrs.contains::<u32>());
/// ```
#[repr(transparent)]
pub struct CustomAttributes {
    attributes: TypeIdMap<Box<dyn Any + Send + Sync>>,
}

impl Default for CustomAttributes {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CustomAttributes {
    #[inline]
    pub const fn new() -> Self {
        Self {
            attributes: TypeIdMap::new(),
        }
    }

    /// Adds an attribute, overwriting a previous one of the same type.
    #[inline]
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Adds an attribute, overwriting a previous one of the same type.
    #[inline]
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.attributes.insert(TypeId::of::<T>(), Box::new(value));
    }

    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.attributes.contains(&TypeId::of::<T>())
    }

    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.attributes
            .get(&TypeId::of::<T>())
            .and_then(|attr| attr.downcast_ref::<T>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.len() == 0
    }
}

impl core::fmt::Debug for CustomAttributes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomAttributes")
            .field("len", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Rename

/// Overrides the name a member is exposed under, bypassing the naming policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rename(pub &'static str);

// -----------------------------------------------------------------------------
// Auxiliary macro

/// Implement `get_attribute` and `has_attribute` over a `CustomAttributes` field.
macro_rules! impl_custom_attributes_fn {
    ($field:ident) => {
        #[inline]
        pub fn custom_attributes(&self) -> &$crate::info::CustomAttributes {
            &self.$field
        }

        /// Returns the attribute of type `T`, if present.
        #[inline]
        pub fn get_attribute<T: ::core::any::Any>(&self) -> Option<&T> {
            self.$field.get::<T>()
        }

        /// Returns `true` if it contains the given attribute type.
        #[inline]
        pub fn has_attribute<T: ::core::any::Any>(&self) -> bool {
            self.$field.contains::<T>()
        }
    };
}

pub(crate) use impl_custom_attributes_fn;
