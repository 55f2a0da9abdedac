//! Per-type contracts: the descriptor table the drivers work from.

mod builder;

pub use builder::{ContractBuilder, Record};

use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::descriptor::FieldDescriptor;
use crate::error::{ContractError, FieldError};
use crate::info::{
    BoxedValue, ConstructorInfo, CustomAttributes, MemberInfo, MemberKind, Rename, TypeSpec,
    impl_custom_attributes_fn,
};
use crate::registry::{ContractRegistry, NamingPolicy};
use crate::serde::DecodeTarget;
use crate::utils::{NameMap, new_name_map};

/// Creates a default instance of a record.
pub type DefaultConstructor = Arc<dyn Fn() -> BoxedValue + Send + Sync>;

// -----------------------------------------------------------------------------
// Construction

/// How the decode driver obtains an instance.
#[derive(Clone)]
pub enum Construction {
    /// Construct first, then write fields in place.
    Default(DefaultConstructor),
    /// Stage arguments while reading, construct at the end of the record.
    Parameterized(Arc<ConstructorInfo>),
}

impl fmt::Debug for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(_) => f.write_str("Default"),
            Self::Parameterized(ctor) => f.debug_tuple("Parameterized").field(ctor).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeContract

/// The encode/decode contract of one record type.
///
/// Contracts are produced by [`Record::contract`], rewritten by the
/// registry's modifiers, then frozen and shared.
pub struct TypeContract {
    ty: TypeSpec,
    descriptors: Vec<FieldDescriptor>,
    members: Vec<Arc<MemberInfo>>,
    default_ctor: Option<DefaultConstructor>,
    constructors: Vec<Arc<ConstructorInfo>>,
    construction: Option<Construction>,
    attributes: CustomAttributes,
    index: NameMap<usize>,
}

impl TypeContract {
    pub fn new(ty: TypeSpec) -> Self {
        Self {
            ty,
            descriptors: Vec::new(),
            members: Vec::new(),
            default_ctor: None,
            constructors: Vec::new(),
            construction: None,
            attributes: CustomAttributes::new(),
            index: new_name_map(),
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeSpec {
        self.ty
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    // -------------------------------------------------------------------------
    // Descriptors

    /// Returns the descriptors in their current order.
    #[inline]
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Returns the descriptor table for rewriting.
    ///
    /// Name lookups through [`field`](Self::field) reflect changes once the
    /// contract is finalized.
    #[inline]
    pub fn descriptors_mut(&mut self) -> &mut Vec<FieldDescriptor> {
        &mut self.descriptors
    }

    /// Creates a descriptor bound to this contract's type.
    ///
    /// The descriptor is not inserted; push it into
    /// [`descriptors_mut`](Self::descriptors_mut) where it belongs.
    #[inline]
    pub fn create_descriptor(
        &self,
        name: impl Into<Cow<'static, str>>,
        ty: TypeSpec,
    ) -> FieldDescriptor {
        FieldDescriptor::new(name, ty)
    }

    /// Position of the descriptor named exactly `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name() == name)
    }

    /// Looks up a descriptor by its exact key.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        if self.index.is_empty() {
            return self.descriptors.iter().find(|d| d.name() == name);
        }
        self.index.get(name).and_then(|&i| self.descriptors.get(i))
    }

    // -------------------------------------------------------------------------
    // Members

    #[inline]
    pub fn members(&self) -> &[Arc<MemberInfo>] {
        &self.members
    }

    /// Finds a member by exact name and kind.
    pub fn member(&self, name: &str, kind: MemberKind) -> Option<&Arc<MemberInfo>> {
        self.members
            .iter()
            .find(|m| m.kind() == kind && m.name() == name)
    }

    /// Finds a member by name ignoring case, and kind.
    pub fn member_ignore_case(&self, name: &str, kind: MemberKind) -> Option<&Arc<MemberInfo>> {
        self.members
            .iter()
            .find(|m| m.kind() == kind && m.name().eq_ignore_ascii_case(name))
    }

    // -------------------------------------------------------------------------
    // Construction

    #[inline]
    pub fn default_constructor(&self) -> Option<&DefaultConstructor> {
        self.default_ctor.as_ref()
    }

    #[inline]
    pub fn constructors(&self) -> &[Arc<ConstructorInfo>] {
        &self.constructors
    }

    /// The construction plan selected by the registry.
    #[inline]
    pub fn construction(&self) -> Option<&Construction> {
        self.construction.as_ref()
    }

    /// The parameterized constructor decoding goes through, if any.
    pub fn decode_constructor(&self) -> Option<&Arc<ConstructorInfo>> {
        match &self.construction {
            Some(Construction::Parameterized(ctor)) => Some(ctor),
            _ => None,
        }
    }

    impl_custom_attributes_fn!(attributes);

    // -------------------------------------------------------------------------
    // Pipeline

    /// Names every member-backed descriptor per `policy`, unless its member
    /// carries a [`Rename`].
    pub(crate) fn apply_naming(&mut self, policy: NamingPolicy) {
        for descriptor in &mut self.descriptors {
            let Some(member) = descriptor.member() else {
                continue;
            };
            let name = match member.get_attribute::<Rename>() {
                Some(Rename(name)) => Cow::Borrowed(*name),
                None => policy.apply(member.name()),
            };
            descriptor.set_name(name);
        }
    }

    /// Picks how decoding obtains an instance.
    ///
    /// A designated constructor wins, then the default constructor, then a
    /// sole parameterized constructor.
    pub(crate) fn select_construction(&mut self) -> Result<(), ContractError> {
        let owner = self.type_path();
        let mut designated = self.constructors.iter().filter(|c| c.is_designated());

        let construction = match (designated.next(), designated.next()) {
            (Some(ctor), None) => Construction::Parameterized(ctor.clone()),
            (Some(_), Some(_)) => {
                let count = self.constructors.iter().filter(|c| c.is_designated()).count();
                return Err(ContractError::MultipleDesignatedConstructors { owner, count });
            }
            (None, _) => match (&self.default_ctor, self.constructors.as_slice()) {
                (Some(default), _) => Construction::Default(default.clone()),
                (None, [ctor]) => Construction::Parameterized(ctor.clone()),
                (None, []) => return Err(ContractError::NoConstructor(owner)),
                (None, _) => return Err(ContractError::AmbiguousConstructor(owner)),
            },
        };

        self.construction = Some(construction);
        Ok(())
    }

    /// Orders the descriptors, checks key uniqueness and resolves codecs.
    pub(crate) fn finalize(&mut self, registry: &ContractRegistry) -> Result<(), ContractError> {
        let owner = self.ty.path();

        self.descriptors.sort_by_key(FieldDescriptor::order);
        self.index = new_name_map();

        for (index, descriptor) in self.descriptors.iter_mut().enumerate() {
            if self.index.insert(descriptor.name().into(), index).is_some() {
                return Err(ContractError::DuplicateFieldName {
                    owner,
                    name: descriptor.name().to_string(),
                });
            }
            let codec = match descriptor.codec() {
                Some(codec) => codec.clone(),
                None => registry.codec_for(&descriptor.ty())?,
            };
            descriptor.set_resolved_codec(codec);
        }

        if let Some(ctor) = self.decode_constructor() {
            ctor.validate(owner)?;
        }
        Ok(())
    }

    /// Creates the decode target for one record occurrence.
    pub(crate) fn new_target(&self) -> Result<DecodeTarget, FieldError> {
        let owner = self.type_path();
        match &self.construction {
            Some(Construction::Default(create)) => Ok(DecodeTarget::ready(owner, create())),
            Some(Construction::Parameterized(ctor)) => Ok(DecodeTarget::pending(owner, ctor.clone())),
            None => Err(FieldError::NotConstructible(owner)),
        }
    }
}

impl fmt::Debug for TypeContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeContract")
            .field("ty", &self.ty.path())
            .field("descriptors", &self.descriptors)
            .field("members", &self.members)
            .field("construction", &self.construction)
            .finish()
    }
}
