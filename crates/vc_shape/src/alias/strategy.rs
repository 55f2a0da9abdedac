use alloc::sync::Arc;
use core::fmt;

use vc_contract::descriptor::{FieldDescriptor, Setter};
use vc_contract::info::{BoxedValue, MemberInfo, MemberKind};
use vc_contract::serde::DecodeTarget;
use vc_contract::{ContractError, FieldError, TypeContract};

use crate::alias::AliasError;

/// How the values of an aliased field reach the record.
///
/// Chosen once per field when the contract is rewritten.
#[derive(Clone)]
pub(crate) enum WriteStrategy {
    /// Staged as an argument of the decode constructor.
    ConstructorStaged(&'static str),
    /// Through the field's own setter.
    DirectSet(Setter),
    /// Through a settable property of the same name.
    PropertyByName(Arc<MemberInfo>),
    /// Into the backing slot of the property.
    BackingFieldByName(Arc<MemberInfo>),
    /// Into a plain field of the exact same name.
    PlainField(Arc<MemberInfo>),
}

impl WriteStrategy {
    pub(crate) fn classify(
        contract: &TypeContract,
        descriptor: &FieldDescriptor,
    ) -> Result<Self, ContractError> {
        let owner = contract.type_path();
        let name = descriptor.member_name();

        if let Some(ctor) = contract.decode_constructor()
            && let Some(param) = ctor.find_param(owner, name)?
        {
            return Ok(Self::ConstructorStaged(param));
        }

        if let Some(set) = descriptor.setter() {
            return Ok(Self::DirectSet(set.clone()));
        }

        let writable = |member: &&Arc<MemberInfo>| member.is_writable();

        if let Some(member) = contract.member(name, MemberKind::Property).filter(writable) {
            return Ok(Self::PropertyByName(member.clone()));
        }
        if let Some(member) = contract.member(name, MemberKind::BackingSlot).filter(writable) {
            return Ok(Self::BackingFieldByName(member.clone()));
        }
        if let Some(member) = contract.member(name, MemberKind::Field).filter(writable) {
            return Ok(Self::PlainField(member.clone()));
        }

        Err(AliasError::UnwritableAliasedField {
            field: name.into(),
        }
        .at(owner))
    }

    pub(crate) fn write(&self, target: &mut DecodeTarget, value: BoxedValue) -> Result<(), FieldError> {
        match self {
            Self::ConstructorStaged(param) => target.stage(param, value),
            Self::DirectSet(set) => set(target, value),
            Self::PropertyByName(member)
            | Self::BackingFieldByName(member)
            | Self::PlainField(member) => target.write_member(member, value),
        }
    }
}

impl fmt::Debug for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructorStaged(param) => f.debug_tuple("ConstructorStaged").field(param).finish(),
            Self::DirectSet(_) => f.write_str("DirectSet"),
            Self::PropertyByName(m) => f.debug_tuple("PropertyByName").field(&m.name()).finish(),
            Self::BackingFieldByName(m) => {
                f.debug_tuple("BackingFieldByName").field(&m.name()).finish()
            }
            Self::PlainField(m) => f.debug_tuple("PlainField").field(&m.name()).finish(),
        }
    }
}
