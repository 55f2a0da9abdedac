use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::mem;

use vc_contract::descriptor::{FieldDescriptor, never_serialize, setter};
use vc_contract::info::Rename;
use vc_contract::registry::ContractModifier;
use vc_contract::{ContractError, ContractRegistry, TypeContract};

use crate::alias::session::DecodeSession;
use crate::alias::strategy::WriteStrategy;
use crate::alias::{AliasError, PropertyNames};

// -----------------------------------------------------------------------------
// AliasModifier

/// Expands every field carrying [`PropertyNames`] into one field per name.
///
/// All names of a field decode into the same slot through one shared
/// setter. Only the serialization name is written on encode.
///
/// # Example
///
/// ```
/// use vc_contract::{ContractBuilder, ContractRegistry, Record, impl_field_type};
/// use vc_shape::{AliasModifier, PropertyNames};
///
/// #[derive(Default)]
/// struct User {
///     user_name: String,
/// }
///
/// impl_field_type!(record User);
///
/// impl Record for User {
///     fn contract() -> ContractBuilder<Self> {
///         ContractBuilder::<Self>::new()
///             .with_default()
///             .property("UserName", |u| &u.user_name, |u, v| u.user_name = v)
///             .attribute(PropertyNames::new(["UserName", "User", "Name"]))
///     }
/// }
///
/// let mut registry = ContractRegistry::new();
/// registry.register::<User>().add_modifier(AliasModifier);
///
/// let mut de = serde_json::Deserializer::from_str(r#"{"Name":"JohnSmith"}"#);
/// let user: User = registry.decode(&mut de).unwrap();
/// assert_eq!(user.user_name, "JohnSmith");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasModifier;

impl AliasModifier {
    pub const NAME: &'static str = "alias";
}

impl ContractModifier for AliasModifier {
    #[inline]
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn modify(
        &self,
        contract: &mut TypeContract,
        _registry: &ContractRegistry,
    ) -> Result<(), ContractError> {
        if !contract
            .descriptors()
            .iter()
            .any(|d| d.has_attribute::<PropertyNames>())
        {
            return Ok(());
        }

        let existing: Vec<String> = contract
            .descriptors()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        let mut claimed: Vec<&'static str> = Vec::new();

        let descriptors = mem::take(contract.descriptors_mut());
        let mut rewritten = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let Some(names) = descriptor.get_attribute::<PropertyNames>().cloned() else {
                rewritten.push(descriptor);
                continue;
            };
            let expanded = Expansion {
                contract: &*contract,
                existing: &existing,
                claimed: &mut claimed,
            }
            .expand(descriptor, &names)?;
            rewritten.extend(expanded);
        }

        *contract.descriptors_mut() = rewritten;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Expansion

struct Expansion<'a> {
    contract: &'a TypeContract,
    existing: &'a [String],
    claimed: &'a mut Vec<&'static str>,
}

impl Expansion<'_> {
    fn expand(
        mut self,
        mut original: FieldDescriptor,
        names: &PropertyNames,
    ) -> Result<Vec<FieldDescriptor>, ContractError> {
        let owner = self.contract.type_path();
        let field = original.member_name().to_string();

        names.validate(&field).map_err(|err| err.at(owner))?;
        if original.has_attribute::<Rename>() {
            return Err(AliasError::ConfigurationConflict { field }.at(owner));
        }
        self.check_collisions(&original, names)
            .map_err(|err| err.at(owner))?;

        let strategy = WriteStrategy::classify(self.contract, &original)?;
        log::trace!("alias strategy of `{field}` on `{owner}`: {strategy:?}");

        let session = DecodeSession::new(&field, names.throws_on_duplicate());
        let shared = setter(move |target, value| {
            session.enter(target)?;
            strategy.write(target, value)
        });

        let mut expanded = Vec::with_capacity(names.names().len() + 1);
        for &name in names.names() {
            let mut alias = self.contract.create_descriptor(name, original.ty());
            alias.set_codec(original.codec().cloned());
            alias.set_order(original.order());
            alias.set_number_handling(original.number_handling());
            alias.set_member(original.member().cloned());
            alias.set_setter(Some(shared.clone()));
            if name == names.serialization_name() {
                alias.set_getter(original.getter().cloned());
                alias.set_should_serialize(original.should_serialize_fn().cloned());
            } else {
                alias.set_should_serialize(Some(never_serialize()));
            }
            expanded.push(alias);
        }

        if !names.contains_ignore_case(original.name()) && self.is_constructor_bound(&original)? {
            // its own key still feeds the constructor
            original.set_should_serialize(Some(never_serialize()));
            original.set_setter(Some(shared));
            expanded.insert(0, original);
        }

        log::debug!(
            "expanded `{field}` on `{owner}` into {} field(s)",
            expanded.len()
        );
        Ok(expanded)
    }

    fn check_collisions(
        &mut self,
        original: &FieldDescriptor,
        names: &PropertyNames,
    ) -> Result<(), AliasError> {
        for &name in names.names() {
            let taken = name != original.name() && self.existing.iter().any(|n| n == name);
            if taken || self.claimed.contains(&name) {
                return Err(AliasError::DuplicateFieldName {
                    field: original.member_name().to_string(),
                    name: name.to_string(),
                });
            }
            self.claimed.push(name);
        }
        Ok(())
    }

    fn is_constructor_bound(&self, original: &FieldDescriptor) -> Result<bool, ContractError> {
        let Some(ctor) = self.contract.decode_constructor() else {
            return Ok(false);
        };
        let found = ctor.find_param(self.contract.type_path(), original.member_name())?;
        Ok(found.is_some())
    }
}
