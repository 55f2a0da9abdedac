use crate::TypeContract;
use crate::error::ContractError;
use crate::registry::ContractRegistry;

/// Rewrites a base contract before it is frozen.
///
/// Modifiers run in registration order, once per type, the first time the
/// contract of that type is requested. They may add, remove, reorder and
/// reconfigure descriptors, and query members and constructors.
///
/// Closures with a matching signature are modifiers too.
///
/// # Example
///
/// ```
/// use vc_contract::{ContractError, ContractRegistry, TypeContract};
///
/// let mut registry = ContractRegistry::new();
/// registry.add_modifier(|contract: &mut TypeContract, _: &ContractRegistry| {
///     contract.descriptors_mut().retain(|d| !d.name().starts_with('_'));
///     Ok::<(), ContractError>(())
/// });
/// ```
pub trait ContractModifier: Send + Sync + 'static {
    /// A short name used in errors and logs.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    fn modify(
        &self,
        contract: &mut TypeContract,
        registry: &ContractRegistry,
    ) -> Result<(), ContractError>;
}

impl<F> ContractModifier for F
where
    F: Fn(&mut TypeContract, &ContractRegistry) -> Result<(), ContractError> + Send + Sync + 'static,
{
    #[inline]
    fn modify(
        &self,
        contract: &mut TypeContract,
        registry: &ContractRegistry,
    ) -> Result<(), ContractError> {
        self(contract, registry)
    }
}
