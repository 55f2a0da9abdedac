use alloc::sync::Arc;

use vc_contract::registry::ContractModifier;
use vc_contract::{ContractError, ContractRegistry, TypeContract};

use crate::single_or_array::SingleOrArray;
use crate::single_or_array::binding::UnionShapeBinding;

/// Installs the single-or-array codec on every field carrying
/// [`SingleOrArray`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleOrArrayModifier;

impl SingleOrArrayModifier {
    pub const NAME: &'static str = "single_or_array";
}

impl ContractModifier for SingleOrArrayModifier {
    #[inline]
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn modify(
        &self,
        contract: &mut TypeContract,
        registry: &ContractRegistry,
    ) -> Result<(), ContractError> {
        let owner = contract.type_path();
        for descriptor in contract.descriptors_mut() {
            let Some(attribute) = descriptor.get_attribute::<SingleOrArray>() else {
                continue;
            };
            let binding = UnionShapeBinding::resolve(owner, descriptor, attribute, registry)?;
            log::debug!(
                "`{}` on `{owner}` accepts a single value or a sequence",
                descriptor.name()
            );
            descriptor.set_codec(Some(Arc::new(binding)));
        }
        Ok(())
    }
}
