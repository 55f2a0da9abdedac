//! Static registration of records through the [`inventory`] crate.

use crate::registry::ContractRegistry;

/// One statically submitted registration.
///
/// Created by [`auto_register!`](crate::auto_register).
pub struct AutoRegistration {
    register: fn(&mut ContractRegistry),
}

impl AutoRegistration {
    #[doc(hidden)]
    pub const fn new(register: fn(&mut ContractRegistry)) -> Self {
        Self { register }
    }
}

inventory::collect!(AutoRegistration);

pub(super) fn register_all(registry: &mut ContractRegistry) {
    for entry in inventory::iter::<AutoRegistration> {
        (entry.register)(registry);
    }
}

/// Submits records for [`ContractRegistry::auto_register`].
///
/// Only non-generic types can be submitted.
///
/// ```ignore
/// vc_contract::auto_register!(User, Account);
/// ```
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),+ $(,)?) => {
        $(
            const _: () = {
                fn __register(registry: &mut $crate::ContractRegistry) {
                    registry.register::<$ty>();
                }

                $crate::__macro_exports::inventory::submit! {
                    $crate::registry::AutoRegistration::new(__register)
                }
            };
        )+
    };
}
