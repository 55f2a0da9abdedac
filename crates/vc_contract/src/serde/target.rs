use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::FieldError;
use crate::info::{BoxedValue, ConstructorArgs, ConstructorInfo, MemberInfo};

// -----------------------------------------------------------------------------
// SlotId

/// Identifies a piece of per-instance decode state, such as the
/// "already written" flag of an aliased field.
///
/// Ids are unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// -----------------------------------------------------------------------------
// DecodeTarget

enum TargetState {
    /// Built by the default constructor; members are written in place.
    Ready(BoxedValue),
    /// Waiting for a parameterized constructor at the end of the record.
    Pending {
        ctor: Arc<ConstructorInfo>,
        args: ConstructorArgs,
        deferred: Vec<(Arc<MemberInfo>, BoxedValue)>,
    },
}

/// The record instance being decoded.
///
/// One target exists per record occurrence in the document, so state
/// marked here never leaks across instances or threads.
pub struct DecodeTarget {
    owner: &'static str,
    state: TargetState,
    slots: Vec<SlotId>,
}

impl DecodeTarget {
    pub(crate) fn ready(owner: &'static str, instance: BoxedValue) -> Self {
        Self {
            owner,
            state: TargetState::Ready(instance),
            slots: Vec::new(),
        }
    }

    pub(crate) fn pending(owner: &'static str, ctor: Arc<ConstructorInfo>) -> Self {
        Self {
            owner,
            state: TargetState::Pending {
                ctor,
                args: ConstructorArgs::new(owner),
                deferred: Vec::new(),
            },
            slots: Vec::new(),
        }
    }

    /// The type path of the record.
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Returns `true` while the instance waits for its constructor.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, TargetState::Pending { .. })
    }

    /// Returns the instance if it has already been constructed.
    pub fn instance_mut(&mut self) -> Option<&mut dyn Any> {
        match &mut self.state {
            TargetState::Ready(instance) => Some(&mut **instance),
            TargetState::Pending { .. } => None,
        }
    }

    /// Marks `slot` on this instance.
    ///
    /// Returns `true` if it was already marked.
    pub fn mark_slot(&mut self, slot: SlotId) -> bool {
        if self.slots.contains(&slot) {
            true
        } else {
            self.slots.push(slot);
            false
        }
    }

    /// Stages a constructor argument.
    pub fn stage(&mut self, param: &'static str, value: BoxedValue) -> Result<(), FieldError> {
        match &mut self.state {
            TargetState::Pending { args, .. } => {
                args.stage(param, value);
                Ok(())
            }
            TargetState::Ready(_) => Err(FieldError::Unwritable {
                field: param.into(),
                owner: self.owner,
            }),
        }
    }

    /// Writes `value` through `member`.
    ///
    /// Before construction, a value whose member matches a constructor
    /// parameter is staged; any other value is deferred until the instance
    /// exists.
    pub fn write_member(
        &mut self,
        member: &Arc<MemberInfo>,
        value: BoxedValue,
    ) -> Result<(), FieldError> {
        match &mut self.state {
            TargetState::Ready(instance) => member.write(self.owner, &mut **instance, value),
            TargetState::Pending {
                ctor,
                args,
                deferred,
            } => {
                if let Some(param) = ctor.param_ignore_case(member.name()) {
                    args.stage(param, value);
                } else if member.is_writable() {
                    deferred.push((member.clone(), value));
                } else {
                    return Err(FieldError::Unwritable {
                        field: member.name().into(),
                        owner: self.owner,
                    });
                }
                Ok(())
            }
        }
    }

    /// Stages `value` if `name` matches a constructor parameter.
    ///
    /// Returns `false` when the value has nowhere to go.
    pub(crate) fn bind(&mut self, name: &str, value: BoxedValue) -> bool {
        if let TargetState::Pending { ctor, args, .. } = &mut self.state
            && let Some(param) = ctor.param_ignore_case(name)
        {
            args.stage(param, value);
            true
        } else {
            false
        }
    }

    /// Runs the constructor if needed, then replays deferred writes.
    pub(crate) fn finish(self) -> Result<BoxedValue, FieldError> {
        match self.state {
            TargetState::Ready(instance) => Ok(instance),
            TargetState::Pending {
                ctor,
                mut args,
                deferred,
            } => {
                let mut instance = ctor.build(&mut args)?;
                for param in args.leftover() {
                    log::warn!(
                        "constructor of `{}` ignored staged argument `{param}`",
                        self.owner
                    );
                }
                for (member, value) in deferred {
                    member.write(self.owner, &mut *instance, value)?;
                }
                Ok(instance)
            }
        }
    }
}
