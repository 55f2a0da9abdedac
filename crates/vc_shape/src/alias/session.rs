use alloc::boxed::Box;

use vc_contract::FieldError;
use vc_contract::serde::{DecodeTarget, SlotId};

/// The "already written" bookkeeping of one aliased field.
///
/// The session itself is shared by every decode of the type. The flag it
/// guards lives in the [`DecodeTarget`] of each record occurrence, so
/// concurrent and nested decodes never observe each other.
pub(crate) struct DecodeSession {
    slot: SlotId,
    field: Box<str>,
    throw_on_duplicate: bool,
}

impl DecodeSession {
    pub(crate) fn new(field: &str, throw_on_duplicate: bool) -> Self {
        Self {
            slot: SlotId::next(),
            field: field.into(),
            throw_on_duplicate,
        }
    }

    /// Records a write to the field on `target`.
    ///
    /// A second write fails if the session throws on duplicates and is
    /// otherwise allowed to replace the first value.
    pub(crate) fn enter(&self, target: &mut DecodeTarget) -> Result<(), FieldError> {
        if !target.mark_slot(self.slot) {
            return Ok(());
        }
        if self.throw_on_duplicate {
            return Err(FieldError::DuplicateKey {
                field: self.field.as_ref().into(),
                owner: target.owner(),
            });
        }
        log::trace!(
            "`{}` on `{}` supplied again, keeping the last value",
            self.field,
            target.owner()
        );
        Ok(())
    }
}
