use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::error::{ContractError, FieldError};
use crate::info::BoxedValue;

type BuildFn = Arc<dyn Fn(&mut ConstructorArgs) -> Result<BoxedValue, FieldError> + Send + Sync>;

// -----------------------------------------------------------------------------
// ConstructorInfo

/// A parameterized constructor of a record type.
///
/// Parameters are matched against field names case-insensitively.
/// The decode driver stages matching values, then calls the constructor
/// once the record ends.
pub struct ConstructorInfo {
    params: Box<[&'static str]>,
    designated: bool,
    build: BuildFn,
}

impl ConstructorInfo {
    pub fn new<T, F>(params: impl IntoIterator<Item = &'static str>, build: F) -> Self
    where
        T: Any + Send,
        F: Fn(&mut ConstructorArgs) -> Result<T, FieldError> + Send + Sync + 'static,
    {
        Self {
            params: params.into_iter().collect(),
            designated: false,
            build: Arc::new(move |args: &mut ConstructorArgs| {
                build(args).map(|value| Box::new(value) as BoxedValue)
            }),
        }
    }

    /// Marks this constructor as the one to use for decoding.
    #[inline]
    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    #[inline]
    pub fn is_designated(&self) -> bool {
        self.designated
    }

    #[inline]
    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Returns the first parameter whose name matches `name`, ignoring case.
    pub fn param_ignore_case(&self, name: &str) -> Option<&'static str> {
        self.params
            .iter()
            .copied()
            .find(|param| param.eq_ignore_ascii_case(name))
    }

    /// Like [`param_ignore_case`](Self::param_ignore_case), but reports a
    /// configuration error when more than one parameter matches.
    pub fn find_param(
        &self,
        owner: &'static str,
        name: &str,
    ) -> Result<Option<&'static str>, ContractError> {
        let mut matches = self
            .params
            .iter()
            .copied()
            .filter(|param| param.eq_ignore_ascii_case(name));
        let first = matches.next();
        if matches.next().is_some() {
            return Err(ContractError::AmbiguousConstructorBinding {
                owner,
                name: name.to_string(),
            });
        }
        Ok(first)
    }

    /// Rejects parameter lists in which two names differ only by case.
    pub(crate) fn validate(&self, owner: &'static str) -> Result<(), ContractError> {
        for param in self.params.iter() {
            self.find_param(owner, param)?;
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn build(&self, args: &mut ConstructorArgs) -> Result<BoxedValue, FieldError> {
        (self.build)(args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("params", &self.params)
            .field("designated", &self.designated)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ConstructorArgs

/// Values staged for a constructor while a record is being decoded.
pub struct ConstructorArgs {
    owner: &'static str,
    staged: Vec<(&'static str, BoxedValue)>,
}

impl ConstructorArgs {
    pub(crate) fn new(owner: &'static str) -> Self {
        Self {
            owner,
            staged: Vec::new(),
        }
    }

    /// Stages a value. A later value for the same parameter replaces it.
    pub(crate) fn stage(&mut self, param: &'static str, value: BoxedValue) {
        match self.staged.iter_mut().find(|(name, _)| *name == param) {
            Some(slot) => slot.1 = value,
            None => self.staged.push((param, value)),
        }
    }

    /// Removes and returns the value staged for `param`.
    pub fn take<V: Any>(&mut self, param: &str) -> Result<Option<V>, FieldError> {
        let Some(index) = self
            .staged
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(param))
        else {
            return Ok(None);
        };
        let (name, value) = self.staged.swap_remove(index);
        value
            .downcast::<V>()
            .map(|value| Some(*value))
            .map_err(|_| FieldError::type_mismatch::<V>(name))
    }

    /// Like [`take`](Self::take), falling back to `V::default()`.
    pub fn take_or_default<V: Any + Default>(&mut self, param: &str) -> Result<V, FieldError> {
        Ok(self.take(param)?.unwrap_or_default())
    }

    /// Like [`take`](Self::take), failing when nothing was staged.
    pub fn require<V: Any>(&mut self, param: &str) -> Result<V, FieldError> {
        self.take(param)?.ok_or_else(|| FieldError::MissingArgument {
            param: param.to_string(),
            owner: self.owner,
        })
    }

    pub(crate) fn leftover(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.staged.iter().map(|(name, _)| *name)
    }
}
