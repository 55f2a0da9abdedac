use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::alias::AliasError;

/// The keys an aliased field is read from, and the one it is written as.
///
/// Attach it to a member with [`ContractBuilder::attribute`] and install
/// [`AliasModifier`](crate::alias::AliasModifier) on the registry.
///
/// Names are used verbatim: the registry's naming policy never applies
/// to them.
///
/// # Example
///
/// ```
/// use vc_shape::PropertyNames;
///
/// let names = PropertyNames::new(["UserName", "User", "Name"]);
/// assert_eq!(names.serialization_name(), "UserName");
///
/// let names = PropertyNames::with_serialization_name("Identifier", ["User", "Name"]);
/// assert_eq!(names.names(), ["User", "Name", "Identifier"]);
/// ```
///
/// [`ContractBuilder::attribute`]: vc_contract::ContractBuilder::attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    serialization_name: &'static str,
    names: Box<[&'static str]>,
    throw_on_duplicate: bool,
}

impl PropertyNames {
    /// Accepts every name in `names`; the first one is written on encode.
    pub fn new(names: impl IntoIterator<Item = &'static str>) -> Self {
        let names = dedup(names);
        Self {
            serialization_name: names.first().copied().unwrap_or_default(),
            names: names.into_boxed_slice(),
            throw_on_duplicate: false,
        }
    }

    /// Accepts every name in `names` and `serialization_name`, and writes
    /// `serialization_name` on encode.
    pub fn with_serialization_name(
        serialization_name: &'static str,
        names: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        let mut names = dedup(names);
        if !names.is_empty() && !names.contains(&serialization_name) {
            names.push(serialization_name);
        }
        Self {
            serialization_name,
            names: names.into_boxed_slice(),
            throw_on_duplicate: false,
        }
    }

    /// Fails the decode when a document supplies the field under more than
    /// one of its names. By default the last value wins.
    #[inline]
    pub fn throw_on_duplicate(mut self) -> Self {
        self.throw_on_duplicate = true;
        self
    }

    #[inline]
    pub fn serialization_name(&self) -> &'static str {
        self.serialization_name
    }

    #[inline]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    #[inline]
    pub fn throws_on_duplicate(&self) -> bool {
        self.throw_on_duplicate
    }

    /// Returns `true` if `name` is one of the names, ignoring ASCII case.
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), AliasError> {
        if self.names.is_empty() {
            return Err(AliasError::EmptyAliasSet {
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

fn dedup(names: impl IntoIterator<Item = &'static str>) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_is_canonical() {
        let names = PropertyNames::new(["UserName", "User", "Name", "User"]);
        assert_eq!(names.serialization_name(), "UserName");
        assert_eq!(names.names(), ["UserName", "User", "Name"]);
        assert!(!names.throws_on_duplicate());
        assert!(names.contains_ignore_case("username"));
        assert!(names.validate("UserName").is_ok());
    }

    #[test]
    fn serialization_name_is_appended_once() {
        let names = PropertyNames::with_serialization_name("Name", ["UserName", "Name"]);
        assert_eq!(names.names(), ["UserName", "Name"]);

        let names =
            PropertyNames::with_serialization_name("Identifier", ["UserName"]).throw_on_duplicate();
        assert_eq!(names.names(), ["UserName", "Identifier"]);
        assert!(names.throws_on_duplicate());
    }

    #[test]
    fn empty_alias_set_is_rejected() {
        let err = PropertyNames::new([]).validate("UserName").unwrap_err();
        assert!(matches!(err, AliasError::EmptyAliasSet { .. }));

        let names = PropertyNames::with_serialization_name("Identifier", []);
        assert!(names.validate("UserName").is_err());
    }
}
