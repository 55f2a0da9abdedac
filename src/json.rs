//! JSON text helpers over [`serde_json`].
//!
//! Thin wrappers around [`ContractRegistry::decode`] and
//! [`ContractRegistry::encode`] for the common case of reading and writing
//! JSON text.

use alloc::string::String;
use alloc::vec::Vec;

use vc_contract::{ContractRegistry, DecodeError, EncodeError, Record};

/// Decodes a `T` from JSON text.
///
/// Trailing characters other than whitespace are a format error.
pub fn from_str<T: Record>(registry: &ContractRegistry, json: &str) -> Result<T, DecodeError> {
    let mut de = serde_json::Deserializer::from_str(json);
    let value = registry.decode(&mut de)?;
    de.end().map_err(|err| DecodeError::Format(err.into()))?;
    Ok(value)
}

/// Decodes a `T` from JSON bytes.
pub fn from_slice<T: Record>(registry: &ContractRegistry, json: &[u8]) -> Result<T, DecodeError> {
    let mut de = serde_json::Deserializer::from_slice(json);
    let value = registry.decode(&mut de)?;
    de.end().map_err(|err| DecodeError::Format(err.into()))?;
    Ok(value)
}

/// Encodes `value` as compact JSON bytes.
pub fn to_vec<T: Record>(registry: &ContractRegistry, value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(128);
    registry.encode(value, &mut serde_json::Serializer::new(&mut out))?;
    Ok(out)
}

/// Encodes `value` as compact JSON text.
pub fn to_string<T: Record>(registry: &ContractRegistry, value: &T) -> Result<String, EncodeError> {
    let out = to_vec(registry, value)?;
    // serde_json only writes valid UTF-8
    String::from_utf8(out).map_err(|err| EncodeError::Format(err.into()))
}

/// Encodes `value` as indented JSON text.
pub fn to_string_pretty<T: Record>(
    registry: &ContractRegistry,
    value: &T,
) -> Result<String, EncodeError> {
    let mut out = Vec::with_capacity(128);
    registry.encode(value, &mut serde_json::Serializer::pretty(&mut out))?;
    String::from_utf8(out).map_err(|err| EncodeError::Format(err.into()))
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use crate::prelude::*;
    use vc_shape::{AliasError, ShapeError};

    #[derive(Debug, Default, PartialEq)]
    struct Post {
        author: String,
        tags: Vec<String>,
    }

    #[derive(Debug, PartialEq)]
    struct Member {
        login: String,
        roles: Vec<String>,
    }

    #[derive(Debug, Default)]
    struct Broken {
        title: String,
    }

    impl_field_type!(record Post, Member, Broken);

    impl Record for Post {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Author", |p| &p.author, |p, v| p.author = v)
                .attribute(PropertyNames::new(["Author", "User", "By"]).throw_on_duplicate())
                .property("Tags", |p| &p.tags, |p, v| p.tags = v)
                .attribute(SingleOrArray::new())
        }
    }

    impl Record for Member {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .read_only("Login", |m| &m.login)
                .attribute(PropertyNames::new(["Login", "UserName"]))
                .read_only("Roles", |m| &m.roles)
                .attribute(SingleOrArray::of::<String>())
                .constructor(["login", "roles"], |args| {
                    Ok(Member {
                        login: args.require::<String>("login")?,
                        roles: args.require::<Vec<String>>("roles")?,
                    })
                })
        }
    }

    impl Record for Broken {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Title", |b| &b.title, |b, v| b.title = v)
                .attribute(SingleOrArray::new())
        }
    }

    fn registry() -> ContractRegistry {
        let mut registry = ContractRegistry::new();
        registry.register::<Post>().register::<Member>().register::<Broken>();
        crate::install(&mut registry);
        registry
    }

    #[test]
    fn aliases_and_single_values_together() {
        let registry = registry();

        let post: Post = super::from_str(&registry, r#"{"By":"ann","Tags":"rust"}"#).unwrap();
        assert_eq!(post.author, "ann");
        assert_eq!(post.tags, ["rust"]);

        let post: Post =
            super::from_slice(&registry, br#"{"User":"bob","Tags":["a","b"]}"#).unwrap();
        assert_eq!(post.author, "bob");
        assert_eq!(post.tags, ["a", "b"]);

        assert_eq!(
            super::to_string(&registry, &post).unwrap(),
            r#"{"Author":"bob","Tags":["a","b"]}"#
        );
    }

    #[test]
    fn encoding_always_writes_a_sequence() {
        let registry = registry();
        let post = Post {
            author: "ann".into(),
            tags: Vec::new(),
        };
        assert_eq!(
            super::to_string(&registry, &post).unwrap(),
            r#"{"Author":"ann","Tags":[]}"#
        );

        let pretty = super::to_string_pretty(&registry, &post).unwrap();
        assert!(pretty.contains("\n  \"Author\": \"ann\""));
    }

    #[test]
    fn duplicate_aliases_fail_the_decode() {
        let registry = registry();
        let err = super::from_str::<Post>(&registry, r#"{"User":"ann","By":"bob"}"#).unwrap_err();
        assert!(err.is_data_error());
        assert!(matches!(
            err,
            DecodeError::Field(FieldError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn constructor_bound_fields() {
        let registry = registry();
        let member: Member =
            super::from_str(&registry, r#"{"UserName":"ann","Roles":"admin"}"#).unwrap();
        assert_eq!(
            member,
            Member {
                login: "ann".into(),
                roles: ["admin".to_string()].into(),
            }
        );
        assert_eq!(
            super::to_string(&registry, &member).unwrap(),
            r#"{"Login":"ann","Roles":["admin"]}"#
        );
    }

    #[test]
    fn trailing_input_is_a_format_error() {
        let registry = registry();
        let err = super::from_str::<Post>(&registry, r#"{"By":"ann"} 1"#).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)));
    }

    #[test]
    fn setup_errors_surface_on_first_use() {
        let registry = registry();
        let err = super::from_str::<Broken>(&registry, r#"{"Title":"x"}"#).unwrap_err();
        assert!(!err.is_data_error());
        match err {
            DecodeError::Contract(err) => {
                assert!(err.modifier_error::<ShapeError>().is_some());
                assert!(err.modifier_error::<AliasError>().is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
