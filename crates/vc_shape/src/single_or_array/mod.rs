//! Sequence fields that also accept a single value.
//!
//! A `Vec<T>` member tagged with [`SingleOrArray`] decodes a sequence as
//! usual and any other value as a one-element sequence. `null` decodes to
//! an empty sequence. Encoding always writes a sequence.

mod attribute;
mod binding;
mod error;
mod modifier;

pub use attribute::SingleOrArray;
pub use error::ShapeError;
pub use modifier::SingleOrArrayModifier;

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::fmt;

    use serde_core::de::{self, Visitor};
    use serde_core::{Deserializer, Serializer};
    use vc_contract::codec::Codec;
    use vc_contract::serde::{DecodeContext, EncodeContext};
    use vc_contract::{ContractBuilder, ContractRegistry, DecodeError, Record};

    use super::*;
    use crate::alias::{AliasModifier, PropertyNames};

    #[derive(Debug, Default)]
    struct ClassProperty {
        array: Vec<String>,
    }

    #[derive(Debug)]
    struct ClassConstructor {
        array: Vec<String>,
    }

    #[derive(Debug, PartialEq)]
    struct Person {
        first_name: String,
        last_name: String,
    }

    #[derive(Debug, Default)]
    struct People {
        names: Vec<String>,
        ids: Vec<u32>,
    }

    #[derive(Debug, Default)]
    struct Group {
        members: Vec<Person>,
    }

    vc_contract::impl_field_type!(record ClassProperty, ClassConstructor, Person, People, Group);

    impl Record for ClassProperty {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Array", |c| &c.array, |c, v| c.array = v)
                .attribute(SingleOrArray::new())
        }
    }

    impl Record for ClassConstructor {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .read_only("Array", |c| &c.array)
                .attribute(SingleOrArray::of::<String>())
                .designated_constructor(["array"], |args| {
                    Ok(ClassConstructor {
                        array: args.take_or_default("array")?,
                    })
                })
        }
    }

    impl Record for Person {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .read_only("FirstName", |p| &p.first_name)
                .read_only("LastName", |p| &p.last_name)
                .constructor(["firstName", "lastName"], |args| {
                    Ok(Person {
                        first_name: args.require("firstName")?,
                        last_name: args.require("lastName")?,
                    })
                })
        }
    }

    /// Reads a person and keeps "First Last".
    struct PersonCodec;

    impl Codec for PersonCodec {
        type Value = String;

        fn decode<'de, D: Deserializer<'de>>(
            &self,
            ctx: &DecodeContext<'_>,
            deserializer: D,
        ) -> Result<Option<String>, D::Error> {
            let person = ctx.decode_value::<Person, D>(deserializer)?;
            Ok(person.map(|p| format!("{} {}", p.first_name, p.last_name)))
        }

        fn encode<S: Serializer>(
            &self,
            ctx: &EncodeContext<'_>,
            value: &String,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let Some((first_name, last_name)) = value.split_once(' ') else {
                return Err(serde_core::ser::Error::custom("expected \"First Last\""));
            };
            let person = Person {
                first_name: first_name.into(),
                last_name: last_name.into(),
            };
            ctx.encode_value(&person, serializer)
        }
    }

    /// Trims strings and drops nulls.
    struct Trimmed;

    impl Codec for Trimmed {
        type Value = String;

        fn decode<'de, D: Deserializer<'de>>(
            &self,
            _ctx: &DecodeContext<'_>,
            deserializer: D,
        ) -> Result<Option<String>, D::Error> {
            struct TrimmedVisitor;

            impl Visitor<'_> for TrimmedVisitor {
                type Value = Option<String>;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a string or null")
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                    Ok(Some(v.trim().into()))
                }

                fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                    Ok(None)
                }
            }

            deserializer.deserialize_any(TrimmedVisitor)
        }

        fn encode<S: Serializer>(
            &self,
            _ctx: &EncodeContext<'_>,
            value: &String,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(value)
        }
    }

    impl Record for People {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Names", |p| &p.names, |p, v| p.names = v)
                .attribute(SingleOrArray::with_codec(PersonCodec))
                .property("Ids", |p| &p.ids, |p, v| p.ids = v)
                .attribute(SingleOrArray::new())
        }
    }

    impl Record for Group {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Members", |g| &g.members, |g, v| g.members = v)
                .attribute(SingleOrArray::new())
        }
    }

    fn registry() -> ContractRegistry {
        let mut registry = ContractRegistry::new();
        registry
            .register::<ClassProperty>()
            .register::<ClassConstructor>()
            .register::<Person>()
            .register::<People>()
            .register::<Group>()
            .add_modifier(SingleOrArrayModifier);
        registry
    }

    fn decode<T: Record>(registry: &ContractRegistry, json: &str) -> Result<T, DecodeError> {
        let mut de = serde_json::Deserializer::from_str(json);
        registry.decode(&mut de)
    }

    fn encode<T: Record>(registry: &ContractRegistry, value: &T) -> String {
        let mut out = Vec::new();
        registry
            .encode(value, &mut serde_json::Serializer::new(&mut out))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn single_value_is_wrapped() {
        let registry = registry();

        let property: ClassProperty = decode(&registry, r#"{"Array": "single"}"#).unwrap();
        assert_eq!(property.array, ["single"]);
        assert_eq!(encode(&registry, &property), r#"{"Array":["single"]}"#);

        let ctor: ClassConstructor = decode(&registry, r#"{"Array": "single"}"#).unwrap();
        assert_eq!(ctor.array, ["single"]);
        assert_eq!(encode(&registry, &ctor), r#"{"Array":["single"]}"#);
    }

    #[test]
    fn arrays_pass_through() {
        let registry = registry();
        let json = r#"{"Array": ["first", "second"]}"#;

        let property: ClassProperty = decode(&registry, json).unwrap();
        assert_eq!(property.array, ["first", "second"]);
        assert_eq!(encode(&registry, &property), r#"{"Array":["first","second"]}"#);

        let ctor: ClassConstructor = decode(&registry, json).unwrap();
        assert_eq!(encode(&registry, &ctor), r#"{"Array":["first","second"]}"#);
    }

    #[test]
    fn null_and_empty_become_empty_sequences() {
        let registry = registry();
        for json in [r#"{"Array": null}"#, r#"{"Array": []}"#, "{}"] {
            let property: ClassProperty = decode(&registry, json).unwrap();
            assert!(property.array.is_empty());
            assert_eq!(encode(&registry, &property), r#"{"Array":[]}"#);
        }
    }

    #[test]
    fn numbers_and_records() {
        let registry = registry();
        let people: People = decode(&registry, r#"{"Ids": 7}"#).unwrap();
        assert_eq!(people.ids, [7]);

        let json = r#"{"Members": {"FirstName": "John", "LastName": "Smith"}}"#;
        let group: Group = decode(&registry, json).unwrap();
        assert_eq!(group.members.len(), 1);
        assert_eq!(group.members[0].last_name, "Smith");
        assert_eq!(
            encode(&registry, &group),
            r#"{"Members":[{"FirstName":"John","LastName":"Smith"}]}"#
        );
    }

    #[test]
    fn custom_element_codec() {
        let registry = registry();

        let json = r#"{"Names": {"FirstName": "John", "LastName": "Smith"}}"#;
        let people: People = decode(&registry, json).unwrap();
        assert_eq!(people.names, ["John Smith"]);
        assert_eq!(
            encode(&registry, &people),
            r#"{"Names":[{"FirstName":"John","LastName":"Smith"}],"Ids":[]}"#
        );

        let json = r#"{"Names": [
            {"FirstName": "John", "LastName": "Smith"},
            {"FirstName": "John", "LastName": "Doe"}
        ]}"#;
        let people: People = decode(&registry, json).unwrap();
        assert_eq!(people.names, ["John Smith", "John Doe"]);
        assert_eq!(
            encode(&registry, &people),
            r#"{"Names":[{"FirstName":"John","LastName":"Smith"},{"FirstName":"John","LastName":"Doe"}],"Ids":[]}"#
        );
    }

    #[test]
    fn null_elements_are_dropped() {
        #[derive(Default)]
        struct Notes {
            notes: Vec<String>,
        }

        vc_contract::impl_field_type!(record Notes);

        impl Record for Notes {
            fn contract() -> ContractBuilder<Self> {
                ContractBuilder::<Self>::new()
                    .with_default()
                    .property("Notes", |n| &n.notes, |n, v| n.notes = v)
                    .attribute(SingleOrArray::with_codec(Trimmed))
            }
        }

        let mut registry = registry();
        registry.register::<Notes>();

        let notes: Notes = decode(&registry, r#"{"Notes": ["a", null, " b "]}"#).unwrap();
        assert_eq!(notes.notes, ["a", "b"]);

        let notes: Notes = decode(&registry, r#"{"Notes": "  c "}"#).unwrap();
        assert_eq!(notes.notes, ["c"]);
    }

    #[test]
    fn malformed_sequence_is_a_format_error() {
        let registry = registry();
        let err = decode::<ClassProperty>(&registry, r#"{"Array": ["first", 2]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)));

        let err = decode::<ClassProperty>(&registry, r#"{"Array": ["first""#).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)));
    }

    #[test]
    fn works_with_aliases() {
        let mut registry = ContractRegistry::new();
        registry
            .register::<ClassProperty>()
            .add_modifier(AliasModifier)
            .add_modifier(SingleOrArrayModifier);

        #[derive(Default)]
        struct Aliased {
            items: Vec<u8>,
        }

        vc_contract::impl_field_type!(record Aliased);

        impl Record for Aliased {
            fn contract() -> ContractBuilder<Self> {
                ContractBuilder::<Self>::new()
                    .with_default()
                    .property("Items", |a| &a.items, |a, v| a.items = v)
                    .attribute(PropertyNames::new(["Items", "Item"]))
                    .attribute(SingleOrArray::new())
            }
        }

        registry.register::<Aliased>();
        let aliased: Aliased = decode(&registry, r#"{"Item": 3}"#).unwrap();
        assert_eq!(aliased.items, [3]);
        assert_eq!(encode(&registry, &aliased), r#"{"Items":[3]}"#);
    }

    // -------------------------------------------------------------------------
    // Configuration errors

    #[derive(Default)]
    struct Scalar {
        name: String,
    }

    #[derive(Default)]
    struct Mismatch {
        names: Vec<String>,
    }

    vc_contract::impl_field_type!(record Scalar, Mismatch);

    impl Record for Scalar {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Name", |s| &s.name, |s, v| s.name = v)
                .attribute(SingleOrArray::new())
        }
    }

    impl Record for Mismatch {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Names", |m| &m.names, |m, v| m.names = v)
                .attribute(SingleOrArray::of::<u32>())
        }
    }

    #[test]
    fn unsupported_shapes_fail_at_setup() {
        let mut registry = registry();
        registry.register::<Scalar>().register::<Mismatch>();

        let err = registry.contract::<Scalar>().unwrap_err();
        assert!(matches!(
            err.modifier_error::<ShapeError>(),
            Some(ShapeError::UnsupportedFieldShape { .. })
        ));

        let err = registry.contract::<Mismatch>().unwrap_err();
        assert!(matches!(
            err.modifier_error::<ShapeError>(),
            Some(ShapeError::ElementTypeMismatch { declared: "u32", .. })
        ));
    }

    #[derive(Debug, Clone, Copy, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Default)]
    struct Path {
        points: Vec<Point>,
    }

    vc_contract::impl_field_type!(serde Point);
    vc_contract::impl_field_type!(record Path);

    impl Record for Path {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Points", |p| &p.points, |p, v| p.points = v)
                .attribute(SingleOrArray::of::<Point>())
        }
    }

    #[test]
    fn serde_typed_elements() {
        let mut registry = registry();
        registry.register::<Path>();

        let path: Path = decode(&registry, r#"{"Points": {"x": 1, "y": 2}}"#).unwrap();
        assert_eq!(path.points, [Point { x: 1, y: 2 }]);
        assert_eq!(encode(&registry, &path), r#"{"Points":[{"x":1,"y":2}]}"#);

        let path: Path =
            decode(&registry, r#"{"Points": [{"x": 1, "y": 2}, {"x": -3, "y": 0}]}"#).unwrap();
        assert_eq!(path.points.len(), 2);
        assert_eq!(path.points[1], Point { x: -3, y: 0 });
    }
}
