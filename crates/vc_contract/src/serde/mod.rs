//! Contract-driven decode and encode drivers.
//!
//! Decoding reads a map key by key, looks up the descriptor for each key
//! and hands the value to its setter. Encoding walks the descriptors in
//! order and writes the ones that have a getter.
//!
//! Both drivers work on any serde format: they only use map, sequence
//! and scalar primitives.

mod context;
mod de;
mod ser;
mod target;

pub use context::{DecodeContext, EncodeContext};
pub use de::{RecordSeed, ValueSeed};
pub use ser::RecordEncoder;
pub use target::{DecodeTarget, SlotId};

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use serde_core::de::Error as _;
    use serde_core::{Deserialize, Deserializer, Serializer};

    use crate::codec::Codec;
    use crate::registry::{ContractOptions, UnknownKeys};
    use crate::serde::{DecodeContext, EncodeContext};
    use crate::{ContractBuilder, ContractRegistry, DecodeError, FieldError, Record};

    #[derive(Debug, Default, PartialEq)]
    struct Address {
        city: String,
        zip: Option<u32>,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Customer {
        name: String,
        tags: Vec<String>,
        home: Address,
        others: Vec<Address>,
        score: u64,
    }

    #[derive(Debug, PartialEq)]
    struct Account {
        user_name: String,
        age: u32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        count: u32,
        label: String,
    }

    crate::impl_field_type!(record Address, Customer, Account, Counter);

    impl Record for Address {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("City", |a| &a.city, |a, v| a.city = v)
                .property("Zip", |a| &a.zip, |a, v| a.zip = v)
        }
    }

    impl Record for Customer {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Name", |c| &c.name, |c, v| c.name = v)
                .property("Tags", |c| &c.tags, |c, v| c.tags = v)
                .property("Home", |c| &c.home, |c, v| c.home = v)
                .property("Others", |c| &c.others, |c, v| c.others = v)
                .read_only("Score", |c| &c.score)
        }
    }

    impl Record for Account {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .property("UserName", |a| &a.user_name, |a, v| a.user_name = v)
                .property("Age", |a| &a.age, |a, v| a.age = v)
                .constructor(["userName"], |args| {
                    Ok(Account {
                        user_name: args.require::<String>("userName")?.to_lowercase(),
                        age: 0,
                    })
                })
        }
    }

    /// Reads and writes a `u32` as a decimal string.
    struct Stringly;

    impl Codec for Stringly {
        type Value = u32;

        fn decode<'de, D: Deserializer<'de>>(
            &self,
            _ctx: &DecodeContext<'_>,
            deserializer: D,
        ) -> Result<Option<u32>, D::Error> {
            let text = <String as Deserialize>::deserialize(deserializer)?;
            text.parse().map(Some).map_err(D::Error::custom)
        }

        fn encode<S: Serializer>(
            &self,
            _ctx: &EncodeContext<'_>,
            value: &u32,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_str(value)
        }
    }

    impl Record for Counter {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Label", |c| &c.label, |c, v| c.label = v)
                .property("Count", |c| &c.count, |c, v| c.count = v)
                .codec(Stringly)
                .order(-1)
        }
    }

    fn registry() -> ContractRegistry {
        registry_with(ContractOptions::new())
    }

    fn registry_with(options: ContractOptions) -> ContractRegistry {
        let mut registry = ContractRegistry::with_options(options);
        registry
            .register::<Address>()
            .register::<Customer>()
            .register::<Account>()
            .register::<Counter>();
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
    fn decode_nested_records() {
        let registry = registry();
        let json = r#"{
            "Name": "Ann",
            "Tags": ["a", "b"],
            "Home": { "City": "Oslo", "Zip": 150 },
            "Others": [{ "City": "Rome" }, { "City": "Kyiv", "Zip": null }],
            "Score": 99
        }"#;

        let customer: Customer = decode(&registry, json).unwrap();
        assert_eq!(customer.name, "Ann");
        assert_eq!(customer.tags, ["a", "b"]);
        assert_eq!(
            customer.home,
            Address {
                city: "Oslo".into(),
                zip: Some(150)
            }
        );
        assert_eq!(customer.others.len(), 2);
        assert_eq!(customer.others[1].city, "Kyiv");
        // read-only without a matching constructor parameter
        assert_eq!(customer.score, 0);
    }

    #[test]
    fn encode_in_contract_order() {
        let registry = registry();
        let customer = Customer {
            name: "Ann".into(),
            tags: vec!["a".into()],
            home: Address {
                city: "Oslo".into(),
                zip: None,
            },
            others: Vec::new(),
            score: 7,
        };
        assert_eq!(
            encode(&registry, &customer),
            r#"{"Name":"Ann","Tags":["a"],"Home":{"City":"Oslo","Zip":null},"Others":[],"Score":7}"#
        );
    }

    #[test]
    fn unknown_keys_ignored_by_default() {
        let registry = registry();
        let address: Address =
            decode(&registry, r#"{"City":"Oslo","Street":{"No":[1,2]}}"#).unwrap();
        assert_eq!(address.city, "Oslo");
    }

    #[test]
    fn unknown_keys_rejected_on_request() {
        let registry = registry_with(ContractOptions::new().with_unknown_keys(UnknownKeys::Reject));
        let err = decode::<Address>(&registry, r#"{"City":"Oslo","Street":1}"#).unwrap_err();
        assert!(err.is_data_error());
        assert!(alloc::format!("{err}").contains("unknown field `Street`"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let registry = registry();
        let address: Address = decode(&registry, r#"{"city":"Oslo"}"#).unwrap();
        assert_eq!(address.city, "");
    }

    #[test]
    fn constructor_stages_and_defers() {
        let registry = registry();
        let account: Account = decode(&registry, r#"{"Age":3,"UserName":"JohnSmith"}"#).unwrap();
        assert_eq!(
            account,
            Account {
                user_name: "johnsmith".into(),
                age: 3
            }
        );
    }

    #[test]
    fn missing_constructor_argument_is_a_field_error() {
        let registry = registry();
        let err = decode::<Account>(&registry, r#"{"Age":3}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Field(FieldError::MissingArgument { .. })
        ));
    }

    #[test]
    fn malformed_input_is_a_format_error() {
        let registry = registry();
        let err = decode::<Address>(&registry, r#"{"City":12}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)));
        assert!(err.is_data_error());
    }

    #[test]
    fn field_codec_and_order() {
        let registry = registry();
        let counter: Counter = decode(&registry, r#"{"Label":"hits","Count":"12"}"#).unwrap();
        assert_eq!(counter.count, 12);
        assert_eq!(encode(&registry, &counter), r#"{"Count":"12","Label":"hits"}"#);

        assert!(decode::<Counter>(&registry, r#"{"Count":"twelve"}"#).is_err());
    }

    #[test]
    fn ron_round_trip() {
        let registry = registry();
        let input = r#"{"City": "Oslo", "Zip": Some(150)}"#;
        let mut de = ron::Deserializer::from_str(input).unwrap();
        let address: Address = registry.decode(&mut de).unwrap();
        assert_eq!(address.zip, Some(150));

        let mut output = String::new();
        let mut serializer = ron::Serializer::new(&mut output, None).unwrap();
        registry.encode(&address, &mut serializer).unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"City\""));
        assert!(output.contains("Some(150)"));
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
    enum Level {
        #[default]
        Low,
        High,
    }

    #[derive(Debug, Default)]
    struct Alert {
        level: Level,
        levels: Vec<Level>,
    }

    crate::impl_field_type!(serde Level);
    crate::impl_field_type!(record Alert);

    impl Record for Alert {
        fn contract() -> ContractBuilder<Self> {
            ContractBuilder::<Self>::new()
                .with_default()
                .property("Level", |a| &a.level, |a, v| a.level = v)
                .property("Levels", |a| &a.levels, |a, v| a.levels = v)
        }
    }

    #[test]
    fn serde_typed_fields() {
        let mut registry = registry();
        registry.register::<Alert>();

        let alert: Alert = decode(&registry, r#"{"Level":"High","Levels":["Low","High"]}"#).unwrap();
        assert_eq!(alert.level, Level::High);
        assert_eq!(alert.levels, [Level::Low, Level::High]);
        assert_eq!(
            encode(&registry, &alert),
            r#"{"Level":"High","Levels":["Low","High"]}"#
        );

        let err = decode::<Alert>(&registry, r#"{"Level":"Medium"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)));
    }
}
