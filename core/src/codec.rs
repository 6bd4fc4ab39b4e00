//! Pluggable JSON codec.
//!
//! # Design
//! `JsonClient` never calls `serde_json` directly. It asks its
//! `CodecFactory` for a fresh `Codec` on every encode and decode, so a
//! different factory can change how values map to JSON (field naming, pretty
//! output) without touching the call path.
//!
//! `JsonCodecFactory` is the default. With `FieldNaming::Identity` it is a
//! thin wrapper over `serde_json`. Any other policy renames struct fields
//! only: Rust field names are spelled per the policy on encode, and incoming
//! keys are matched back to the field names on decode. Map keys and enum
//! variant tags are left as they are (see `rename.rs`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::rename::{RenameDeserializer, Renamed};

/// Converts values to and from JSON text.
pub trait Codec {
    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError>;

    fn from_json<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError>;
}

/// Produces codecs for `JsonClient`.
pub trait CodecFactory {
    type Codec: Codec;

    fn new_codec(&self) -> Self::Codec;
}

/// How object keys are spelled on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldNaming {
    /// Keys are written exactly as the Rust type names them.
    #[default]
    Identity,
    /// `user_name` <-> `userName`
    LowerCamelCase,
    /// `user_name` <-> `UserName`
    UpperCamelCase,
    /// `userName` <-> `user_name`, for types whose fields are not snake_case.
    LowerCaseWithUnderscores,
    /// `user_name` <-> `user-name`
    LowerCaseWithDashes,
}

impl FieldNaming {
    /// Spell `key` according to this policy.
    pub fn apply(self, key: &str) -> String {
        if self == FieldNaming::Identity {
            return key.to_string();
        }
        let words = split_words(key);
        if words.is_empty() {
            return key.to_string();
        }
        match self {
            FieldNaming::Identity => key.to_string(),
            FieldNaming::LowerCamelCase => {
                let mut out = words[0].clone();
                for word in &words[1..] {
                    out.push_str(&capitalize(word));
                }
                out
            }
            FieldNaming::UpperCamelCase => words.iter().map(|w| capitalize(w)).collect(),
            FieldNaming::LowerCaseWithUnderscores => words.join("_"),
            FieldNaming::LowerCaseWithDashes => words.join("-"),
        }
    }
}

/// Default codec factory, backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodecFactory {
    naming: FieldNaming,
    pretty: bool,
}

impl JsonCodecFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_naming(mut self, naming: FieldNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl CodecFactory for JsonCodecFactory {
    type Codec = JsonCodec;

    fn new_codec(&self) -> JsonCodec {
        JsonCodec {
            naming: self.naming,
            pretty: self.pretty,
        }
    }
}

/// Codec produced by [`JsonCodecFactory`].
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    naming: FieldNaming,
    pretty: bool,
}

impl JsonCodec {
    fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        if self.pretty {
            serde_json::to_string_pretty(value).map_err(CodecError::Serialize)
        } else {
            serde_json::to_string(value).map_err(CodecError::Serialize)
        }
    }
}

impl Codec for JsonCodec {
    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        if self.naming == FieldNaming::Identity {
            return self.write(value);
        }
        self.write(&Renamed::new(value, self.naming))
    }

    fn from_json<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError> {
        if self.naming == FieldNaming::Identity {
            return serde_json::from_str(text).map_err(CodecError::Deserialize);
        }
        let mut de = serde_json::Deserializer::from_str(text);
        let value = T::deserialize(RenameDeserializer::new(&mut de, self.naming))
            .map_err(CodecError::Deserialize)?;
        de.end().map_err(CodecError::Deserialize)?;
        Ok(value)
    }
}

/// Split an identifier into lowercase words at `_`, `-` and case changes.
/// `HTTPServer` splits as `http`, `server`.
fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::Value;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        user_name: String,
        login_count: u32,
        home_address: Address,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Address {
        street_name: String,
    }

    fn profile() -> Profile {
        Profile {
            user_name: "ada".to_string(),
            login_count: 3,
            home_address: Address {
                street_name: "Main".to_string(),
            },
        }
    }

    #[test]
    fn identity_matches_serde_json() {
        let codec = JsonCodecFactory::new().new_codec();
        let json = codec.to_json(&profile()).unwrap();
        assert_eq!(json, serde_json::to_string(&profile()).unwrap());
    }

    #[test]
    fn lower_camel_case_renames_nested_keys() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCamelCase)
            .new_codec();
        let json = codec.to_json(&profile()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["userName"], "ada");
        assert_eq!(value["loginCount"], 3);
        assert_eq!(value["homeAddress"]["streetName"], "Main");
    }

    #[test]
    fn lower_camel_case_decodes_into_snake_case_fields() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCamelCase)
            .new_codec();
        let decoded: Profile = codec
            .from_json(r#"{"userName":"ada","loginCount":3,"homeAddress":{"streetName":"Main"}}"#)
            .unwrap();
        assert_eq!(decoded, profile());
    }

    #[test]
    fn dashes_and_upper_camel_policies() {
        assert_eq!(FieldNaming::LowerCaseWithDashes.apply("user_name"), "user-name");
        assert_eq!(FieldNaming::UpperCamelCase.apply("user_name"), "UserName");
        assert_eq!(FieldNaming::LowerCaseWithUnderscores.apply("HTTPServer"), "http_server");
        assert_eq!(FieldNaming::LowerCamelCase.apply("id"), "id");
    }

    #[test]
    fn keys_inside_arrays_are_renamed() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCaseWithDashes)
            .new_codec();
        let json = codec
            .to_json(&vec![Address {
                street_name: "Elm".to_string(),
            }])
            .unwrap();
        assert_eq!(json, r#"[{"street-name":"Elm"}]"#);
    }

    #[test]
    fn pretty_output_spans_lines() {
        let codec = JsonCodecFactory::new().pretty(true).new_codec();
        let json = codec.to_json(&profile()).unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn malformed_text_is_a_deserialize_error() {
        let codec = JsonCodecFactory::new().new_codec();
        let err = codec.from_json::<Profile>("not json").unwrap_err();
        assert!(matches!(err, CodecError::Deserialize(_)));
    }

    #[test]
    fn non_string_map_keys_fail_to_serialize() {
        let codec = JsonCodecFactory::new().new_codec();
        let mut map = BTreeMap::new();
        map.insert((1, 2), "pair");
        let err = codec.to_json(&map).unwrap_err();
        assert!(matches!(err, CodecError::Serialize(_)));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Status {
        Pending,
        Active { since_year: u32 },
        Suspended(Address),
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Account {
        account_status: Status,
        previous_status: Option<Status>,
        scores: BTreeMap<String, u32>,
    }

    fn account() -> Account {
        let mut scores = BTreeMap::new();
        scores.insert("fooBar".to_string(), 1);
        scores.insert("snake_key".to_string(), 2);
        Account {
            account_status: Status::Active { since_year: 2020 },
            previous_status: Some(Status::Suspended(Address {
                street_name: "Elm".to_string(),
            })),
            scores,
        }
    }

    #[test]
    fn enum_tags_and_map_keys_survive_renaming() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCamelCase)
            .new_codec();
        let json = codec.to_json(&account()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["accountStatus"]["Active"]["sinceYear"], 2020);
        assert_eq!(value["previousStatus"]["Suspended"]["streetName"], "Elm");
        assert_eq!(value["scores"]["fooBar"], 1);
        assert_eq!(value["scores"]["snake_key"], 2);

        let decoded: Account = codec.from_json(&json).unwrap();
        assert_eq!(decoded, account());
    }

    #[test]
    fn map_keys_are_kept_on_decode() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCamelCase)
            .new_codec();
        let decoded: BTreeMap<String, u32> = codec.from_json(r#"{"fooBar":1,"snake_key":2}"#).unwrap();
        assert_eq!(decoded.get("fooBar"), Some(&1));
        assert_eq!(decoded.get("snake_key"), Some(&2));
    }

    #[test]
    fn unit_variants_and_strings_are_untouched() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCaseWithDashes)
            .new_codec();
        let json = codec.to_json(&vec![Status::Pending]).unwrap();
        assert_eq!(json, r#"["Pending"]"#);

        let json = codec
            .to_json(&Address {
                street_name: "snake_case_street".to_string(),
            })
            .unwrap();
        assert_eq!(json, r#"{"street-name":"snake_case_street"}"#);
    }

    #[test]
    fn snake_case_keys_still_decode_under_camel_policy() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCamelCase)
            .new_codec();
        let decoded: Address = codec.from_json(r#"{"street_name":"Main"}"#).unwrap();
        assert_eq!(decoded.street_name, "Main");
    }

    #[test]
    fn trailing_text_is_rejected_under_renaming() {
        let codec = JsonCodecFactory::new()
            .field_naming(FieldNaming::LowerCamelCase)
            .new_codec();
        let err = codec
            .from_json::<Address>(r#"{"streetName":"Main"} extra"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::Deserialize(_)));
    }
}
