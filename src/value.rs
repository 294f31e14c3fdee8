//! Open, schema-flexible claim storage (component C1).
//!
//! [`ValueStorage`] is the substrate every claim container (JWT claims,
//! DPoP claims, JWS headers) is built on: a plain string-keyed map of
//! arbitrary JSON values, with typed accessors layered on top so that
//! registered parameters get JOSE-specific encoding while unrecognized
//! keys still round-trip untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{base64url_decode, base64url_encode};
use crate::error::{JoseError, Result};

/// An open map from string keys to JSON values, with JOSE-aware typed
/// accessors.
///
/// Equality is canonical-form equality (see [`canonical_eq`]), not
/// derived structural equality: a claim stored as the JSON integer `1`
/// compares equal to one stored as `1.0`, matching §3's "Equality is
/// defined by round-trip through a canonical JSON representation" rule.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueStorage {
    map: Map<String, Value>,
}

impl ValueStorage {
    /// An empty storage map.
    #[must_use]
    pub fn new() -> Self {
        Self { map: Map::new() }
    }

    /// The present value at `key`, which may itself be JSON `null`.
    /// Returns `None` only when `key` is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Set `key` to a raw JSON value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.map.insert(key.into(), value.into());
    }

    /// Remove `key`, returning its prior value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    /// Whether `key` is present (with any value, including `null`).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// An iterator over the present keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    /// Read `key` and coerce it into `T`.
    ///
    /// Coercion proceeds by handing the stored [`Value`] to `T`'s own
    /// `Deserialize` impl: for JOSE-specific wrapper types (e.g.
    /// [`Base64Bytes`], [`crate::codec::NumericDate`]) that impl *is* the
    /// JOSE field decoder, so a direct type match and a JOSE-aware decode
    /// collapse into the same step; for any other `T` it is the generic
    /// JSON fallback. Never panics; any decode failure is treated as
    /// absence.
    #[must_use]
    pub fn typed_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.map.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Write `value` under `key`, encoded per `T`'s `Serialize` impl.
    ///
    /// `None` removes the key. A `T` that serializes to an empty JSON
    /// array also removes the key, per §4.1's "assigning an empty list
    /// removes the key" invariant.
    pub fn typed_set<T: Serialize>(&mut self, key: &str, value: Option<T>) {
        let Some(value) = value else {
            self.map.remove(key);
            return;
        };
        match serde_json::to_value(value) {
            Ok(Value::Array(items)) if items.is_empty() => {
                self.map.remove(key);
            }
            Ok(encoded) => {
                self.map.insert(key.to_string(), encoded);
            }
            Err(_) => {
                self.map.remove(key);
            }
        }
    }

    /// Key-wise merge: keys only in `self` or only in `other` pass
    /// through unchanged; keys in both are resolved by `combine`.
    pub fn merge(&mut self, other: &Self, combine: impl Fn(&Value, &Value) -> Value) {
        for (key, other_value) in &other.map {
            match self.map.get(key) {
                Some(self_value) => {
                    let resolved = combine(self_value, other_value);
                    self.map.insert(key.clone(), resolved);
                }
                None => {
                    self.map.insert(key.clone(), other_value.clone());
                }
            }
        }
    }

    /// Retain only keys for which `predicate` returns `true`.
    pub fn filter(&mut self, predicate: impl Fn(&str, &Value) -> bool) {
        self.map.retain(|k, v| predicate(k, v));
    }

    /// Decode either wire form: a JSON object, or a base64url string that
    /// decodes to one.
    ///
    /// # Errors
    /// Returns [`JoseError::MalformedInput`] if neither form parses.
    pub fn decode(input: &str) -> Result<Self> {
        let trimmed = input.trim_start();
        if trimmed.starts_with('{') {
            return serde_json::from_str(input)
                .map_err(|e| JoseError::MalformedInput(format!("invalid JSON object: {e}")));
        }

        let bytes = base64url_decode(input)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| JoseError::MalformedInput(format!("invalid JSON object: {e}")))
    }

    /// Encode as a JSON object. Callers needing compact form must
    /// base64url-encode the result themselves (see [`base64url_encode`]).
    #[must_use]
    pub fn encode(&self) -> Value {
        Value::Object(self.map.clone())
    }

    /// Reference to the underlying `serde_json` map, for callers that
    /// need direct structural access (e.g. the JWS engine merging a
    /// caller-supplied protected header with the `alg`/`kid` it derives).
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }
}

impl From<Map<String, Value>> for ValueStorage {
    fn from(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

impl PartialEq for ValueStorage {
    fn eq(&self, other: &Self) -> bool {
        canonical_eq(&self.encode(), &other.encode())
    }
}

impl Eq for ValueStorage {}

/// Canonical-form JSON equality: numbers compare by `f64` value (so `1`
/// and `1.0` are equal) and objects compare as key sets (order-
/// insensitive), recursing structurally otherwise.
#[must_use]
pub fn canonical_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| canonical_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| canonical_eq(v, bv)))
        }
        _ => a == b,
    }
}

/// A byte string, JOSE-encoded as base64url without padding.
///
/// Using a newtype (rather than teaching `typed_get`/`typed_set` to treat
/// every `Vec<u8>` specially) keeps the encoding explicit at call sites
/// and avoids silently reinterpreting an already-JSON-array-of-numbers
/// `Vec<u8>` as something it isn't.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Base64Bytes(pub Vec<u8>);

impl Serialize for Base64Bytes {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&base64url_encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        base64url_decode(&encoded).map(Base64Bytes).map_err(serde::de::Error::custom)
    }
}

/// A BCP-47 language tag, normalized to hyphenated form on decode (an
/// underscore-separated tag such as `en_US` is accepted and rewritten to
/// `en-US`, matching the common non-conformant form many callers send).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BcpLocale(pub String);

impl Serialize for BcpLocale {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BcpLocale {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(serde::de::Error::custom("not a BCP-47 tag"));
        }
        Ok(Self(raw.replace('_', "-")))
    }
}

/// An IANA time zone identifier (e.g. `America/New_York`), stored
/// verbatim; validated only loosely (must contain a `/`) since the full
/// IANA database is out of scope for this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IanaTimeZone(pub String);

impl Serialize for IanaTimeZone {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for IanaTimeZone {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if !raw.contains('/') {
            return Err(serde::de::Error::custom("not an IANA time zone identifier"));
        }
        Ok(Self(raw))
    }
}

/// Resolve a localizable field: search for `base#<locale>` keys and
/// return the value for the first entry in `preferred_locales` that has
/// one, falling back to the bare `base` key.
///
/// This realizes §3's "registered parameter table" localization rule: it
/// is deliberately generic over the container rather than baked into any
/// one claim type, since none of the concrete JWT/DPoP claims in this
/// crate are themselves localizable but the mechanism is part of the
/// storage layer's contract.
#[must_use]
pub fn get_localized<'a>(
    storage: &'a ValueStorage, base: &str, preferred_locales: &[String],
) -> Option<&'a Value> {
    for locale in preferred_locales {
        if let Some(value) = storage.get(&format!("{base}#{locale}")) {
            return Some(value);
        }
    }
    storage.get(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_null_are_distinguishable() {
        let mut storage = ValueStorage::new();
        assert_eq!(storage.get("x"), None);
        storage.set("x", Value::Null);
        assert_eq!(storage.get("x"), Some(&Value::Null));
    }

    #[test]
    fn typed_set_none_removes_key() {
        let mut storage = ValueStorage::new();
        storage.set("iss", "issuer");
        storage.typed_set::<String>("iss", None);
        assert!(!storage.contains("iss"));
    }

    #[test]
    fn typed_set_empty_list_removes_key() {
        let mut storage = ValueStorage::new();
        storage.set("aud", serde_json::json!(["a"]));
        storage.typed_set("aud", Some(Vec::<String>::new()));
        assert!(!storage.contains("aud"));
    }

    #[test]
    fn typed_round_trip_for_jose_field_types() {
        let mut storage = ValueStorage::new();

        storage.typed_set("bytes", Some(Base64Bytes(b"hello".to_vec())));
        assert_eq!(storage.typed_get::<Base64Bytes>("bytes"), Some(Base64Bytes(b"hello".to_vec())));

        storage.typed_set("locale", Some(BcpLocale("en-US".into())));
        assert_eq!(storage.typed_get::<BcpLocale>("locale"), Some(BcpLocale("en-US".into())));

        let id = uuid::Uuid::new_v4();
        storage.typed_set("id", Some(id));
        assert_eq!(storage.typed_get::<uuid::Uuid>("id"), Some(id));

        storage.typed_set("flag", Some(true));
        assert_eq!(storage.typed_get::<bool>("flag"), Some(true));

        storage.typed_set("count", Some(7_i64));
        assert_eq!(storage.typed_get::<i64>("count"), Some(7));
    }

    #[test]
    fn locale_normalizes_underscore_to_hyphen() {
        let locale: BcpLocale = serde_json::from_value(serde_json::json!("en_US")).unwrap();
        assert_eq!(locale.0, "en-US");
    }

    #[test]
    fn uuid_round_trips_lowercase() {
        let mut storage = ValueStorage::new();
        storage.set("id", "550E8400-E29B-41D4-A716-446655440000");
        let parsed: uuid::Uuid = storage.typed_get("id").unwrap();
        assert_eq!(parsed.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn canonical_equality_ignores_numeric_type_and_key_order() {
        let mut a = ValueStorage::new();
        a.set("n", serde_json::json!(1));
        a.set("s", "x");

        let mut b = ValueStorage::new();
        b.set("s", "x");
        b.set("n", serde_json::json!(1.0));

        assert_eq!(a, b);
    }

    #[test]
    fn decode_accepts_both_wire_forms() {
        let json_form = ValueStorage::decode(r#"{"iss":"joe"}"#).unwrap();
        let encoded = base64url_encode(br#"{"iss":"joe"}"#);
        let b64_form = ValueStorage::decode(&encoded).unwrap();
        assert_eq!(json_form, b64_form);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(ValueStorage::decode("not json and not base64!!").is_err());
    }

    #[test]
    fn encode_decode_round_trips_modulo_key_order() {
        let mut storage = ValueStorage::new();
        storage.set("b", "2");
        storage.set("a", "1");

        let encoded = storage.encode();
        let decoded = ValueStorage::decode(&encoded.to_string()).unwrap();
        assert_eq!(storage, decoded);
    }

    #[test]
    fn merge_invokes_combine_only_on_conflicts() {
        let mut a = ValueStorage::new();
        a.set("x", 1);
        a.set("shared", 1);

        let mut b = ValueStorage::new();
        b.set("y", 2);
        b.set("shared", 2);

        a.merge(&b, |l, r| serde_json::json!(l.as_i64().unwrap() + r.as_i64().unwrap()));

        assert_eq!(a.get("x"), Some(&serde_json::json!(1)));
        assert_eq!(a.get("y"), Some(&serde_json::json!(2)));
        assert_eq!(a.get("shared"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn filter_retains_matching_keys() {
        let mut storage = ValueStorage::new();
        storage.set("keep", 1);
        storage.set("drop", 2);
        storage.filter(|k, _| k == "keep");
        assert!(storage.contains("keep"));
        assert!(!storage.contains("drop"));
    }

    #[test]
    fn localization_prefers_locale_suffixed_key() {
        let mut storage = ValueStorage::new();
        storage.set("name", "default");
        storage.set("name#fr-FR", "bonjour");

        let preferred = vec!["fr-FR".to_string()];
        assert_eq!(get_localized(&storage, "name", &preferred), Some(&serde_json::json!("bonjour")));
        assert_eq!(get_localized(&storage, "name", &[]), Some(&serde_json::json!("default")));
    }
}
