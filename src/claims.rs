//! Claim containers (component C5): typed views over [`ValueStorage`].
//!
//! Each container in this crate ([`crate::jwt::JwtClaims`],
//! [`crate::dpop::DpopClaims`], [`Header`]) is a thin wrapper around a
//! `ValueStorage` plus a fixed set of accessor methods for its registered
//! parameters — the "registered parameter table" is the set of those
//! methods rather than a data structure, since Rust gives no cheaper way
//! to express a static field-to-wire-key mapping than writing the
//! methods directly.

use serde::{Deserialize, Serialize};

use crate::alg::Algorithm;
use crate::error::{JoseError, Result};
use crate::value::ValueStorage;

/// A claim value that may be either a single string or a list of
/// strings — the shape RFC 7519 §4.1.3 allows for `aud`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringOrList(pub Vec<String>);

impl Serialize for StringOrList {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StringOrList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(s) => Self(vec![s]),
            Repr::Many(v) => Self(v),
        })
    }
}

/// The JOSE header shared by every JWS signature slot: the generalized
/// JOSE header, with `alg`/`typ`/`kid`/`jwk` kept as named accessors but
/// the rest of the header left as an open [`ValueStorage`] so unrecognized
/// parameters round-trip untouched.
#[derive(Clone, Debug, Default)]
pub struct Header {
    storage: ValueStorage,
}

impl Header {
    /// An empty header.
    #[must_use]
    pub fn new() -> Self {
        Self { storage: ValueStorage::new() }
    }

    /// Wrap an existing storage map as a header view.
    #[must_use]
    pub fn from_storage(storage: ValueStorage) -> Self {
        Self { storage }
    }

    /// Consume the header, returning its underlying storage.
    #[must_use]
    pub fn into_storage(self) -> ValueStorage {
        self.storage
    }

    /// Borrow the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &ValueStorage {
        &self.storage
    }

    /// The `alg` header parameter.
    ///
    /// # Errors
    /// [`JoseError::AlgorithmMissing`] if absent; [`JoseError::MalformedInput`]
    /// if present but not a JSON string; [`JoseError::UnknownAlgorithm`] if a
    /// string but not one of the registry's identifiers.
    pub fn algorithm(&self) -> Result<Algorithm> {
        let raw = self.storage.get("alg").ok_or(JoseError::AlgorithmMissing)?;
        let id = raw
            .as_str()
            .ok_or_else(|| JoseError::MalformedInput("alg header must be a string".into()))?;
        serde_json::from_value(serde_json::Value::String(id.to_string()))
            .map_err(|_| JoseError::UnknownAlgorithm(id.to_string()))
    }

    /// Set the `alg` header parameter.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.storage.set("alg", algorithm.as_str());
    }

    /// The `typ` header parameter, e.g. `"JWT"` or `"dpop+jwt"`.
    #[must_use]
    pub fn typ(&self) -> Option<String> {
        self.storage.typed_get("typ")
    }

    /// Set the `typ` header parameter.
    pub fn set_typ(&mut self, typ: Option<impl Into<String>>) {
        self.storage.typed_set("typ", typ.map(Into::into));
    }

    /// The `kid` header parameter.
    #[must_use]
    pub fn kid(&self) -> Option<String> {
        self.storage.typed_get("kid")
    }

    /// Set the `kid` header parameter.
    pub fn set_kid(&mut self, kid: Option<impl Into<String>>) {
        self.storage.typed_set("kid", kid.map(Into::into));
    }

    /// An embedded public-key JWK, when this header carries one instead
    /// of a `kid`.
    #[must_use]
    pub fn jwk(&self) -> Option<ValueStorage> {
        self.storage.get("jwk").and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Embed a public-key JWK under the `jwk` header parameter.
    pub fn set_jwk(&mut self, jwk: Option<ValueStorage>) {
        match jwk {
            Some(jwk) => self.storage.set("jwk", jwk.encode()),
            None => {
                self.storage.remove("jwk");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_or_list_serializes_single_value_as_bare_string() {
        let value = StringOrList(vec!["client-1".into()]);
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!("client-1"));
    }

    #[test]
    fn string_or_list_serializes_multiple_values_as_array() {
        let value = StringOrList(vec!["a".into(), "b".into()]);
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!(["a", "b"]));
    }

    #[test]
    fn string_or_list_deserializes_both_shapes() {
        let one: StringOrList = serde_json::from_value(serde_json::json!("a")).unwrap();
        assert_eq!(one.0, vec!["a".to_string()]);
        let many: StringOrList = serde_json::from_value(serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(many.0, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn header_round_trips_registered_fields() {
        let mut header = Header::new();
        header.set_algorithm(Algorithm::Es256);
        header.set_typ(Some("dpop+jwt"));
        header.set_kid(Some("key-1"));

        assert_eq!(header.algorithm().unwrap(), Algorithm::Es256);
        assert_eq!(header.typ().as_deref(), Some("dpop+jwt"));
        assert_eq!(header.kid().as_deref(), Some("key-1"));
    }

    #[test]
    fn header_missing_alg_is_algorithm_missing() {
        let header = Header::new();
        assert!(matches!(header.algorithm().unwrap_err(), JoseError::AlgorithmMissing));
    }

    #[test]
    fn header_unrecognized_alg_string_is_unknown_algorithm() {
        let mut header = Header::new();
        header.storage.set("alg", "ROT13");
        assert!(matches!(header.algorithm().unwrap_err(), JoseError::UnknownAlgorithm(id) if id == "ROT13"));
    }

    #[test]
    fn header_non_string_alg_is_malformed_input() {
        let mut header = Header::new();
        header.storage.set("alg", 1);
        assert!(matches!(header.algorithm().unwrap_err(), JoseError::MalformedInput(_)));
    }

    #[test]
    fn header_embeds_and_reads_back_jwk() {
        let mut jwk = ValueStorage::new();
        jwk.set("kty", "EC");
        jwk.set("crv", "P-256");

        let mut header = Header::new();
        header.set_jwk(Some(jwk.clone()));
        assert_eq!(header.jwk(), Some(jwk));
    }

    #[test]
    fn unrecognized_header_parameters_round_trip() {
        let mut header = Header::new();
        header.storage.set("custom", "value");
        let storage = header.into_storage();
        assert_eq!(storage.get("custom"), Some(&serde_json::json!("value")));
    }
}
