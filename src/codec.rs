//! Wire-level codec helpers: base64url, `NumericDate`, and DPoP's `htu`
//! URI normalization rule.

use std::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

use crate::error::{JoseError, Result};

/// Encode `bytes` using the unpadded base64url alphabet (`A-Za-z0-9-_`).
#[must_use]
pub fn base64url_encode(bytes: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(bytes)
}

/// Decode a base64url string, tolerating missing padding.
///
/// # Errors
/// Returns [`JoseError::MalformedInput`] if `s` contains characters outside
/// the base64url alphabet.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>> {
    Base64UrlUnpadded::decode_vec(s)
        .map_err(|e| JoseError::MalformedInput(format!("invalid base64url: {e}")))
}

/// A JOSE `NumericDate`: seconds since the Unix epoch, encoded as a JSON
/// number (integer or fractional, per RFC 7519 §2).
///
/// Deserialization accepts both integer and floating-point JSON numbers,
/// truncating any fractional part; serialization always emits an integer,
/// which is the convention this crate's tests rely on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumericDate(i64);

impl NumericDate {
    /// Construct a `NumericDate` from a Unix timestamp in seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// The underlying Unix timestamp in seconds.
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NumericDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NumericDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for NumericDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Number::deserialize(deserializer)?;
        if let Some(i) = value.as_i64() {
            Ok(Self(i))
        } else if let Some(f) = value.as_f64() {
            Ok(Self(f.trunc() as i64))
        } else {
            Err(serde::de::Error::custom("NumericDate out of range"))
        }
    }
}

/// Normalize a DPoP target URI (`htu`) per RFC 9449 §4.2 / RFC 3986 §6.2.3:
/// strip the query and fragment, default an empty path to `/`, and preserve
/// scheme, userinfo, host and port verbatim.
///
/// Returns `None` if `uri` is not an absolute `scheme://authority[...]` URI.
///
/// This is a hand-rolled, minimal parser rather than a pull from the `url`
/// crate: the normalization rule only ever touches the scheme/authority
/// prefix and the path, and does so byte-for-byte without percent-decoding
/// or punycode handling, which a general-purpose URL parser would otherwise
/// apply and which would risk altering the bytes RFC 9449 says to preserve.
#[must_use]
pub fn normalize_dpop_target_uri(uri: &str) -> Option<String> {
    let scheme_end = uri.find("://")?;
    let scheme = &uri[..scheme_end];
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return None;
    }

    let rest = &uri[scheme_end + 3..];
    if rest.is_empty() {
        return None;
    }

    // authority runs until the first '/', '?' or '#'
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    if authority.is_empty() {
        return None;
    }
    let after_authority = &rest[authority_end..];

    let path_end = after_authority.find(['?', '#']).unwrap_or(after_authority.len());
    let path = &after_authority[..path_end];

    let path = if path.is_empty() { "/" } else { path };

    Some(format!("{scheme}://{authority}{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64url_round_trips() {
        let bytes = b"hello jose";
        let encoded = base64url_encode(bytes);
        assert!(!encoded.contains('='));
        assert_eq!(base64url_decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn base64url_decode_rejects_invalid_chars() {
        assert!(base64url_decode("not valid!!").is_err());
    }

    #[test]
    fn numeric_date_round_trips_through_json() {
        let date = NumericDate::from_secs(1_562_262_618);
        let json = serde_json::to_value(date).unwrap();
        assert_eq!(json, serde_json::json!(1_562_262_618));
        let back: NumericDate = serde_json::from_value(json).unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn numeric_date_accepts_fractional_seconds() {
        let back: NumericDate = serde_json::from_value(serde_json::json!(1562262618.5)).unwrap();
        assert_eq!(back.as_secs(), 1_562_262_618);
    }

    #[test]
    fn htu_normalization_examples() {
        assert_eq!(
            normalize_dpop_target_uri("https://resource.example.com/").as_deref(),
            Some("https://resource.example.com/")
        );
        assert_eq!(
            normalize_dpop_target_uri("https://resource.example.com").as_deref(),
            Some("https://resource.example.com/")
        );
        assert_eq!(
            normalize_dpop_target_uri("https://resource.example.com/api/v1?sort=name").as_deref(),
            Some("https://resource.example.com/api/v1")
        );
        assert_eq!(
            normalize_dpop_target_uri("https://resource.example.com/entity#fragment").as_deref(),
            Some("https://resource.example.com/entity")
        );
        assert_eq!(
            normalize_dpop_target_uri("https://username@resource.example.com:8443/").as_deref(),
            Some("https://username@resource.example.com:8443/")
        );
    }

    #[test]
    fn htu_normalization_is_idempotent() {
        for uri in [
            "https://resource.example.com/api/v1?sort=name",
            "https://resource.example.com",
            "https://username@resource.example.com:8443/entity#frag",
        ] {
            let once = normalize_dpop_target_uri(uri).unwrap();
            let twice = normalize_dpop_target_uri(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn htu_normalization_rejects_invalid_uri() {
        assert_eq!(normalize_dpop_target_uri("not a uri"), None);
        assert_eq!(normalize_dpop_target_uri("https://"), None);
    }
}
