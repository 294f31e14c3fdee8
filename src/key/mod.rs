//! The key abstraction (component C4): polymorphic signing/validating
//! keys plus key-selection by algorithm and `kid`.
//!
//! `ValidatingKey` and `SigningKey` are trait objects rather than a
//! closed enum so that a hardware-backed or remote key (§1's "opaque key
//! implementations behind the same signing interface") can be plugged in
//! by implementing the trait, without this crate knowing about it.

mod ec;
mod ed25519;
mod hmac;
mod rsa;

pub use ec::EcKey;
pub use ed25519::Ed25519Key;
pub use hmac::HmacKey;
pub use rsa::RsaKey;

use crate::alg::Algorithm;
use crate::error::{JoseError, Result};
use crate::value::ValueStorage;

/// A key that can verify signatures for the algorithms it declares
/// support for.
pub trait ValidatingKey: Send + Sync {
    /// The key's `kid`, if any.
    fn key_id(&self) -> Option<&str>;

    /// Whether this key's type is compatible with `algorithm`.
    fn supports(&self, algorithm: Algorithm) -> bool;

    /// Verify `signature` over `message` under `algorithm`.
    ///
    /// # Errors
    /// [`JoseError::Unsupported`] if `algorithm` isn't compatible with
    /// this key; [`JoseError::AuthenticationFailure`] if the signature
    /// does not verify.
    fn verify(&self, algorithm: Algorithm, message: &[u8], signature: &[u8]) -> Result<()>;

    /// The public JWK representation of this key.
    fn to_public_jwk(&self) -> ValueStorage;
}

/// A key that can additionally produce signatures.
pub trait SigningKey: ValidatingKey {
    /// Sign `message` under `algorithm`.
    ///
    /// # Errors
    /// [`JoseError::Unsupported`] if `algorithm` isn't compatible with
    /// this key, or this key holds no private material.
    fn sign(&self, algorithm: Algorithm, message: &[u8]) -> Result<Vec<u8>>;
}

/// Select a key from `keys` per §4.4: partition by algorithm support,
/// prefer an exact `kid` match, otherwise take the first compatible key.
///
/// # Errors
/// [`JoseError::KeyNotFound`] if no candidate supports `algorithm`.
pub fn match_key<'a, K: ValidatingKey + ?Sized>(
    keys: &[&'a K], algorithm: Algorithm, kid: Option<&str>,
) -> Result<&'a K> {
    let compatible: Vec<&K> = keys.iter().filter(|k| k.supports(algorithm)).copied().collect();

    if let Some(kid) = kid {
        if let Some(exact) = compatible.iter().find(|k| k.key_id() == Some(kid)) {
            return Ok(*exact);
        }
        tracing::debug!(kid, %algorithm, "no key with matching kid; falling back to first compatible key");
    }

    compatible.into_iter().next().ok_or(JoseError::KeyNotFound)
}

/// Build a signing key from its JWK representation, choosing the
/// concrete key family by the `kty` member.
///
/// # Errors
/// [`JoseError::MalformedInput`] if `kty` is missing/unrecognized or the
/// key material for that family is malformed or lacks a private part.
pub fn signing_key_from_jwk(jwk: &ValueStorage) -> Result<Box<dyn SigningKey>> {
    match kty(jwk)?.as_str() {
        "oct" => Ok(Box::new(HmacKey::from_jwk(jwk)?)),
        "RSA" => Ok(Box::new(RsaKey::from_jwk(jwk, true)?)),
        "EC" => Ok(Box::new(EcKey::from_jwk(jwk, true)?)),
        "OKP" => Ok(Box::new(Ed25519Key::from_jwk(jwk, true)?)),
        other => Err(JoseError::MalformedInput(format!("unsupported kty: {other}"))),
    }
}

/// Build a validating (public-only) key from its JWK representation.
///
/// # Errors
/// Same as [`signing_key_from_jwk`], but private material is optional.
pub fn validating_key_from_jwk(jwk: &ValueStorage) -> Result<Box<dyn ValidatingKey>> {
    match kty(jwk)?.as_str() {
        "oct" => Ok(Box::new(HmacKey::from_jwk(jwk)?)),
        "RSA" => Ok(Box::new(RsaKey::from_jwk(jwk, false)?)),
        "EC" => Ok(Box::new(EcKey::from_jwk(jwk, false)?)),
        "OKP" => Ok(Box::new(Ed25519Key::from_jwk(jwk, false)?)),
        other => Err(JoseError::MalformedInput(format!("unsupported kty: {other}"))),
    }
}

fn kty(jwk: &ValueStorage) -> Result<String> {
    jwk.typed_get::<String>("kty").ok_or_else(|| JoseError::MalformedInput("JWK missing kty".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(&'static str);
    impl ValidatingKey for Fixed {
        fn key_id(&self) -> Option<&str> {
            Some(self.0)
        }
        fn supports(&self, algorithm: Algorithm) -> bool {
            algorithm == Algorithm::Hs256
        }
        fn verify(&self, _: Algorithm, _: &[u8], _: &[u8]) -> Result<()> {
            Ok(())
        }
        fn to_public_jwk(&self) -> ValueStorage {
            ValueStorage::new()
        }
    }

    #[test]
    fn match_key_prefers_exact_kid() {
        let a = Fixed("a");
        let b = Fixed("b");
        let keys: Vec<&Fixed> = vec![&a, &b];
        let found = match_key(&keys, Algorithm::Hs256, Some("b")).unwrap();
        assert_eq!(found.key_id(), Some("b"));
    }

    #[test]
    fn match_key_falls_back_to_first_compatible_without_kid() {
        let a = Fixed("a");
        let b = Fixed("b");
        let keys: Vec<&Fixed> = vec![&a, &b];
        let found = match_key(&keys, Algorithm::Hs256, None).unwrap();
        assert_eq!(found.key_id(), Some("a"));
    }

    #[test]
    fn match_key_fails_when_no_candidate_supports_algorithm() {
        let a = Fixed("a");
        let keys: Vec<&Fixed> = vec![&a];
        let err = match_key(&keys, Algorithm::Es256, None).unwrap_err();
        assert!(matches!(err, JoseError::KeyNotFound));
    }
}
