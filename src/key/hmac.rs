//! HMAC keys (HS256/384/512).

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use super::{SigningKey, ValidatingKey};
use crate::alg::Algorithm;
use crate::error::{JoseError, Result};
use crate::value::{Base64Bytes, ValueStorage};

/// A symmetric key used for HMAC signing and verification.
///
/// Symmetric keys are always both signing and validating: there is no
/// public/private split.
#[derive(Clone)]
pub struct HmacKey {
    kid: Option<String>,
    secret: Vec<u8>,
}

impl HmacKey {
    /// Build a new HMAC key from a shared secret.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, kid: Option<String>) -> Self {
        Self { kid, secret: secret.into() }
    }

    /// Parse a `kty=oct` JWK.
    ///
    /// # Errors
    /// [`JoseError::MalformedInput`] if the `k` member is missing or not
    /// valid base64url.
    pub fn from_jwk(jwk: &ValueStorage) -> Result<Self> {
        let secret: Base64Bytes = jwk
            .typed_get("k")
            .ok_or_else(|| JoseError::MalformedInput("oct JWK missing k".into()))?;
        let kid = jwk.typed_get("kid");
        Ok(Self::new(secret.0, kid))
    }
}

fn mac_sign<M: Mac + hmac::digest::KeyInit>(secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| JoseError::MalformedInput(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn mac_verify<M: Mac + hmac::digest::KeyInit>(
    secret: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| JoseError::MalformedInput(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    mac.verify_slice(signature).map_err(|_| JoseError::AuthenticationFailure)
}

impl ValidatingKey for HmacKey {
    fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    fn supports(&self, algorithm: Algorithm) -> bool {
        matches!(algorithm, Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512)
    }

    fn verify(&self, algorithm: Algorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        match algorithm {
            Algorithm::Hs256 => mac_verify::<Hmac<Sha256>>(&self.secret, message, signature),
            Algorithm::Hs384 => mac_verify::<Hmac<Sha384>>(&self.secret, message, signature),
            Algorithm::Hs512 => mac_verify::<Hmac<Sha512>>(&self.secret, message, signature),
            other => Err(JoseError::Unsupported(other.to_string())),
        }
    }

    fn to_public_jwk(&self) -> ValueStorage {
        // An HMAC secret has no public half; expose only its identity.
        let mut jwk = ValueStorage::new();
        jwk.set("kty", "oct");
        if let Some(kid) = &self.kid {
            jwk.set("kid", kid.as_str());
        }
        jwk
    }
}

impl SigningKey for HmacKey {
    fn sign(&self, algorithm: Algorithm, message: &[u8]) -> Result<Vec<u8>> {
        match algorithm {
            Algorithm::Hs256 => mac_sign::<Hmac<Sha256>>(&self.secret, message),
            Algorithm::Hs384 => mac_sign::<Hmac<Sha384>>(&self.secret, message),
            Algorithm::Hs512 => mac_sign::<Hmac<Sha512>>(&self.secret, message),
            other => Err(JoseError::Unsupported(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let key = HmacKey::new(b"super-secret".to_vec(), Some("k1".into()));
        let sig = key.sign(Algorithm::Hs256, b"message").unwrap();
        assert!(key.verify(Algorithm::Hs256, b"message", &sig).is_ok());
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let key = HmacKey::new(b"super-secret".to_vec(), None);
        let mut sig = key.sign(Algorithm::Hs256, b"message").unwrap();
        sig[0] ^= 0xFF;
        let err = key.verify(Algorithm::Hs256, b"message", &sig).unwrap_err();
        assert!(matches!(err, JoseError::AuthenticationFailure));
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        let key = HmacKey::new(b"secret".to_vec(), None);
        let err = key.sign(Algorithm::Es256, b"message").unwrap_err();
        assert!(matches!(err, JoseError::Unsupported(_)));
    }
}
