//! Ed25519 keys (EdDSA), `kty=OKP`/`crv=Ed25519` per RFC 8037.

use ed25519_dalek::{Signature, Signer as _, SigningKey as DalekSigningKey, Verifier as _, VerifyingKey};

use super::{SigningKey, ValidatingKey};
use crate::alg::Algorithm;
use crate::error::{JoseError, Result};
use crate::value::{Base64Bytes, ValueStorage};

/// An Ed25519 key, with or without the private scalar.
#[derive(Debug)]
pub enum Ed25519Key {
    /// Verify-only.
    Public { kid: Option<String>, key: VerifyingKey },
    /// Sign-and-verify.
    Private { kid: Option<String>, key: DalekSigningKey },
}

impl Ed25519Key {
    fn verifying_key(&self) -> VerifyingKey {
        match self {
            Self::Public { key, .. } => *key,
            Self::Private { key, .. } => key.verifying_key(),
        }
    }

    /// Parse a `kty=OKP, crv=Ed25519` JWK. When `want_private` is `true`,
    /// `d` must be present.
    ///
    /// # Errors
    /// [`JoseError::MalformedInput`] if `crv` isn't `Ed25519`, or `x` (and
    /// `d`, when requested) is missing or not exactly 32 bytes.
    pub fn from_jwk(jwk: &ValueStorage, want_private: bool) -> Result<Self> {
        let kid: Option<String> = jwk.typed_get("kid");
        let crv: String =
            jwk.typed_get("crv").ok_or_else(|| JoseError::MalformedInput("OKP JWK missing crv".into()))?;
        if crv != "Ed25519" {
            return Err(JoseError::MalformedInput(format!("unsupported OKP curve: {crv}")));
        }

        if want_private {
            let d: Base64Bytes =
                jwk.typed_get("d").ok_or_else(|| JoseError::MalformedInput("OKP JWK missing d".into()))?;
            let bytes: [u8; 32] = d
                .0
                .try_into()
                .map_err(|_| JoseError::MalformedInput("Ed25519 private key must be 32 bytes".into()))?;
            Ok(Self::Private { kid, key: DalekSigningKey::from_bytes(&bytes) })
        } else {
            let x: Base64Bytes =
                jwk.typed_get("x").ok_or_else(|| JoseError::MalformedInput("OKP JWK missing x".into()))?;
            let bytes: [u8; 32] = x
                .0
                .try_into()
                .map_err(|_| JoseError::MalformedInput("Ed25519 public key must be 32 bytes".into()))?;
            let key = VerifyingKey::from_bytes(&bytes)
                .map_err(|e| JoseError::MalformedInput(format!("invalid Ed25519 public key: {e}")))?;
            Ok(Self::Public { kid, key })
        }
    }
}

impl ValidatingKey for Ed25519Key {
    fn key_id(&self) -> Option<&str> {
        match self {
            Self::Public { kid, .. } | Self::Private { kid, .. } => kid.as_deref(),
        }
    }

    fn supports(&self, algorithm: Algorithm) -> bool {
        algorithm == Algorithm::EdDsa
    }

    fn verify(&self, algorithm: Algorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        if !self.supports(algorithm) {
            return Err(JoseError::Unsupported(algorithm.to_string()));
        }
        let signature =
            Signature::from_slice(signature).map_err(|_| JoseError::AuthenticationFailure)?;
        self.verifying_key().verify(message, &signature).map_err(|_| JoseError::AuthenticationFailure)
    }

    fn to_public_jwk(&self) -> ValueStorage {
        let mut jwk = ValueStorage::new();
        jwk.set("kty", "OKP");
        jwk.set("crv", "Ed25519");
        if let Some(kid) = self.key_id() {
            jwk.set("kid", kid);
        }
        jwk.typed_set("x", Some(Base64Bytes(self.verifying_key().to_bytes().to_vec())));
        jwk
    }
}

impl SigningKey for Ed25519Key {
    fn sign(&self, algorithm: Algorithm, message: &[u8]) -> Result<Vec<u8>> {
        if !self.supports(algorithm) {
            return Err(JoseError::Unsupported(algorithm.to_string()));
        }
        let Self::Private { key, .. } = self else {
            return Err(JoseError::Unsupported(format!("{algorithm} requires a private Ed25519 key")));
        };
        Ok(key.sign(message).to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;

    fn key_pair() -> Ed25519Key {
        let key = DalekSigningKey::generate(&mut OsRng);
        Ed25519Key::Private { kid: Some("ed-1".into()), key }
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let key = key_pair();
        let sig = key.sign(Algorithm::EdDsa, b"hello").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(key.verify(Algorithm::EdDsa, b"hello", &sig).is_ok());
    }

    #[test]
    fn tampered_signature_fails() {
        let key = key_pair();
        let mut sig = key.sign(Algorithm::EdDsa, b"hello").unwrap();
        sig[0] ^= 0xFF;
        assert!(matches!(
            key.verify(Algorithm::EdDsa, b"hello", &sig).unwrap_err(),
            JoseError::AuthenticationFailure
        ));
    }

    #[test]
    fn jwk_round_trip_preserves_public_key() {
        let key = key_pair();
        let jwk = key.to_public_jwk();
        let parsed = Ed25519Key::from_jwk(&jwk, false).unwrap();
        let sig = key.sign(Algorithm::EdDsa, b"round trip").unwrap();
        assert!(parsed.verify(Algorithm::EdDsa, b"round trip", &sig).is_ok());
    }

    #[test]
    fn wrong_curve_is_rejected() {
        let mut jwk = ValueStorage::new();
        jwk.set("kty", "OKP");
        jwk.set("crv", "X25519");
        jwk.typed_set("x", Some(Base64Bytes(vec![0u8; 32])));
        assert!(matches!(
            Ed25519Key::from_jwk(&jwk, false).unwrap_err(),
            JoseError::MalformedInput(_)
        ));
    }
}
