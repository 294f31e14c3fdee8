//! Elliptic-curve keys: ECDSA over P-256 (ES256), P-384 (ES384) and
//! P-521 (ES512), using each curve's own `ecdsa` re-export so signatures
//! come out in the fixed-width `r||s` form RFC 7518 requires rather than
//! DER.
//!
//! The three curves get their own match arms rather than one generic
//! function: `p256`/`p384`/`p521` each define independent concrete
//! `SigningKey`/`VerifyingKey`/`Signature` types rather than sharing a
//! single generic `ecdsa::{Signing,Verifying}Key<C>` instantiation
//! parameter a caller could name, so there is no shorter generic form to
//! fall back to here.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use signature::{Signer as _, Verifier as _};

use super::{SigningKey, ValidatingKey};
use crate::alg::{Algorithm, Curve};
use crate::error::{JoseError, Result};
use crate::value::{Base64Bytes, ValueStorage};

/// An elliptic-curve key, with or without the private scalar.
pub enum EcKey {
    /// P-256, verify-only.
    P256Public(Option<String>, p256::ecdsa::VerifyingKey),
    /// P-256, sign-and-verify.
    P256Private(Option<String>, p256::ecdsa::SigningKey),
    /// P-384, verify-only.
    P384Public(Option<String>, p384::ecdsa::VerifyingKey),
    /// P-384, sign-and-verify.
    P384Private(Option<String>, p384::ecdsa::SigningKey),
    /// P-521, verify-only.
    P521Public(Option<String>, p521::ecdsa::VerifyingKey),
    /// P-521, sign-and-verify.
    P521Private(Option<String>, p521::ecdsa::SigningKey),
}

impl EcKey {
    fn curve(&self) -> Curve {
        match self {
            Self::P256Public(..) | Self::P256Private(..) => Curve::P256,
            Self::P384Public(..) | Self::P384Private(..) => Curve::P384,
            Self::P521Public(..) | Self::P521Private(..) => Curve::P521,
        }
    }

    /// Parse a `kty=EC` JWK. When `want_private` is `true`, `d` must be
    /// present.
    ///
    /// # Errors
    /// [`JoseError::MalformedInput`] if `crv`/`x`/`y` (and `d`, when
    /// requested) are missing, malformed, or name an unsupported curve.
    pub fn from_jwk(jwk: &ValueStorage, want_private: bool) -> Result<Self> {
        let kid: Option<String> = jwk.typed_get("kid");
        let crv: String =
            jwk.typed_get("crv").ok_or_else(|| JoseError::MalformedInput("EC JWK missing crv".into()))?;
        let x: Base64Bytes =
            jwk.typed_get("x").ok_or_else(|| JoseError::MalformedInput("EC JWK missing x".into()))?;
        let y: Base64Bytes =
            jwk.typed_get("y").ok_or_else(|| JoseError::MalformedInput("EC JWK missing y".into()))?;
        let d: Option<Base64Bytes> = jwk.typed_get("d");

        let mut sec1 = vec![0x04_u8];
        sec1.extend_from_slice(&x.0);
        sec1.extend_from_slice(&y.0);

        match crv.as_str() {
            "P-256" => {
                if want_private {
                    let d = d.ok_or_else(|| JoseError::MalformedInput("EC JWK missing d".into()))?;
                    let key = p256::ecdsa::SigningKey::from_slice(&d.0)
                        .map_err(|e| JoseError::MalformedInput(format!("invalid P-256 private key: {e}")))?;
                    Ok(Self::P256Private(kid, key))
                } else {
                    let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                        .map_err(|e| JoseError::MalformedInput(format!("invalid P-256 public key: {e}")))?;
                    Ok(Self::P256Public(kid, key))
                }
            }
            "P-384" => {
                if want_private {
                    let d = d.ok_or_else(|| JoseError::MalformedInput("EC JWK missing d".into()))?;
                    let key = p384::ecdsa::SigningKey::from_slice(&d.0)
                        .map_err(|e| JoseError::MalformedInput(format!("invalid P-384 private key: {e}")))?;
                    Ok(Self::P384Private(kid, key))
                } else {
                    let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                        .map_err(|e| JoseError::MalformedInput(format!("invalid P-384 public key: {e}")))?;
                    Ok(Self::P384Public(kid, key))
                }
            }
            "P-521" => {
                if want_private {
                    let d = d.ok_or_else(|| JoseError::MalformedInput("EC JWK missing d".into()))?;
                    let key = p521::ecdsa::SigningKey::from_slice(&d.0)
                        .map_err(|e| JoseError::MalformedInput(format!("invalid P-521 private key: {e}")))?;
                    Ok(Self::P521Private(kid, key))
                } else {
                    let key = p521::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                        .map_err(|e| JoseError::MalformedInput(format!("invalid P-521 public key: {e}")))?;
                    Ok(Self::P521Public(kid, key))
                }
            }
            other => Err(JoseError::MalformedInput(format!("unsupported EC curve: {other}"))),
        }
    }
}

impl ValidatingKey for EcKey {
    fn key_id(&self) -> Option<&str> {
        match self {
            Self::P256Public(kid, _)
            | Self::P256Private(kid, _)
            | Self::P384Public(kid, _)
            | Self::P384Private(kid, _)
            | Self::P521Public(kid, _)
            | Self::P521Private(kid, _) => kid.as_deref(),
        }
    }

    fn supports(&self, algorithm: Algorithm) -> bool {
        match self.curve() {
            Curve::P256 => algorithm == Algorithm::Es256,
            Curve::P384 => algorithm == Algorithm::Es384,
            Curve::P521 => algorithm == Algorithm::Es512,
            Curve::Ed25519 => false,
        }
    }

    fn verify(&self, algorithm: Algorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        if !self.supports(algorithm) {
            return Err(JoseError::Unsupported(algorithm.to_string()));
        }
        match self {
            Self::P256Public(_, key) => {
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| JoseError::AuthenticationFailure)?;
                key.verify(message, &sig).map_err(|_| JoseError::AuthenticationFailure)
            }
            Self::P256Private(_, key) => {
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| JoseError::AuthenticationFailure)?;
                p256::ecdsa::VerifyingKey::from(key)
                    .verify(message, &sig)
                    .map_err(|_| JoseError::AuthenticationFailure)
            }
            Self::P384Public(_, key) => {
                let sig = p384::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| JoseError::AuthenticationFailure)?;
                key.verify(message, &sig).map_err(|_| JoseError::AuthenticationFailure)
            }
            Self::P384Private(_, key) => {
                let sig = p384::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| JoseError::AuthenticationFailure)?;
                p384::ecdsa::VerifyingKey::from(key)
                    .verify(message, &sig)
                    .map_err(|_| JoseError::AuthenticationFailure)
            }
            Self::P521Public(_, key) => {
                let sig = p521::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| JoseError::AuthenticationFailure)?;
                key.verify(message, &sig).map_err(|_| JoseError::AuthenticationFailure)
            }
            Self::P521Private(_, key) => {
                let sig = p521::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| JoseError::AuthenticationFailure)?;
                p521::ecdsa::VerifyingKey::from(key)
                    .verify(message, &sig)
                    .map_err(|_| JoseError::AuthenticationFailure)
            }
        }
    }

    fn to_public_jwk(&self) -> ValueStorage {
        let mut jwk = ValueStorage::new();
        jwk.set("kty", "EC");
        jwk.set("crv", self.curve().as_str());
        if let Some(kid) = self.key_id() {
            jwk.set("kid", kid);
        }

        let (x, y): (Vec<u8>, Vec<u8>) = match self {
            Self::P256Public(_, key) => split_sec1(&key.to_encoded_point(false).as_bytes()),
            Self::P256Private(_, key) => {
                split_sec1(&p256::ecdsa::VerifyingKey::from(key).to_encoded_point(false).as_bytes())
            }
            Self::P384Public(_, key) => split_sec1(&key.to_encoded_point(false).as_bytes()),
            Self::P384Private(_, key) => {
                split_sec1(&p384::ecdsa::VerifyingKey::from(key).to_encoded_point(false).as_bytes())
            }
            Self::P521Public(_, key) => split_sec1(&key.to_encoded_point(false).as_bytes()),
            Self::P521Private(_, key) => {
                split_sec1(&p521::ecdsa::VerifyingKey::from(key).to_encoded_point(false).as_bytes())
            }
        };
        jwk.typed_set("x", Some(Base64Bytes(x)));
        jwk.typed_set("y", Some(Base64Bytes(y)));
        jwk
    }
}

/// Split an uncompressed SEC1 point (`0x04 || x || y`) into its `x`/`y`
/// halves.
fn split_sec1(point: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let coord_len = (point.len() - 1) / 2;
    (point[1..1 + coord_len].to_vec(), point[1 + coord_len..].to_vec())
}

impl SigningKey for EcKey {
    fn sign(&self, algorithm: Algorithm, message: &[u8]) -> Result<Vec<u8>> {
        if !self.supports(algorithm) {
            return Err(JoseError::Unsupported(algorithm.to_string()));
        }
        match self {
            Self::P256Private(_, key) => {
                let sig: p256::ecdsa::Signature = key.sign(message);
                Ok(sig.to_bytes().to_vec())
            }
            Self::P384Private(_, key) => {
                let sig: p384::ecdsa::Signature = key.sign(message);
                Ok(sig.to_bytes().to_vec())
            }
            Self::P521Private(_, key) => {
                let sig: p521::ecdsa::Signature = key.sign(message);
                Ok(sig.to_bytes().to_vec())
            }
            Self::P256Public(..) | Self::P384Public(..) | Self::P521Public(..) => {
                Err(JoseError::Unsupported(format!("{algorithm} requires a private EC key")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;

    #[test]
    fn es256_round_trip() {
        let signing = p256::ecdsa::SigningKey::random(&mut OsRng);
        let key = EcKey::P256Private(Some("ec-1".into()), signing);
        let sig = key.sign(Algorithm::Es256, b"hello").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(key.verify(Algorithm::Es256, b"hello", &sig).is_ok());
    }

    #[test]
    fn es384_has_96_byte_signature() {
        let signing = p384::ecdsa::SigningKey::random(&mut OsRng);
        let key = EcKey::P384Private(None, signing);
        let sig = key.sign(Algorithm::Es384, b"hello").unwrap();
        assert_eq!(sig.len(), 96);
    }

    #[test]
    fn es512_has_132_byte_signature() {
        let signing = p521::ecdsa::SigningKey::random(&mut OsRng);
        let key = EcKey::P521Private(None, signing);
        let sig = key.sign(Algorithm::Es512, b"hello").unwrap();
        assert_eq!(sig.len(), 132);
    }

    #[test]
    fn tampered_signature_fails() {
        let signing = p256::ecdsa::SigningKey::random(&mut OsRng);
        let key = EcKey::P256Private(None, signing);
        let mut sig = key.sign(Algorithm::Es256, b"hello").unwrap();
        sig[0] ^= 0xFF;
        assert!(matches!(
            key.verify(Algorithm::Es256, b"hello", &sig).unwrap_err(),
            JoseError::AuthenticationFailure
        ));
    }

    #[test]
    fn jwk_round_trip_preserves_point() {
        let signing = p256::ecdsa::SigningKey::random(&mut OsRng);
        let key = EcKey::P256Private(Some("ec-1".into()), signing);
        let jwk = key.to_public_jwk();
        let parsed = EcKey::from_jwk(&jwk, false).unwrap();
        let sig = key.sign(Algorithm::Es256, b"round trip").unwrap();
        assert!(parsed.verify(Algorithm::Es256, b"round trip", &sig).is_ok());
    }

    #[test]
    fn wrong_algorithm_for_curve_is_unsupported() {
        let signing = p256::ecdsa::SigningKey::random(&mut OsRng);
        let key = EcKey::P256Private(None, signing);
        assert!(matches!(
            key.sign(Algorithm::Es384, b"x").unwrap_err(),
            JoseError::Unsupported(_)
        ));
    }
}
