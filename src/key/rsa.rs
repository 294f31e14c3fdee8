//! RSA keys: RSASSA-PKCS1-v1_5 (RS256/384/512) and RSASSA-PSS
//! (PS256/384/512).

use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature as Pkcs1Signature, SigningKey as Pkcs1SigningKey, VerifyingKey as Pkcs1VerifyingKey};
use rsa::pss::{Signature as PssSignature, SigningKey as PssSigningKey, VerifyingKey as PssVerifyingKey};
use rsa::signature::{RandomizedSigner, Signer as _, SignatureEncoding, Verifier as _};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};

use super::{SigningKey, ValidatingKey};
use crate::alg::Algorithm;
use crate::error::{JoseError, Result};
use crate::value::{Base64Bytes, ValueStorage};

/// Generate the pkcs1v15/pss sign and verify helpers for one hash.
macro_rules! rsa_hash_ops {
    ($digest:ty, $pkcs1_sign:ident, $pkcs1_verify:ident, $pss_sign:ident, $pss_verify:ident) => {
        fn $pkcs1_sign(key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
            let signing_key = Pkcs1SigningKey::<$digest>::new(key.clone());
            let signature = signing_key
                .try_sign(message)
                .map_err(|e| JoseError::MalformedInput(format!("RSA signing failed: {e}")))?;
            Ok(signature.to_bytes().to_vec())
        }

        fn $pkcs1_verify(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
            let verifying_key = Pkcs1VerifyingKey::<$digest>::new(key.clone());
            let signature = Pkcs1Signature::try_from(signature)
                .map_err(|_| JoseError::AuthenticationFailure)?;
            verifying_key.verify(message, &signature).map_err(|_| JoseError::AuthenticationFailure)
        }

        fn $pss_sign(key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
            let signing_key = PssSigningKey::<$digest>::new(key.clone());
            let signature = signing_key.sign_with_rng(&mut OsRng, message);
            Ok(signature.to_bytes().to_vec())
        }

        fn $pss_verify(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
            let verifying_key = PssVerifyingKey::<$digest>::new(key.clone());
            let signature = PssSignature::try_from(signature)
                .map_err(|_| JoseError::AuthenticationFailure)?;
            verifying_key.verify(message, &signature).map_err(|_| JoseError::AuthenticationFailure)
        }
    };
}

rsa_hash_ops!(Sha256, pkcs1_sign_256, pkcs1_verify_256, pss_sign_256, pss_verify_256);
rsa_hash_ops!(Sha384, pkcs1_sign_384, pkcs1_verify_384, pss_sign_384, pss_verify_384);
rsa_hash_ops!(Sha512, pkcs1_sign_512, pkcs1_verify_512, pss_sign_512, pss_verify_512);

/// An RSA key, with or without the private components.
pub enum RsaKey {
    /// Verify-only: the public modulus and exponent.
    Public {
        /// The key's `kid`, if any.
        kid: Option<String>,
        /// The public key.
        key: RsaPublicKey,
    },
    /// Sign-and-verify: the full private key.
    Private {
        /// The key's `kid`, if any.
        kid: Option<String>,
        /// The private key.
        key: RsaPrivateKey,
    },
}

impl RsaKey {
    fn public_key(&self) -> RsaPublicKey {
        match self {
            Self::Public { key, .. } => key.clone(),
            Self::Private { key, .. } => key.to_public_key(),
        }
    }

    /// Parse a `kty=RSA` JWK. When `want_private` is `true`, the private
    /// exponent and primes must be present.
    ///
    /// # Errors
    /// [`JoseError::MalformedInput`] if required components are missing
    /// or do not form a valid key.
    pub fn from_jwk(jwk: &ValueStorage, want_private: bool) -> Result<Self> {
        let kid = jwk.typed_get("kid");
        let n: Base64Bytes =
            jwk.typed_get("n").ok_or_else(|| JoseError::MalformedInput("RSA JWK missing n".into()))?;
        let e: Base64Bytes =
            jwk.typed_get("e").ok_or_else(|| JoseError::MalformedInput("RSA JWK missing e".into()))?;
        let n = BigUint::from_bytes_be(&n.0);
        let e = BigUint::from_bytes_be(&e.0);

        if want_private {
            let d: Base64Bytes = jwk
                .typed_get("d")
                .ok_or_else(|| JoseError::MalformedInput("RSA JWK missing private exponent d".into()))?;
            let p: Base64Bytes =
                jwk.typed_get("p").ok_or_else(|| JoseError::MalformedInput("RSA JWK missing prime p".into()))?;
            let q: Base64Bytes =
                jwk.typed_get("q").ok_or_else(|| JoseError::MalformedInput("RSA JWK missing prime q".into()))?;
            let key = RsaPrivateKey::from_components(
                n,
                e,
                BigUint::from_bytes_be(&d.0),
                vec![BigUint::from_bytes_be(&p.0), BigUint::from_bytes_be(&q.0)],
            )
            .map_err(|e| JoseError::MalformedInput(format!("invalid RSA private key: {e}")))?;
            Ok(Self::Private { kid, key })
        } else {
            let key = RsaPublicKey::new(n, e)
                .map_err(|e| JoseError::MalformedInput(format!("invalid RSA public key: {e}")))?;
            Ok(Self::Public { kid, key })
        }
    }
}

impl ValidatingKey for RsaKey {
    fn key_id(&self) -> Option<&str> {
        match self {
            Self::Public { kid, .. } | Self::Private { kid, .. } => kid.as_deref(),
        }
    }

    fn supports(&self, algorithm: Algorithm) -> bool {
        matches!(
            algorithm,
            Algorithm::Rs256
                | Algorithm::Rs384
                | Algorithm::Rs512
                | Algorithm::Ps256
                | Algorithm::Ps384
                | Algorithm::Ps512
        )
    }

    fn verify(&self, algorithm: Algorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        let key = self.public_key();
        match algorithm {
            Algorithm::Rs256 => pkcs1_verify_256(&key, message, signature),
            Algorithm::Rs384 => pkcs1_verify_384(&key, message, signature),
            Algorithm::Rs512 => pkcs1_verify_512(&key, message, signature),
            Algorithm::Ps256 => pss_verify_256(&key, message, signature),
            Algorithm::Ps384 => pss_verify_384(&key, message, signature),
            Algorithm::Ps512 => pss_verify_512(&key, message, signature),
            other => Err(JoseError::Unsupported(other.to_string())),
        }
    }

    fn to_public_jwk(&self) -> ValueStorage {
        let key = self.public_key();
        let mut jwk = ValueStorage::new();
        jwk.set("kty", "RSA");
        jwk.typed_set("n", Some(Base64Bytes(key.n().to_bytes_be())));
        jwk.typed_set("e", Some(Base64Bytes(key.e().to_bytes_be())));
        if let Some(kid) = self.key_id() {
            jwk.set("kid", kid);
        }
        jwk
    }
}

impl SigningKey for RsaKey {
    fn sign(&self, algorithm: Algorithm, message: &[u8]) -> Result<Vec<u8>> {
        let Self::Private { key, .. } = self else {
            return Err(JoseError::Unsupported(format!("{algorithm} requires a private RSA key")));
        };
        match algorithm {
            Algorithm::Rs256 => pkcs1_sign_256(key, message),
            Algorithm::Rs384 => pkcs1_sign_384(key, message),
            Algorithm::Rs512 => pkcs1_sign_512(key, message),
            Algorithm::Ps256 => pss_sign_256(key, message),
            Algorithm::Ps384 => pss_sign_384(key, message),
            Algorithm::Ps512 => pss_sign_512(key, message),
            other => Err(JoseError::Unsupported(other.to_string())),
        }
    }
}
