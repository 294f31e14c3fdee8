//! The algorithm registry (component C3): a process-wide map from JWS
//! `alg` identifier to the key family, curve, and hash function it
//! implies.
//!
//! Readers never block each other; a registration takes the exclusive
//! half of the lock. The default table is seeded lazily on first access,
//! mirroring how the rest of this crate's RustCrypto-family dependencies
//! expect callers to construct algorithm parameters once and reuse them.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};

/// The JOSE `alg` header values this crate dispatches on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// The `none` algorithm: an empty signature. Verification of `none`
    /// is always refused; see [`crate::jws`].
    #[default]
    #[serde(rename = "none")]
    None,
    /// HMAC using SHA-256.
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC using SHA-384.
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC using SHA-512.
    #[serde(rename = "HS512")]
    Hs512,
    /// RSASSA-PKCS1-v1_5 using SHA-256.
    #[serde(rename = "RS256")]
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    #[serde(rename = "RS384")]
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    #[serde(rename = "RS512")]
    Rs512,
    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256.
    #[serde(rename = "PS256")]
    Ps256,
    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384.
    #[serde(rename = "PS384")]
    Ps384,
    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512.
    #[serde(rename = "PS512")]
    Ps512,
    /// ECDSA using P-256 and SHA-256.
    #[serde(rename = "ES256")]
    Es256,
    /// ECDSA using P-384 and SHA-384.
    #[serde(rename = "ES384")]
    Es384,
    /// ECDSA using P-521 and SHA-512.
    #[serde(rename = "ES512")]
    Es512,
    /// EdDSA using Ed25519.
    #[serde(rename = "EdDSA")]
    EdDsa,
}

impl Algorithm {
    /// The IANA `alg` identifier string, e.g. `"ES256"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
            Self::EdDsa => "EdDSA",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The broad key family an algorithm is implemented over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFamily {
    /// A shared secret (HMAC).
    Symmetric,
    /// An RSA key pair.
    Rsa,
    /// An elliptic-curve key pair (ECDSA or EdDSA).
    EllipticCurve,
}

/// The elliptic curve an EC algorithm or key uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256, used by ES256.
    P256,
    /// NIST P-384, used by ES384.
    P384,
    /// NIST P-521, used by ES512.
    P521,
    /// Ed25519, used by EdDSA.
    Ed25519,
}

impl Curve {
    /// The JWK `crv` identifier, per RFC 7518 / RFC 8037.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
            Self::Ed25519 => "Ed25519",
        }
    }
}

/// The hash function an algorithm uses, where applicable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hash {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

/// The signature encoding an algorithm produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureForm {
    /// An empty signature (`alg=none`).
    Empty,
    /// Raw HMAC output bytes.
    Hmac,
    /// RSASSA-PKCS1-v1_5.
    RsaPkcs1,
    /// RSASSA-PSS, salt length equal to the hash length.
    RsaPss,
    /// Fixed-width `r||s` concatenation (not DER).
    EcdsaRaw {
        /// Width in bytes of a single `r` or `s` component.
        component_len: usize,
    },
    /// 64-byte Ed25519 signature.
    Ed25519,
}

/// One row of the algorithm registry: everything needed to locate a
/// compatible key and dispatch to the right crypto primitive.
#[derive(Clone, Copy, Debug)]
pub struct Registration {
    /// The algorithm this registration describes.
    pub algorithm: Algorithm,
    /// The key family the algorithm is implemented over.
    pub key_family: KeyFamily,
    /// The curve, for elliptic-curve algorithms.
    pub curve: Option<Curve>,
    /// The hash function, where applicable.
    pub hash: Option<Hash>,
    /// The wire signature encoding.
    pub signature_form: SignatureForm,
}

fn default_table() -> HashMap<String, Registration> {
    let mut table = HashMap::new();
    let mut insert = |registration: Registration| {
        table.insert(registration.algorithm.as_str().to_string(), registration);
    };

    insert(Registration {
        algorithm: Algorithm::None,
        key_family: KeyFamily::Symmetric,
        curve: None,
        hash: None,
        signature_form: SignatureForm::Empty,
    });

    for (algorithm, hash) in [
        (Algorithm::Hs256, Hash::Sha256),
        (Algorithm::Hs384, Hash::Sha384),
        (Algorithm::Hs512, Hash::Sha512),
    ] {
        insert(Registration {
            algorithm,
            key_family: KeyFamily::Symmetric,
            curve: None,
            hash: Some(hash),
            signature_form: SignatureForm::Hmac,
        });
    }

    for (algorithm, hash) in [
        (Algorithm::Rs256, Hash::Sha256),
        (Algorithm::Rs384, Hash::Sha384),
        (Algorithm::Rs512, Hash::Sha512),
    ] {
        insert(Registration {
            algorithm,
            key_family: KeyFamily::Rsa,
            curve: None,
            hash: Some(hash),
            signature_form: SignatureForm::RsaPkcs1,
        });
    }

    for (algorithm, hash) in [
        (Algorithm::Ps256, Hash::Sha256),
        (Algorithm::Ps384, Hash::Sha384),
        (Algorithm::Ps512, Hash::Sha512),
    ] {
        insert(Registration {
            algorithm,
            key_family: KeyFamily::Rsa,
            curve: None,
            hash: Some(hash),
            signature_form: SignatureForm::RsaPss,
        });
    }

    insert(Registration {
        algorithm: Algorithm::Es256,
        key_family: KeyFamily::EllipticCurve,
        curve: Some(Curve::P256),
        hash: Some(Hash::Sha256),
        signature_form: SignatureForm::EcdsaRaw { component_len: 32 },
    });
    insert(Registration {
        algorithm: Algorithm::Es384,
        key_family: KeyFamily::EllipticCurve,
        curve: Some(Curve::P384),
        hash: Some(Hash::Sha384),
        signature_form: SignatureForm::EcdsaRaw { component_len: 48 },
    });
    insert(Registration {
        algorithm: Algorithm::Es512,
        key_family: KeyFamily::EllipticCurve,
        curve: Some(Curve::P521),
        hash: Some(Hash::Sha512),
        signature_form: SignatureForm::EcdsaRaw { component_len: 66 },
    });
    insert(Registration {
        algorithm: Algorithm::EdDsa,
        key_family: KeyFamily::EllipticCurve,
        curve: Some(Curve::Ed25519),
        hash: None,
        signature_form: SignatureForm::Ed25519,
    });

    table
}

fn registry() -> &'static RwLock<HashMap<String, Registration>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Registration>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(default_table()))
}

/// Look up the registration for `id` (e.g. `"ES256"`).
#[must_use]
pub fn lookup(id: &str) -> Option<Registration> {
    registry().read().expect("algorithm registry lock poisoned").get(id).copied()
}

/// Register (or overwrite) `registration` under its algorithm's id
/// string. Takes the exclusive half of the registry lock.
pub fn register(registration: Registration) {
    let mut table = registry().write().expect("algorithm registry lock poisoned");
    table.insert(registration.algorithm.as_str().to_string(), registration);
}

/// All currently-registered algorithm id strings, in unspecified order.
#[must_use]
pub fn registered_ids() -> Vec<String> {
    registry().read().expect("algorithm registry lock poisoned").keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_spec_algorithm() {
        for id in [
            "none", "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "PS256", "PS384",
            "PS512", "ES256", "ES384", "ES512", "EdDSA",
        ] {
            assert!(lookup(id).is_some(), "missing default registration for {id}");
        }
    }

    #[test]
    fn es256_has_32_byte_components() {
        let registration = lookup("ES256").unwrap();
        assert_eq!(registration.curve, Some(Curve::P256));
        assert_eq!(registration.signature_form, SignatureForm::EcdsaRaw { component_len: 32 });
    }

    #[test]
    fn registering_new_algorithm_does_not_disturb_defaults() {
        register(Registration {
            algorithm: Algorithm::Hs256,
            key_family: KeyFamily::Symmetric,
            curve: None,
            hash: Some(Hash::Sha256),
            signature_form: SignatureForm::Hmac,
        });
        assert!(lookup("ES256").is_some());
        assert!(registered_ids().len() >= 14);
    }
}
