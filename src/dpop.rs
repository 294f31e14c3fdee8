//! The DPoP claim profile (RFC 9449 §4.2, component C7): the DPoP-proof
//! claim set, `htu` normalization, and building/verifying a DPoP proof
//! as a JWS whose payload is that claim set.

use sha2::{Digest, Sha256};

use crate::claims::Header;
use crate::codec::{base64url_encode, normalize_dpop_target_uri, NumericDate};
use crate::error::{JoseError, Result};
use crate::jws::Jws;
use crate::key::SigningKey;
use crate::value::ValueStorage;

/// The media type a DPoP proof's protected header carries in `typ`.
pub const DPOP_TYP: &str = "dpop+jwt";

/// The six DPoP registered claims (RFC 9449 §4.2).
#[derive(Clone, Debug, Default)]
pub struct DpopClaims {
    storage: ValueStorage,
}

impl DpopClaims {
    /// An empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self { storage: ValueStorage::new() }
    }

    /// Wrap an existing storage map as a DPoP claim set.
    #[must_use]
    pub fn from_storage(storage: ValueStorage) -> Self {
        Self { storage }
    }

    /// Consume the claim set, returning its underlying storage.
    #[must_use]
    pub fn into_storage(self) -> ValueStorage {
        self.storage
    }

    /// Borrow the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &ValueStorage {
        &self.storage
    }

    /// The `jti` (unique proof identifier) claim.
    #[must_use]
    pub fn jwt_id(&self) -> Option<String> {
        self.storage.typed_get("jti")
    }

    /// Set the `jti` claim.
    pub fn set_jwt_id(&mut self, jti: impl Into<String>) {
        self.storage.typed_set("jti", Some(jti.into()));
    }

    /// The `htm` (HTTP method) claim.
    #[must_use]
    pub fn http_method(&self) -> Option<String> {
        self.storage.typed_get("htm")
    }

    /// Set the `htm` claim.
    pub fn set_http_method(&mut self, method: impl Into<String>) {
        self.storage.typed_set("htm", Some(method.into()));
    }

    /// The `htu` (normalized HTTP target URI) claim.
    #[must_use]
    pub fn http_target_uri(&self) -> Option<String> {
        self.storage.typed_get("htu")
    }

    /// Set the `htu` claim, normalizing `uri` per RFC 9449 §4.2 first.
    ///
    /// # Errors
    /// [`JoseError::MalformedInput`] if `uri` is not an absolute URI.
    pub fn set_http_target_uri(&mut self, uri: &str) -> Result<()> {
        let normalized = normalize_dpop_target_uri(uri)
            .ok_or_else(|| JoseError::MalformedInput(format!("not an absolute URI: {uri}")))?;
        self.storage.typed_set("htu", Some(normalized));
        Ok(())
    }

    /// The `iat` (issued-at) claim.
    #[must_use]
    pub fn issued_at(&self) -> Option<NumericDate> {
        self.storage.typed_get("iat")
    }

    /// Set the `iat` claim.
    pub fn set_issued_at(&mut self, issued_at: NumericDate) {
        self.storage.typed_set("iat", Some(issued_at));
    }

    /// The `ath` (access token hash) claim.
    #[must_use]
    pub fn access_token_hash(&self) -> Option<String> {
        self.storage.typed_get("ath")
    }

    /// Set the `ath` claim directly from a precomputed hash string.
    pub fn set_access_token_hash(&mut self, ath: Option<impl Into<String>>) {
        self.storage.typed_set("ath", ath.map(Into::into));
    }

    /// Set the `ath` claim by hashing `access_token`'s ASCII bytes with
    /// SHA-256 and base64url-encoding the digest, per RFC 9449 §4.2.
    pub fn set_access_token(&mut self, access_token: &str) {
        let digest = Sha256::digest(access_token.as_bytes());
        self.set_access_token_hash(Some(base64url_encode(&digest)));
    }

    /// The `nonce` (server-provided anti-replay nonce) claim.
    #[must_use]
    pub fn nonce(&self) -> Option<String> {
        self.storage.typed_get("nonce")
    }

    /// Set the `nonce` claim.
    pub fn set_nonce(&mut self, nonce: Option<impl Into<String>>) {
        self.storage.typed_set("nonce", nonce.map(Into::into));
    }
}

/// Build a DPoP proof: a compact-form JWS whose protected header carries
/// `typ=dpop+jwt`, `alg`, and the public key matching `key`, and whose
/// payload is `claims`.
///
/// # Errors
/// Propagates [`crate::jws`]'s signing errors, notably
/// [`JoseError::Unsupported`] if `key` cannot sign under `algorithm`.
pub fn create_proof(
    key: &dyn SigningKey, algorithm: crate::alg::Algorithm, claims: &DpopClaims,
) -> Result<String> {
    let mut header = Header::new();
    header.set_algorithm(algorithm);
    header.set_typ(Some(DPOP_TYP));
    header.set_jwk(Some(key.to_public_jwk()));

    let jws = Jws::sign_single(header, claims.storage().encode(), key)?;
    jws.to_compact()
}

/// Decode and verify a DPoP proof, returning its claim set.
///
/// This only checks the cryptographic signature and the `typ`/`jwk`
/// shape; binding checks (the proof's `jwk` matches the presented access
/// token, the `htm`/`htu` match the request, the `iat` is recent, and
/// `jti` replay) are the caller's responsibility — see §4.7's "policy
/// checks... are external".
///
/// # Errors
/// [`JoseError::MalformedInput`] if `proof` isn't a well-formed compact
/// JWS, or its protected header is missing `typ=dpop+jwt`/`jwk`;
/// propagates [`crate::jws`]'s verification errors otherwise.
pub fn verify_proof(proof: &str) -> Result<DpopClaims> {
    let jws = Jws::from_compact(proof)?;
    let protected = jws.protected_header(0)?;
    if protected.typ().as_deref() != Some(DPOP_TYP) {
        return Err(JoseError::MalformedInput("DPoP proof missing typ=dpop+jwt".into()));
    }
    let jwk = protected
        .jwk()
        .ok_or_else(|| JoseError::MalformedInput("DPoP proof missing embedded jwk".into()))?;
    let key = crate::key::validating_key_from_jwk(&jwk)?;
    jws.verify(&[key.as_ref()])?;

    let payload = jws.payload_storage()?;
    Ok(DpopClaims::from_storage(payload))
}
