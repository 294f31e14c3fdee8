//! JWT registered claims (RFC 7519 §4.1): a thin typed view over
//! [`ValueStorage`].

use crate::claims::StringOrList;
use crate::codec::NumericDate;
use crate::value::ValueStorage;

/// The seven JWT registered claims, plus whatever private/public claims
/// a caller also wrote into the underlying storage.
#[derive(Clone, Debug, Default)]
pub struct JwtClaims {
    storage: ValueStorage,
}

impl JwtClaims {
    /// An empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self { storage: ValueStorage::new() }
    }

    /// Wrap an existing storage map as a JWT claim set.
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

    /// Mutably borrow the underlying storage, for private claims.
    pub fn storage_mut(&mut self) -> &mut ValueStorage {
        &mut self.storage
    }

    /// The `iss` (issuer) claim.
    #[must_use]
    pub fn issuer(&self) -> Option<String> {
        self.storage.typed_get("iss")
    }

    /// Set the `iss` claim.
    pub fn set_issuer(&mut self, issuer: Option<impl Into<String>>) {
        self.storage.typed_set("iss", issuer.map(Into::into));
    }

    /// The `sub` (subject) claim.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.storage.typed_get("sub")
    }

    /// Set the `sub` claim.
    pub fn set_subject(&mut self, subject: Option<impl Into<String>>) {
        self.storage.typed_set("sub", subject.map(Into::into));
    }

    /// The `aud` (audience) claim, which may have been stored as either a
    /// single string or a list of strings.
    #[must_use]
    pub fn audience(&self) -> Option<Vec<String>> {
        self.storage.typed_get::<StringOrList>("aud").map(|v| v.0)
    }

    /// Set the `aud` claim. An empty list removes the claim.
    pub fn set_audience(&mut self, audience: Vec<String>) {
        if audience.is_empty() {
            self.storage.remove("aud");
        } else {
            self.storage.typed_set("aud", Some(StringOrList(audience)));
        }
    }

    /// The `exp` (expiration time) claim.
    #[must_use]
    pub fn expiration(&self) -> Option<NumericDate> {
        self.storage.typed_get("exp")
    }

    /// Set the `exp` claim.
    pub fn set_expiration(&mut self, expiration: Option<NumericDate>) {
        self.storage.typed_set("exp", expiration);
    }

    /// The `nbf` (not-before) claim.
    #[must_use]
    pub fn not_before(&self) -> Option<NumericDate> {
        self.storage.typed_get("nbf")
    }

    /// Set the `nbf` claim.
    pub fn set_not_before(&mut self, not_before: Option<NumericDate>) {
        self.storage.typed_set("nbf", not_before);
    }

    /// The `iat` (issued-at) claim.
    #[must_use]
    pub fn issued_at(&self) -> Option<NumericDate> {
        self.storage.typed_get("iat")
    }

    /// Set the `iat` claim.
    pub fn set_issued_at(&mut self, issued_at: Option<NumericDate>) {
        self.storage.typed_set("iat", issued_at);
    }

    /// The `jti` (JWT ID) claim.
    #[must_use]
    pub fn jwt_id(&self) -> Option<String> {
        self.storage.typed_get("jti")
    }

    /// Set the `jti` claim.
    pub fn set_jwt_id(&mut self, jti: Option<impl Into<String>>) {
        self.storage.typed_set("jti", jti.map(Into::into));
    }
}
