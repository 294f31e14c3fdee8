//! # JOSE Core
//!
//! Claim storage, algorithm registry, key abstraction and signing engine
//! for JSON Web Signature (RFC 7515), JSON Web Token (RFC 7519), and
//! OAuth 2.0 Demonstrating Proof of Possession (RFC 9449).
//!
//! The crate is organized bottom-up, each module depending only on the
//! ones before it:
//!
//! - [`error`] — the typed error enum every other module returns.
//! - [`codec`] — base64url, `NumericDate`, and DPoP's `htu` normalization.
//! - [`value`] — the open, schema-flexible claim store.
//! - [`alg`] — the process-wide algorithm registry.
//! - [`key`] — polymorphic signing/validating keys, one module per family.
//! - [`claims`] — typed views over [`value::ValueStorage`]: the JOSE header
//!   and the `aud`-style string-or-list helper.
//! - [`jwt`] — JWT registered claims.
//! - [`jws`] — the signing/verification engine.
//! - [`dpop`] — the DPoP claim profile and proof builder.

pub mod alg;
pub mod claims;
pub mod codec;
pub mod dpop;
pub mod error;
pub mod jws;
pub mod jwt;
pub mod key;
pub mod value;

pub use alg::Algorithm;
pub use claims::Header;
pub use dpop::DpopClaims;
pub use error::{JoseError, Result};
pub use jws::Jws;
pub use jwt::JwtClaims;
pub use key::{match_key, signing_key_from_jwk, validating_key_from_jwk, SigningKey, ValidatingKey};
pub use value::ValueStorage;
