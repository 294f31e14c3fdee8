//! Error taxonomy shared by every component of the crate.
//!
//! Each variant corresponds to one of the design-level error kinds: a
//! caller can match on the kind without parsing a display string, which
//! matters most in [`crate::jws`]'s verification path where
//! `OperationNotAllowed` (an `alg=none` token) and `AuthenticationFailure`
//! (a bad signature) must never be confused.

use thiserror::Error;

/// Errors produced by the claim store, algorithm registry, key
/// abstraction, and JWS engine.
#[derive(Debug, Error)]
pub enum JoseError {
    /// Input bytes could not be parsed as any recognized JWS form, or a
    /// base64url/JSON payload was invalid.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Neither the protected nor unprotected header carried an `alg`.
    #[error("missing alg header parameter")]
    AlgorithmMissing,

    /// The `alg` header value is not present in the algorithm registry.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// No supplied key matched the required (algorithm, kid) pair.
    #[error("no key found for the requested algorithm/kid")]
    KeyNotFound,

    /// The operation is refused by policy, independent of key material.
    ///
    /// The sole built-in case is verifying a JWS whose `alg` is `none`.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),

    /// A signature failed to verify, or the JWS had no signatures at all.
    #[error("signature verification failed")]
    AuthenticationFailure,

    /// The key does not implement the requested algorithm.
    #[error("key does not support algorithm {0}")]
    Unsupported(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, JoseError>;
