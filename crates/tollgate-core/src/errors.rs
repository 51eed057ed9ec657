use thiserror::Error;

/// Errors raised by the request signer.
///
/// All of these are local, synchronous, deterministic failures. A normal
/// verification mismatch is *not* an error; [`crate::Signer::verify`]
/// returns `Ok(false)` for that.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("signing secret may not be empty")]
    EmptySecret,

    #[error("cannot safely compare against an empty reference digest")]
    EmptyDigest,

    #[error("signature must be a string or a single-element list")]
    MalformedSignature,

    #[error("HTTP method {0} is not supported")]
    UnsupportedMethod(String),
}

/// Errors raised by the identify-token signer.
#[derive(Debug, Error)]
pub enum IdentError {
    #[error("token key may not be empty")]
    EmptyKey,

    #[error("malformed token: {0}")]
    Malformed(&'static str),

    #[error("token signature verification failed")]
    InvalidSignature,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token claims to be issued in the future")]
    IssuedInFuture,

    #[error("token expired")]
    Expired,

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
