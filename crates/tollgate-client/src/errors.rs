use thiserror::Error;
use tollgate_core::{IdentError, SigningError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("identify token error: {0}")]
    Ident(#[from] IdentError),

    #[error("region {0} is not supported")]
    UnsupportedRegion(String),

    /// Transport-level failure: network error, bad status, or a response
    /// body the API never produces. Kept distinct from signature errors.
    #[error("connection_error: {0}")]
    Connection(String),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serde JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}
