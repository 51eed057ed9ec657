//! Request canonicalization and HMAC signing for the Tollgate metering API.
//!
//! This crate is the pure, synchronous core of the client: it turns an
//! arbitrary parameter set, a target URL, and an HTTP verb into one
//! deterministic message, signs it with the merchant's API key, and checks
//! signatures on incoming callbacks. The companion [`ident`] module carries
//! the simpler HS256 token signer used by the identify flow.

pub mod canonical;
pub mod errors;
pub mod ident;
pub mod method;
pub mod params;
pub mod signing;

pub use errors::{IdentError, SigningError};
pub use method::Method;
pub use params::{ParamValue, Params};
pub use signing::{Signer, SigningConfig};
