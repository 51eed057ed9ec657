//! Client for the Tollgate paywall/metering API.
//!
//! Builds signed URLs for the dialog and purchase endpoints, keeps the
//! opaque session token the service hands out, and talks to the API over a
//! pluggable [`Transport`]. All signing lives in `tollgate-core`; this
//! crate is the outer shell around it.

pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod transports;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, Endpoints, Region};
pub use errors::ClientError;
pub use transport::{Transport, TransportRequest};
pub use transports::HttpTransport;
pub use types::{AccessResponse, AccountLinks, ArticleAccess, PurchaseOptions, Record, SaleModel};

pub use tollgate_core::{Method, ParamValue, Params, Signer, SigningConfig};
