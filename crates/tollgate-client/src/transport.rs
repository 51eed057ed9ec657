use http::HeaderMap;
use tollgate_core::Method;
use url::Url;

/// A fully prepared API request: verb, signed URL, and headers.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

/// Capability interface for sending prepared requests.
///
/// Anything that can send a method+URL+headers and hand back the raw
/// response body can be plugged into [`crate::Client`]; the signing core
/// never knows which implementation is active.
pub trait Transport {
    type Error: std::error::Error;

    fn send(&self, request: TransportRequest) -> impl Future<Output = Result<String, Self::Error>>;
}
