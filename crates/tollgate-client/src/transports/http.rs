use http::Method as HttpMethod;
use tollgate_core::Method;

use crate::transport::{Transport, TransportRequest};

/// Default transport backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured reqwest client (custom TLS, proxies, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

impl Transport for HttpTransport {
    type Error = HttpTransportError;

    async fn send(&self, request: TransportRequest) -> Result<String, HttpTransportError> {
        let response = self
            .client
            .request(to_http_method(request.method), request.url)
            .headers(request.headers)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpTransportError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

fn to_http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::GET,
        Method::Head => HttpMethod::HEAD,
        Method::Post => HttpMethod::POST,
        Method::Put => HttpMethod::PUT,
        Method::Delete => HttpMethod::DELETE,
        Method::Patch => HttpMethod::PATCH,
    }
}
