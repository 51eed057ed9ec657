//! The API client: signed URL builders, session-token bookkeeping, and the
//! `/access` and health calls.

use http::{HeaderMap, HeaderValue};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tollgate_core::{Method, Params, Signer, canonical, ident};
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, Endpoints, Region};
use crate::errors::ClientError;
use crate::transport::{Transport, TransportRequest};
use crate::transports::HttpTransport;
use crate::types::{AccessResponse, AccountLinks, PurchaseOptions};

/// Version of the server API spoken by this client.
const API_VERSION: &str = "2";
/// User-Agent header sent with every API call.
const USER_AGENT: &str = concat!("tollgate-client-rs/", env!("CARGO_PKG_VERSION"));

/// Client for one merchant account.
///
/// Owns the signing secret for its whole lifetime and keeps the session
/// token the service hands out. The transport is injected; see
/// [`Client::with_transport`].
pub struct Client<T = HttpTransport> {
    config: ClientConfig,
    endpoints: Endpoints,
    signer: Signer,
    transport: T,
    token: Option<String>,
}

impl Client<HttpTransport> {
    /// Create a client using the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> Client<T> {
    /// Create a client with an injected transport.
    ///
    /// # Errors
    ///
    /// Rejects an empty API key via
    /// [`SigningError::EmptySecret`](tollgate_core::SigningError::EmptySecret).
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        let signer = Signer::new(config.api_key.as_str())?;
        let endpoints = config.region.endpoints(config.sandbox);
        Ok(Client {
            config,
            endpoints,
            signer,
            transport,
            token: None,
        })
    }

    pub fn merchant_id(&self) -> &str {
        &self.config.merchant_id
    }

    pub fn region(&self) -> Region {
        self.config.region
    }

    pub fn is_sandbox(&self) -> bool {
        self.config.sandbox
    }

    /// Current session token, if one has been acquired.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Name under which callers persist the session token.
    pub fn token_name(&self) -> &str {
        &self.config.token_name
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn access_url(&self) -> String {
        format!("{}/access", self.endpoints.root)
    }

    pub fn token_url(&self) -> String {
        format!("{}/gettoken", self.endpoints.root)
    }

    pub fn health_url(&self) -> String {
        format!("{}/validatesignature", self.endpoints.root)
    }

    /// Sign and encode request parameters for an arbitrary endpoint.
    pub fn signed_query(&self, params: &Params, url: &str, method: Method) -> String {
        self.signer.signed_query(params, url, method)
    }

    /// URL that redirects the user to the token endpoint and back.
    pub fn token_redirect_url(&self, return_url: &str) -> String {
        let url = self.token_url();
        let params = Params::new()
            .with("redir", return_url)
            .with("cp", self.config.merchant_id.as_str());
        let query = self.signer.signed_query(&params, &url, Method::Get);
        format!("{url}?{query}")
    }

    /// URL of the identify dialog, carrying a signed identify token.
    pub fn identify_url(&self, return_url: &str, content_ids: &[&str]) -> Result<String, ClientError> {
        let mut claims = serde_json::Map::new();
        claims.insert("back".to_owned(), Value::from(return_url));
        claims.insert(
            "ids".to_owned(),
            Value::from(content_ids.iter().map(|id| Value::from(*id)).collect::<Vec<_>>()),
        );
        let token = ident::encode(&self.config.api_key, &claims)?;
        Ok(format!(
            "{}/ident/{}/{token}",
            self.endpoints.dialog, self.config.merchant_id
        ))
    }

    /// URL of the balance control iframe.
    pub fn controls_balance_url(&self, forcelang: Option<&str>) -> String {
        let mut params = Params::new().with("cp", self.config.merchant_id.as_str());
        if let Some(lang) = forcelang {
            params.insert("forcelang", lang);
        }
        params.insert("xdmprefix", xdm_prefix());

        let url = format!("{}/controls/balance", self.endpoints.dialog);
        let query = self.signer.signed_query(&params, &url, Method::Get);
        format!("{url}?{query}")
    }

    /// URL of the account-links control iframe.
    pub fn account_links_url(&self, links: &AccountLinks) -> String {
        let mut params = Params::new().with("cp", self.config.merchant_id.as_str());
        if let Some(next) = &links.next_url {
            params.insert("next", next);
        }
        if let Some(lang) = &links.forcelang {
            params.insert("forcelang", lang);
        }
        if let Some(css) = &links.css_url {
            params.insert("css", css);
        }
        if let Some(show) = &links.show {
            params.insert("show", show);
        }
        if links.jsevents {
            params.insert("jsevents", "1");
        }
        params.insert("xdmprefix", xdm_prefix());

        let url = format!("{}/controls/links", self.endpoints.dialog);
        let query = self.signer.signed_query(&params, &url, Method::Get);
        format!("{url}?{query}")
    }

    /// URL of the login form, wrapped for the dialog API.
    pub fn login_dialog_url(&self, return_url: &str, jsevents: bool) -> String {
        self.account_dialog_url("login", return_url, jsevents)
    }

    /// URL of the signup form, wrapped for the dialog API.
    pub fn signup_dialog_url(&self, return_url: &str, jsevents: bool) -> String {
        self.account_dialog_url("signup", return_url, jsevents)
    }

    /// URL that logs the user out, wrapped for the dialog API.
    pub fn logout_dialog_url(&self, return_url: &str, jsevents: bool) -> String {
        self.account_dialog_url("logout", return_url, jsevents)
    }

    /// Purchase URL for immediately settled sales.
    pub fn buy_url(&self, params: &Params, options: &PurchaseOptions) -> String {
        self.web_url(params, "buy", options)
    }

    /// Purchase URL for tab-based sales.
    pub fn add_url(&self, params: &Params, options: &PurchaseOptions) -> String {
        self.web_url(params, "add", options)
    }

    /// Purchase URL for subscriptions.
    pub fn subscribe_url(&self, params: &Params, options: &PurchaseOptions) -> String {
        self.web_url(params, "subscribe", options)
    }

    /// Donation URL; the sale model picks the endpoint variant.
    pub fn donate_url(&self, params: &Params, options: &PurchaseOptions) -> String {
        self.web_url(params, &format!("donate/{}", options.model.endpoint_suffix()), options)
    }

    /// Contribution URL; the sale model picks the endpoint variant.
    pub fn contribute_url(&self, params: &Params, options: &PurchaseOptions) -> String {
        self.web_url(
            params,
            &format!("contribute/{}", options.model.endpoint_suffix()),
            options,
        )
    }

    /// Check whether the user behind the current session token has access
    /// to the given articles.
    ///
    /// Without a token or without ids there is nothing to ask; the call
    /// short-circuits to an empty response.
    pub async fn get_access(
        &mut self,
        article_ids: &[&str],
        product_key: Option<&str>,
    ) -> Result<AccessResponse, ClientError> {
        let Some(token) = self.token.clone() else {
            debug!("no session token, skipping access call");
            return Ok(AccessResponse::default());
        };
        if article_ids.is_empty() {
            return Ok(AccessResponse::default());
        }

        let mut params = Params::new()
            .with("token", token)
            .with("cp", self.config.merchant_id.as_str())
            .with("article_id", article_ids.to_vec());
        if let Some(product) = product_key {
            params.insert("product", product);
        }

        let url = self.access_url();
        self.request(&url, &params, Method::Get).await
    }

    /// Probe the signature-validation endpoint. True iff the round trip
    /// succeeds; a single attempt, no retries.
    pub async fn check_health(&self) -> bool {
        let url = self.health_url();
        let params = Params::new()
            .with("salt", random_hex(32))
            .with("cp", self.config.merchant_id.as_str());
        let query = self.signer.signed_query(&params, &url, Method::Get);

        let Ok(target) = Url::parse(&format!("{url}?{query}")) else {
            return false;
        };
        let request = TransportRequest {
            method: Method::Get,
            url: target,
            headers: default_headers(),
        };
        match self.transport.send(request).await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    /// Sign, send, decode, and run token bookkeeping for one API call.
    async fn request<R: DeserializeOwned>(
        &mut self,
        url: &str,
        params: &Params,
        method: Method,
    ) -> Result<R, ClientError> {
        let query = self.signer.signed_query(params, url, method);
        let target = Url::parse(&format!("{url}?{query}"))?;
        debug!(url = %target, method = %method, "sending signed API request");

        let request = TransportRequest {
            method,
            url: target,
            headers: default_headers(),
        };
        let body = self
            .transport
            .send(request)
            .await
            .map_err(|err| ClientError::Connection(err.to_string()))?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|_| ClientError::Connection("undecodable response body".to_owned()))?;
        let (token_invalid, new_token) = match value.as_object() {
            Some(object) if !object.is_empty() => (
                object.get("status").and_then(Value::as_str) == Some("invalid_token"),
                object.get("new_token").and_then(Value::as_str).map(str::to_owned),
            ),
            _ => return Err(ClientError::Connection("empty response body".to_owned())),
        };

        if token_invalid {
            debug!("server reported an invalid session token");
            self.clear_token();
        }
        if let Some(token) = new_token {
            self.set_token(token);
        }

        Ok(serde_json::from_value(value)?)
    }

    fn account_dialog_url(&self, action: &str, return_url: &str, jsevents: bool) -> String {
        let aux = if jsevents { "&jsevents=1" } else { "" };
        let target = format!(
            "{}/account/dialog/{action}?next={}{aux}&cp={}",
            self.endpoints.dialog,
            canonical::raw_encode(return_url),
            self.config.merchant_id
        );
        self.dialog_api_url(&target)
    }

    fn dialog_api_url(&self, target: &str) -> String {
        format!(
            "{}/dialog-api?url={}",
            self.endpoints.dialog,
            canonical::raw_encode(target)
        )
    }

    fn web_url(&self, params: &Params, endpoint: &str, options: &PurchaseOptions) -> String {
        let mut params = params.clone();
        if !params.contains("cp") {
            params.insert("cp", self.config.merchant_id.as_str());
        }
        // The dialog must always hand the session token back.
        params.insert("return_token", "1");
        if options.jsevents {
            params.insert("jsevents", "1");
        }

        let prefix = if options.dialog {
            format!("{}/dialog", self.endpoints.dialog)
        } else {
            self.endpoints.dialog.to_owned()
        };
        let url = format!("{prefix}/{endpoint}");
        let query = self.signer.signed_query(&params, &url, Method::Get);
        format!("{url}?{query}")
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-api-version", HeaderValue::from_static(API_VERSION));
    headers.insert(http::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers
}

/// Cross-domain messaging prefix attached to control URLs.
fn xdm_prefix() -> String {
    random_hex(10)
}

fn random_hex(chars: usize) -> String {
    let mut bytes = vec![0u8; chars.div_ceil(2)];
    rand::rng().fill_bytes(&mut bytes);
    let mut encoded = hex::encode(bytes);
    encoded.truncate(chars);
    encoded
}
