use std::str::FromStr;

use bon::Builder;

use crate::errors::ClientError;

/// Deployment regions of the metering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Eu,
    Us,
}

impl FromStr for Region {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eu" => Ok(Region::Eu),
            "us" => Ok(Region::Us),
            other => Err(ClientError::UnsupportedRegion(other.to_owned())),
        }
    }
}

impl Region {
    /// Base URLs for this region in live or sandbox mode.
    pub fn endpoints(self, sandbox: bool) -> Endpoints {
        match (self, sandbox) {
            (Region::Eu, false) => Endpoints {
                root: "https://api.tollgate.net",
                dialog: "https://web.tollgate.net",
                merchant: Some("https://merchant.tollgate.net"),
            },
            (Region::Eu, true) => Endpoints {
                root: "https://api.sandbox.tollgatetest.net",
                dialog: "https://web.sandbox.tollgatetest.net",
                merchant: None,
            },
            (Region::Us, false) => Endpoints {
                root: "https://api.us.tollgate.com",
                dialog: "https://web.us.tollgate.com",
                merchant: Some("https://web.us.tollgate.com/merchant"),
            },
            (Region::Us, true) => Endpoints {
                root: "https://api.sandbox.ustollgatetest.com",
                dialog: "https://web.sandbox.ustollgatetest.com",
                merchant: None,
            },
        }
    }
}

/// Base URLs for one (region, mode) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// API root, target of `/access`, `/gettoken`, `/validatesignature`.
    pub root: &'static str,
    /// Dialog frontend, target of purchase and account URLs.
    pub dialog: &'static str,
    /// Merchant backoffice; the sandbox has none.
    pub merchant: Option<&'static str>,
}

/// Client configuration.
#[derive(Builder, Debug, Clone)]
pub struct ClientConfig {
    /// Merchant identifier issued by the service.
    #[builder(into)]
    pub merchant_id: String,
    /// Shared secret (API key) used for request signing.
    #[builder(into)]
    pub api_key: String,
    /// Deployment region.
    #[builder(default = Region::Eu)]
    pub region: Region,
    /// Use the sandbox endpoints instead of the live ones.
    #[builder(default)]
    pub sandbox: bool,
    /// Name under which callers persist the session token. Storage itself
    /// is up to the caller; the client only keeps the token in memory.
    #[builder(into, default = String::from("tollgate_token"))]
    pub token_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parses_case_insensitively() {
        assert_eq!("eu".parse::<Region>().unwrap(), Region::Eu);
        assert_eq!("US".parse::<Region>().unwrap(), Region::Us);
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        assert!(matches!(
            "apac".parse::<Region>(),
            Err(ClientError::UnsupportedRegion(_))
        ));
    }

    #[test]
    fn test_sandbox_endpoints_have_no_merchant_url() {
        assert!(Region::Eu.endpoints(false).merchant.is_some());
        assert!(Region::Eu.endpoints(true).merchant.is_none());
        assert!(Region::Us.endpoints(true).merchant.is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::builder()
            .merchant_id("merchant-1")
            .api_key("s3cr3t")
            .build();
        assert_eq!(config.region, Region::Eu);
        assert!(!config.sandbox);
        assert_eq!(config.token_name, "tollgate_token");
    }
}
