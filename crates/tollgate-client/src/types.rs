//! Types crossing the client's API surface.

use bon::Builder;
use serde::Deserialize;

/// String-keyed map alias used across API responses.
pub type Record<V> = std::collections::HashMap<String, V>;

/// Per-article access flag returned by the `/access` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleAccess {
    pub access: bool,
}

/// Response of the `/access` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub articles: Record<ArticleAccess>,
}

/// Revenue model of a purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaleModel {
    /// Settled immediately ("single sale").
    PayNow,
    /// Added to the running tab.
    #[default]
    PayLater,
}

impl SaleModel {
    /// Endpoint suffix used by the donate/contribute URLs.
    pub fn endpoint_suffix(self) -> &'static str {
        match self {
            SaleModel::PayNow => "pay_now",
            SaleModel::PayLater => "pay_later",
        }
    }
}

/// Options for the purchase URL builders.
#[derive(Builder, Debug, Clone)]
pub struct PurchaseOptions {
    /// Route the purchase through the dialog frontend.
    #[builder(default = true)]
    pub dialog: bool,
    /// Ask the dialog to emit JavaScript events.
    #[builder(default)]
    pub jsevents: bool,
    /// Sale model; only the donate/contribute endpoints care.
    #[builder(default)]
    pub model: SaleModel,
}

impl Default for PurchaseOptions {
    fn default() -> Self {
        PurchaseOptions {
            dialog: true,
            jsevents: false,
            model: SaleModel::default(),
        }
    }
}

/// Options for the account-links control URL.
#[derive(Builder, Debug, Clone, Default)]
pub struct AccountLinks {
    /// Link set selector: `g`, `gg`, `l`, `s`, `ss`, or a combination.
    #[builder(into)]
    pub show: Option<String>,
    /// Stylesheet applied to the rendered links.
    #[builder(into)]
    pub css_url: Option<String>,
    /// Where to send the user afterwards.
    #[builder(into)]
    pub next_url: Option<String>,
    /// Force the display language.
    #[builder(into)]
    pub forcelang: Option<String>,
    #[builder(default)]
    pub jsevents: bool,
}
