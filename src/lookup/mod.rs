//! Request-based bid detail lookups
//!
//! A lightweight JSON API path that runs next to the browser crawl. It holds
//! its own cookie-carrying HTTP session and shares no page state with the
//! browser, so it needs no coordination with the crawl worker.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value for {name}: {value}")]
    Header { name: &'static str, value: String },
}

/// Endpoints and menu metadata for the detail API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub session_path: String,
    pub session_menu_info: String,
    pub detail_path: String,
    pub detail_menu_info: String,
    /// Announcement order sent with every detail request.
    pub bid_order: String,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.g2b.go.kr".to_string(),
            session_path: "/co/coz/coza/util/getSession.do".to_string(),
            session_menu_info: r#"{"menuNo":"01175","menuCangVal":"PNPE001_01","bsneClsfCd":"%EC%97%85130026","scrnNo":"00941"}"#.to_string(),
            detail_path: "/pn/pnp/pnpe/commBidPbac/selectPicInfo.do".to_string(),
            detail_menu_info: r#"{"menuNo":"01196","menuCangVal":"PNPE027_01","bsneClsfCd":"%EC%97%85130026","scrnNo":"06085"}"#.to_string(),
            bid_order: "000".to_string(),
            timeout_secs: 15,
        }
    }
}

impl LookupConfig {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Detail lookup keyed by bid number.
///
/// Lookups never fail the caller: any error yields an empty JSON object.
#[async_trait]
pub trait DetailLookup: Send + Sync {
    async fn lookup(&self, bid_number: &str) -> Value;
}

/// Cookie-session client for the portal's JSON API.
pub struct BidLookupClient {
    client: Client,
    config: LookupConfig,
    session: OnceCell<()>,
}

impl BidLookupClient {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );
        let base = config.base_url.trim_end_matches('/');
        headers.insert(ORIGIN, header_value("Origin", base)?);
        headers.insert(REFERER, header_value("Referer", &format!("{base}/"))?);

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            session: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Bootstrap the server-side session. Runs once per client; a failed
    /// attempt is retried on the next lookup.
    pub async fn initialize_session(&self) -> Result<(), LookupError> {
        self.session
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .post(self.config.url(&self.config.session_path))
                    .header(
                        "menu-info",
                        header_value("menu-info", &self.config.session_menu_info)?,
                    )
                    .send()
                    .await?
                    .error_for_status()?;
                let body: Value = response.json().await?;
                info!("Lookup session initialized");
                debug!("Session payload: {}", body);
                Ok::<(), LookupError>(())
            })
            .await
            .map(|_| ())
    }

    /// Fetch the detail payload for one bid.
    pub async fn fetch_detail(&self, bid_number: &str) -> Result<Value, LookupError> {
        self.initialize_session().await?;
        let payload = json!({
            "dlParamM": {
                "bidPbancNo": bid_number,
                "bidPbancOrd": self.config.bid_order,
            }
        });
        let response = self
            .client
            .post(self.config.url(&self.config.detail_path))
            .header(
                "menu-info",
                header_value("menu-info", &self.config.detail_menu_info)?,
            )
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DetailLookup for BidLookupClient {
    async fn lookup(&self, bid_number: &str) -> Value {
        match self.fetch_detail(bid_number).await {
            Ok(detail) => {
                info!("Detail lookup succeeded for {}", bid_number);
                detail
            }
            Err(e) => {
                warn!("Detail lookup failed for {}: {}", bid_number, e);
                Value::Object(serde_json::Map::new())
            }
        }
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, LookupError> {
    HeaderValue::from_str(value).map_err(|_| LookupError::Header {
        name,
        value: value.to_string(),
    })
}
