use std::time::Duration;

use catalog_core::RawEntry;
use catalog_logging::{catalog_debug, catalog_error, catalog_info, catalog_warn};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::{CatalogEvent, FailureKind, FetchError, Page, StopReason};

/// Public listing endpoint of the Apify Store.
pub const DEFAULT_ENDPOINT: &str = "https://api.apify.com/v2/store";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 32 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CatalogEvent);
}

/// Reports progress through the `catalog_*` log macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: CatalogEvent) {
        match event {
            CatalogEvent::PageRequested { offset, limit } => {
                catalog_debug!("Requesting page offset={} limit={}", offset, limit);
            }
            CatalogEvent::PageFetched {
                offset,
                items,
                accumulated,
                total,
            } => {
                catalog_info!(
                    "Fetched {} records so far (offset {}, page {}, total available {})",
                    accumulated,
                    offset,
                    items,
                    total
                );
            }
            CatalogEvent::Retrying {
                offset,
                attempt,
                failure,
                delay,
            } => {
                catalog_warn!(
                    "Fetch at offset {} failed ({}), retry #{} in {:?}",
                    offset,
                    failure,
                    attempt,
                    delay
                );
            }
            CatalogEvent::Finished { records, stop } => match stop {
                StopReason::Aborted(err) => {
                    catalog_error!("Fetch aborted after {} records: {}", records, err);
                }
                stop => catalog_info!("Fetch finished with {} records ({})", records, stop),
            },
        }
    }
}

/// Source of listing pages.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Page, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestPageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn page_url(&self, offset: u64, limit: u64) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Page, FetchError> {
        let url = self.page_url(offset, limit)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        parse_listing(&bytes)
    }
}

#[derive(Deserialize)]
struct ListingResponse {
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    items: Option<Vec<RawEntry>>,
    total: Option<serde_json::Value>,
}

/// Decodes a `{ data: { items, total } }` listing body.
///
/// Missing `items` reads as an empty page. A `total` that is missing, negative
/// or not a number reads as 0, and a fractional one is truncated. A body that
/// is not a JSON object of that shape is a [`FailureKind::Decode`] error.
pub fn parse_listing(body: &[u8]) -> Result<Page, FetchError> {
    let response: ListingResponse = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    let data = response.data.unwrap_or(ListingData {
        items: None,
        total: None,
    });
    Ok(Page {
        items: data.items.unwrap_or_default(),
        total: data.total.as_ref().map_or(0, reported_total),
    })
}

fn reported_total(value: &serde_json::Value) -> u64 {
    value.as_u64().unwrap_or_else(|| {
        value
            .as_f64()
            .filter(|total| total.is_finite() && *total >= 0.0)
            .map_or(0, |total| total as u64)
    })
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
