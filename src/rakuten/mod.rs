//! Rakuten Ichiba item search.
//!
//! Only the keyword search is used. The ranking API cannot rank within an
//! arbitrary genre, so results keep the search API's default ordering.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::RakutenConfig;
use crate::errors::{ShopcrabError, ShopcrabResult};
use crate::product::{ProductList, ProductRecord};
use crate::utils::http::{ERROR_BODY_LIMIT, limited_text};

/// Results requested per search; one per carousel bubble.
pub const DEFAULT_HITS: usize = crate::product::MAX_ITEMS;

/// The API rejects `hits` above this.
const API_MAX_HITS: usize = 30;

const SEARCH_PATH: &str = "/services/api/IchibaItem/Search/20220601";

/// Free-text product search returning at most `limit` records.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, keyword: &str, limit: usize) -> ShopcrabResult<ProductList>;
}

pub struct RakutenClient {
    client: Client,
    application_id: String,
    affiliate_id: String,
    api_base: String,
}

impl RakutenClient {
    pub fn new(config: &RakutenConfig, client: Client) -> Self {
        Self {
            client,
            application_id: config.application_id.clone(),
            affiliate_id: config.affiliate_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

// --- wire format ---

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "Items", default)]
    items: Vec<RawEntry>,
}

/// `formatVersion=2` returns bare items; version 1 wraps each in `{"Item": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Wrapped {
        #[serde(rename = "Item")]
        item: RawItem,
    },
    Flat(RawItem),
}

impl RawEntry {
    fn into_item(self) -> RawItem {
        match self {
            Self::Wrapped { item } | Self::Flat(item) => item,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default)]
    item_price: Option<u64>,
    #[serde(default)]
    item_url: Option<String>,
    #[serde(default)]
    medium_image_urls: Vec<RawImageUrl>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawImageUrl {
    Plain(String),
    Wrapped {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

impl RawImageUrl {
    fn as_str(&self) -> &str {
        match self {
            Self::Plain(url) | Self::Wrapped { image_url: url } => url,
        }
    }
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

impl TryFrom<RawItem> for ProductRecord {
    type Error = ShopcrabError;

    fn try_from(raw: RawItem) -> ShopcrabResult<Self> {
        let name = raw
            .item_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ShopcrabError::Parse("missing itemName".into()))?;
        let price = raw
            .item_price
            .ok_or_else(|| ShopcrabError::Parse(format!("missing itemPrice for '{}'", name)))?;
        let url = raw
            .item_url
            .ok_or_else(|| ShopcrabError::Parse(format!("missing itemUrl for '{}'", name)))?;
        ensure_absolute("itemUrl", &url)?;
        let image_url = raw
            .medium_image_urls
            .first()
            .map(|u| u.as_str().to_string())
            .ok_or_else(|| ShopcrabError::Parse(format!("no mediumImageUrls for '{}'", name)))?;
        ensure_absolute("mediumImageUrls[0]", &image_url)?;

        Ok(Self {
            name,
            price,
            url,
            image_url,
        })
    }
}

fn ensure_absolute(field: &str, value: &str) -> ShopcrabResult<()> {
    match url::Url::parse(value) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
        _ => Err(ShopcrabError::Parse(format!(
            "{} is not an absolute http(s) URL: {}",
            field, value
        ))),
    }
}

fn search_error(message: impl Into<String>, retryable: bool) -> ShopcrabError {
    ShopcrabError::Search {
        message: message.into(),
        retryable,
    }
}

#[async_trait]
impl ProductSearch for RakutenClient {
    async fn search(&self, keyword: &str, limit: usize) -> ShopcrabResult<ProductList> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(search_error("keyword is empty", false));
        }
        if self.application_id.is_empty() {
            return Err(search_error("applicationId is not configured", false));
        }
        let hits = limit.clamp(1, API_MAX_HITS).to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("applicationId", self.application_id.as_str()),
            ("keyword", keyword),
            ("hits", hits.as_str()),
            ("imageFlag", "1"),
            ("format", "json"),
            ("formatVersion", "2"),
        ];
        if !self.affiliate_id.is_empty() {
            query.push(("affiliateId", self.affiliate_id.as_str()));
        }

        let resp = self
            .client
            .get(format!("{}{}", self.api_base, SEARCH_PATH))
            .query(&query)
            .send()
            .await
            .map_err(|e| search_error(e.to_string(), true))?;

        let status = resp.status();
        if !status.is_success() {
            let body = limited_text(resp, ERROR_BODY_LIMIT)
                .await
                .unwrap_or_default();
            let api_error = serde_json::from_str::<ApiError>(&body).ok();
            // Some API versions answer an empty result with 404 not_found.
            if status == StatusCode::NOT_FOUND
                && api_error.as_ref().is_some_and(|e| e.error == "not_found")
            {
                debug!("rakuten search: no items for keyword");
                return Ok(ProductList::default());
            }
            let message = match api_error {
                Some(e) if !e.error.is_empty() => {
                    format!("{} ({}): {}", e.error, status.as_u16(), e.error_description)
                }
                _ => format!("HTTP {}: {}", status.as_u16(), body),
            };
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            return Err(search_error(message, retryable));
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| search_error(format!("invalid response body: {}", e), false))?;

        let records = parsed
            .items
            .into_iter()
            .take(limit)
            .map(|entry| ProductRecord::try_from(entry.into_item()))
            .collect::<ShopcrabResult<Vec<_>>>()?;

        debug!("rakuten search: {} item(s) returned", records.len());
        Ok(ProductList::truncated(records))
    }
}

#[cfg(test)]
mod tests;
