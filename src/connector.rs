use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use http::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::auth::TokenCache;
use crate::config::{ApiConfig, Settings};
use crate::error::{Error, Result};
use crate::models::{Listing, SearchResponse, Source};
use crate::normalize::normalize_all;

/// Hard cap imposed by the Browse API on one search page.
pub const MAX_SEARCH_LIMIT: usize = 50;

const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";
const FIXED_PRICE_FILTER: &str = "buyingOptions:{FIXED_PRICE}";

/// A marketplace that can be searched for canonical listings.
///
/// `search` never fails: connectors degrade to an empty result set when
/// they are unconfigured or the upstream call does not succeed.
#[async_trait]
pub trait ListingSource {
    fn source(&self) -> Source;

    async fn search(&self, query: &str, max_results: usize) -> Vec<Listing>;
}

pub struct EbayConnector {
    client: reqwest::Client,
    api: ApiConfig,
    tokens: TokenCache,
}

impl EbayConnector {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_secs))
            .build()?;

        let tokens = TokenCache::new(
            settings.api.auth_url.clone(),
            settings.client_id,
            settings.client_secret,
        );

        Ok(Self {
            client,
            api: settings.api,
            tokens,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.tokens.is_configured()
    }

    async fn fetch_items(&self, token: &str, query: &str, limit: usize) -> Result<Vec<Value>> {
        let url = format!("{}/item_summary/search", self.api.browse_url);
        let limit = limit.min(MAX_SEARCH_LIMIT);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(MARKETPLACE_HEADER, &self.api.marketplace_id)
            .query(&[
                ("q", query),
                ("limit", &limit.to_string()),
                ("filter", FIXED_PRICE_FILTER),
            ])
            .send()
            .await?;

        debug!(
            status = response.status().as_u16(),
            query, "Search response received"
        );

        if response.status() != StatusCode::OK {
            return Err(Error::Status(response.status()));
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body).map_err(|e| {
            error!(
                error = %e,
                body = %String::from_utf8_lossy(&body),
                "Failed to parse search response"
            );
            Error::from(e)
        })?;

        Ok(parsed.item_summaries)
    }
}

#[async_trait]
impl ListingSource for EbayConnector {
    fn source(&self) -> Source {
        Source::Ebay
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<Listing> {
        let Some(token) = self.tokens.get_token(&self.client).await else {
            return Vec::new();
        };

        match self.fetch_items(&token, query, max_results).await {
            Ok(items) => {
                let listings = normalize_all(&items, max_results);
                info!(count = listings.len(), query, "Search complete");
                listings
            }
            Err(e) => {
                error!(error = %e, query, "Search request failed");
                Vec::new()
            }
        }
    }
}
