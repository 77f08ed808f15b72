// # Steam Inventory Source
//
// This crate provides the Steam physical goods inventory source for
// stockwatch.
//
// ## API
//
// ```http
// GET /IPhysicalGoodsService/CheckInventoryAvailableByPackage/v1
//     ?origin=https://store.steampowered.com&country_code=DE&packageid=903905
// ```
//
// ```json
// { "response": { "inventory_available": true } }
// ```
//
// ## Contract
//
// - One request per check, bounded by a client timeout
// - NO retry logic (the next poll cycle is the retry)
// - Transport errors, timeouts and non-success statuses → `Error::Network`
// - Missing or non-boolean `response.inventory_available` → `Error::Parse`

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use stockwatch_core::traits::InventorySource;
use stockwatch_core::{Availability, Error, Region, Result};

/// Steam Web API base URL
pub const STEAM_API_BASE: &str = "https://api.steampowered.com";

/// Inventory endpoint path below the API base
const INVENTORY_PATH: &str = "/IPhysicalGoodsService/CheckInventoryAvailableByPackage/v1";

/// Store origin the endpoint expects
const STORE_ORIGIN: &str = "https://store.steampowered.com";

/// Default HTTP timeout for inventory requests (10 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct InventoryEnvelope {
    response: InventoryResponse,
}

#[derive(Debug, Deserialize)]
struct InventoryResponse {
    inventory_available: bool,
}

/// Steam inventory source
#[derive(Debug, Clone)]
pub struct SteamInventory {
    /// API base URL (overridable for proxies and tests)
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl SteamInventory {
    /// Create a source against the public Steam API
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(STEAM_API_BASE, timeout)
    }

    /// Create a source against a custom API base
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::config("Inventory HTTP timeout must be > 0"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, INVENTORY_PATH)
    }

    /// Extract availability from a response body
    fn parse_body(body: &str) -> Result<Availability> {
        let envelope: InventoryEnvelope = serde_json::from_str(body).map_err(|e| {
            Error::parse(format!(
                "Unexpected inventory response (want response.inventory_available): {}",
                e
            ))
        })?;

        Ok(Availability::from(envelope.response.inventory_available))
    }
}

#[async_trait]
impl InventorySource for SteamInventory {
    async fn check(&self, package_id: &str, region: &Region) -> Result<Availability> {
        tracing::debug!(package_id, region = %region, "Checking Steam inventory");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("origin", STORE_ORIGIN),
                ("country_code", region.as_str()),
                ("packageid", package_id),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::network(format!("Request timed out: {}", e))
                } else {
                    Error::network(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!("HTTP error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        Self::parse_body(&body)
    }

    fn source_name(&self) -> &str {
        "steam"
    }
}
