//! Source - live retail price lookup
//!
//! The chain talks to live pricing through the `PriceSource` trait so
//! tests and alternative backends can slot in. The shipped client
//! queries the public Azure retail-prices endpoint; AWS retail lookups
//! need a credentialed SDK and GCP has no keyless equivalent, so both
//! report "no data" and the chain covers them from the static table.

use async_trait::async_trait;
use serde::Deserialize;
use vela_core::CloudProvider;

use crate::quote::{PriceKey, UnitPrice};

/// Bound on one outbound lookup. A slow source degrades to the static
/// table instead of stalling aggregation.
pub const LIVE_LOOKUP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Public Azure retail prices endpoint (no credentials required).
pub const AZURE_RETAIL_PRICES_URL: &str = "https://prices.azure.com/api/retail/prices";

/// Transport-level failure of a live lookup. "No data for this key" is
/// not an error; sources return `Ok(None)` for that.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed price response: {0}")]
    Malformed(String),
}

/// A live price backend for normalized keys.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Unit price for a normalized key, or `None` when this source has
    /// no data for it.
    async fn unit_price(&self, key: &PriceKey) -> Result<Option<UnitPrice>, FetchError>;
}

/// HTTP client for the retail-prices endpoint.
pub struct RetailPriceClient {
    http: reqwest::Client,
    base_url: String,
}

impl RetailPriceClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(AZURE_RETAIL_PRICES_URL)
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(LIVE_LOOKUP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RetailResponse {
    #[serde(rename = "Items", default)]
    items: Vec<RetailItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetailItem {
    #[serde(default)]
    arm_region_name: String,
    #[serde(default)]
    meter_name: String,
    #[serde(default)]
    retail_price: f64,
}

/// Meters that are not plain on-demand pricing.
const EXCLUDED_METERS: [&str; 5] = ["low priority", "spot", "reserved", "savings", "vcore"];

/// Pick the on-demand hourly rate for the requested region: Linux
/// meters first, Windows as a fallback, special pricing excluded.
fn pick_hourly_rate(items: &[RetailItem], region: &str) -> Option<f64> {
    let mut windows_fallback = None;

    for item in items {
        if !item.arm_region_name.eq_ignore_ascii_case(region) {
            continue;
        }
        let meter = item.meter_name.to_ascii_lowercase();
        if EXCLUDED_METERS.iter().any(|x| meter.contains(x)) {
            continue;
        }
        if item.retail_price <= 0.0 {
            continue;
        }
        if !meter.contains("windows") {
            return Some(item.retail_price);
        }
        if windows_fallback.is_none() {
            windows_fallback = Some(item.retail_price);
        }
    }

    windows_fallback
}

#[async_trait]
impl PriceSource for RetailPriceClient {
    async fn unit_price(&self, key: &PriceKey) -> Result<Option<UnitPrice>, FetchError> {
        if key.provider != CloudProvider::Azure {
            return Ok(None);
        }

        let filter = format!("armSkuName eq '{}'", key.instance_id);
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("$filter", filter.as_str()), ("$top", "200")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(key = %key, status = %response.status(), "retail price endpoint refused");
            return Ok(None);
        }

        let body: RetailResponse = response.json().await?;
        tracing::debug!(key = %key, items = body.items.len(), "retail price response");

        match pick_hourly_rate(&body.items, &key.region) {
            Some(rate) => {
                tracing::info!(key = %key, rate, "live retail rate");
                Ok(Some(UnitPrice::per_hour(rate)))
            }
            None => {
                tracing::debug!(key = %key, "no usable retail meter for region");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(region: &str, meter: &str, price: f64) -> RetailItem {
        RetailItem {
            arm_region_name: region.to_string(),
            meter_name: meter.to_string(),
            retail_price: price,
        }
    }

    #[test]
    fn prefers_linux_meter_in_region() {
        let items = vec![
            item("westus", "D2s v3", 0.2),
            item("eastus", "D2s v3 Windows", 0.188),
            item("eastus", "D2s v3", 0.096),
        ];
        assert_eq!(pick_hourly_rate(&items, "eastus"), Some(0.096));
    }

    #[test]
    fn falls_back_to_windows_meter() {
        let items = vec![item("eastus", "D2s v3 Windows", 0.188)];
        assert_eq!(pick_hourly_rate(&items, "eastus"), Some(0.188));
    }

    #[test]
    fn excludes_special_pricing() {
        let items = vec![
            item("eastus", "D2s v3 Spot", 0.01),
            item("eastus", "D2s v3 Low Priority", 0.02),
            item("eastus", "D2s v3 Reserved", 0.03),
        ];
        assert_eq!(pick_hourly_rate(&items, "eastus"), None);
    }

    #[test]
    fn ignores_other_regions_and_zero_prices() {
        let items = vec![
            item("westeurope", "D2s v3", 0.1),
            item("eastus", "D2s v3", 0.0),
        ];
        assert_eq!(pick_hourly_rate(&items, "eastus"), None);
    }
}
