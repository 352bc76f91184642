//! Chain - ordered fallback across pricing tiers
//!
//! One lookup walks cache, live source, then the static table, and
//! records which tier answered. "Not found" is never an error: the
//! terminal state is an unavailable quote with a zero cost and a
//! visible marker.

use tokio::time::timeout;
use vela_core::ResourceCategory;

use crate::cache::PriceCache;
use crate::catalog;
use crate::quote::{PriceKey, Quote, SourceTier, UnitPrice};
use crate::source::{LIVE_LOOKUP_TIMEOUT, PriceSource};

/// Categories free by contract. An explicit allow-list: absence of
/// pricing data never implies free.
pub const FREE_CATEGORIES: &[ResourceCategory] = &[ResourceCategory::Network];

/// Outcome of one chain traversal, before any per-resource usage
/// (size, count) is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Priced {
    pub unit: Option<UnitPrice>,
    pub tier: SourceTier,
    pub note: &'static str,
}

/// The pricing source chain. Cache and live source are injected by the
/// caller; the static catalog is built in.
pub struct PriceChain {
    cache: PriceCache,
    live: Option<Box<dyn PriceSource>>,
}

impl PriceChain {
    pub fn new(cache: PriceCache) -> Self {
        Self { cache, live: None }
    }

    pub fn with_live(mut self, source: Box<dyn PriceSource>) -> Self {
        self.live = Some(source);
        self
    }

    /// Walk the chain for one normalized key.
    pub async fn lookup(&self, key: &PriceKey) -> Priced {
        if FREE_CATEGORIES.contains(&key.category) {
            return Priced {
                unit: Some(UnitPrice::per_month(0.0)),
                tier: SourceTier::Static,
                note: "free, no billable meter",
            };
        }

        let cache_key = key.cache_key();
        if let Some(unit) = self.cache.get(&cache_key) {
            return Priced {
                unit: Some(unit),
                tier: SourceTier::Cache,
                note: "cached price",
            };
        }

        if let Some(source) = &self.live {
            match timeout(LIVE_LOOKUP_TIMEOUT, source.unit_price(key)).await {
                Ok(Ok(Some(unit))) => {
                    self.cache.put(&cache_key, unit);
                    return Priced {
                        unit: Some(unit),
                        tier: SourceTier::Live,
                        note: "live retail price",
                    };
                }
                Ok(Ok(None)) => {
                    tracing::debug!(key = %key, "live source has no data, trying static table");
                }
                Ok(Err(e)) => {
                    tracing::warn!(key = %key, error = %e, "live lookup failed, trying static table");
                }
                Err(_) => {
                    tracing::warn!(key = %key, "live lookup timed out, trying static table");
                }
            }
        }

        if let Some(unit) = catalog::lookup(key.provider, key.category, &key.instance_id) {
            return Priced {
                unit: Some(unit),
                tier: SourceTier::Static,
                note: "static price table",
            };
        }

        tracing::warn!(key = %key, "no pricing data at any tier");
        Priced {
            unit: None,
            tier: SourceTier::Unavailable,
            note: "pricing unavailable",
        }
    }

    /// Convenience wrapper: one quote for one key, applying a storage
    /// size for per-GB categories.
    pub async fn quote(&self, key: &PriceKey, size_gb: f64) -> Quote {
        let priced = self.lookup(key).await;
        let monthly_cost = priced
            .unit
            .map(|unit| unit.monthly_cost(size_gb))
            .unwrap_or(0.0);
        Quote {
            monthly_cost,
            source_tier: priced.tier,
            description: format!("{} ({})", key, priced.note),
        }
    }
}
