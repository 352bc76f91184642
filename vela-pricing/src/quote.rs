//! Quote - priced results and the keys that produce them

use serde::{Deserialize, Serialize};
use vela_core::{CloudProvider, ResourceCategory};

/// Hours billed per month for hourly rates.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Billing unit of a raw price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    PerHour,
    PerMonth,
    PerGbMonth,
}

/// A raw price in its source unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    pub amount: f64,
    pub unit: PriceUnit,
}

impl UnitPrice {
    pub fn per_hour(amount: f64) -> Self {
        Self {
            amount,
            unit: PriceUnit::PerHour,
        }
    }

    pub fn per_month(amount: f64) -> Self {
        Self {
            amount,
            unit: PriceUnit::PerMonth,
        }
    }

    pub fn per_gb_month(amount: f64) -> Self {
        Self {
            amount,
            unit: PriceUnit::PerGbMonth,
        }
    }

    /// Monthly cost for one instance of the resource. `size_gb` only
    /// matters for per-GB units.
    pub fn monthly_cost(&self, size_gb: f64) -> f64 {
        match self.unit {
            PriceUnit::PerHour => self.amount * HOURS_PER_MONTH,
            PriceUnit::PerMonth => self.amount,
            PriceUnit::PerGbMonth => self.amount * size_gb,
        }
    }
}

/// Canonical lookup key. Two differently-spelled inputs that normalize
/// to the same key must yield identical prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PriceKey {
    pub provider: CloudProvider,
    pub category: ResourceCategory,
    pub instance_id: String,
    pub region: String,
}

impl PriceKey {
    pub fn new(
        provider: CloudProvider,
        category: ResourceCategory,
        instance_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            category,
            instance_id: instance_id.into(),
            region: region.into(),
        }
    }

    /// Stable string form used as the cache key.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.provider, self.category, self.instance_id, self.region
        )
    }
}

impl std::fmt::Display for PriceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} in {}",
            self.provider, self.category, self.instance_id, self.region
        )
    }
}

/// Which tier of the source chain satisfied a lookup. An observable
/// contract element, not just diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    Live,
    Cache,
    Static,
    Unavailable,
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceTier::Live => "live",
            SourceTier::Cache => "cache",
            SourceTier::Static => "static",
            SourceTier::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// One priced result for one normalized resource key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub monthly_cost: f64,
    pub source_tier: SourceTier,
    pub description: String,
}
