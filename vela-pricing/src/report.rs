//! Report - aggregate per-resource quotes into a provider comparison
//!
//! Lookups are deduplicated per normalized key and issued concurrently
//! under a bounded pool, so total latency tracks the slowest single
//! lookup. Per-resource failures become visible zero-cost entries,
//! never aborted runs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use vela_core::classify::{self, SkippedResource, UnknownProvider};
use vela_core::{CloudProvider, Configuration, ResourceCategory, ResourceSpec};

use crate::catalog;
use crate::chain::{PriceChain, Priced};
use crate::normalize;
use crate::quote::{PriceKey, SourceTier};
use crate::specs;

/// Concurrent outbound lookups per aggregation pass.
pub const LOOKUP_POOL_SIZE: usize = 8;

const MONTHS_PER_YEAR: f64 = 12.0;

/// API misuse by the caller; untrusted configuration input never raises
/// these.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    UnknownProvider(#[from] UnknownProvider),

    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),
}

/// One priced resource in the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceCost {
    pub resource: String,
    pub provider: CloudProvider,
    pub monthly_cost: f64,
    pub source_tier: SourceTier,
    pub description: String,
}

/// Savings of one provider relative to the cheapest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Savings {
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub percent_difference: f64,
}

/// The full cost comparison for one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CostReport {
    /// Every provider appears, zero-resource providers at 0.
    pub per_provider_totals: BTreeMap<CloudProvider, f64>,
    pub annual_costs: BTreeMap<CloudProvider, f64>,
    pub breakdown: Vec<ResourceCost>,
    /// Resources excluded from pricing, with reasons.
    pub skipped: Vec<SkippedResource>,
    /// Provider with the lowest total. A provider with zero declared
    /// resources is eligible; ties go to the first in provider order.
    pub cheapest_provider: CloudProvider,
    pub savings_vs_cheapest: BTreeMap<CloudProvider, Savings>,
}

/// Collects resources and prices them through a chain.
#[derive(Debug, Default)]
pub struct CostEstimator {
    specs: Vec<ResourceSpec>,
    skipped: Vec<SkippedResource>,
}

impl CostEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an estimator from a parsed configuration, classifying and
    /// resolving every resource block.
    pub fn from_configuration(config: &Configuration) -> Self {
        let classified = classify::classify_configuration(config);
        Self {
            specs: classified.specs,
            skipped: classified.skipped,
        }
    }

    /// Add a resource by hand. The provider name and quantity are
    /// validated here: passing junk is caller error, not input error.
    pub fn add_resource(
        &mut self,
        name: &str,
        type_label: &str,
        provider: &str,
        instance_id: Option<&str>,
        region: Option<&str>,
        quantity: u32,
    ) -> Result<(), PricingError> {
        let provider: CloudProvider = provider.parse()?;
        if quantity < 1 {
            return Err(PricingError::InvalidQuantity(quantity));
        }

        let category = classify::classify_type(type_label)
            .map(|(_, category)| category)
            .unwrap_or(ResourceCategory::Unknown);

        tracing::info!(name, type_label, %provider, "adding resource");
        self.specs.push(ResourceSpec {
            type_label: type_label.to_string(),
            name: name.to_string(),
            provider,
            category,
            instance_id: instance_id.map(str::to_string),
            region: region.map(str::to_string),
            size_gb: classify::DEFAULT_STORAGE_GB,
            count: quantity,
        });
        Ok(())
    }

    pub fn resources(&self) -> &[ResourceSpec] {
        &self.specs
    }

    /// Price every resource and build the comparison.
    pub async fn estimate(&self, chain: Arc<PriceChain>) -> CostReport {
        let keys: Vec<PriceKey> = self.specs.iter().map(price_key).collect();

        // one lookup per distinct key, bounded concurrency
        let unique: HashSet<PriceKey> = keys.iter().cloned().collect();
        let semaphore = Arc::new(Semaphore::new(LOOKUP_POOL_SIZE));
        let mut join_set = JoinSet::new();
        for key in unique {
            let chain = Arc::clone(&chain);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let priced = chain.lookup(&key).await;
                (key, priced)
            });
        }

        let mut priced_by_key: HashMap<PriceKey, Priced> = HashMap::new();
        while let Some(joined) = join_set.join_next().await {
            if let Ok((key, priced)) = joined {
                priced_by_key.insert(key, priced);
            }
        }

        let mut totals: BTreeMap<CloudProvider, f64> =
            CloudProvider::ALL.iter().map(|p| (*p, 0.0)).collect();
        let mut breakdown = Vec::with_capacity(self.specs.len());

        for (spec, key) in self.specs.iter().zip(&keys) {
            let Some(priced) = priced_by_key.get(key) else {
                continue;
            };
            let unit_monthly = priced
                .unit
                .map(|unit| unit.monthly_cost(spec.size_gb))
                .unwrap_or(0.0);
            let monthly_cost = unit_monthly * f64::from(spec.count);

            *totals.entry(spec.provider).or_insert(0.0) += monthly_cost;
            breakdown.push(ResourceCost {
                resource: spec.address(),
                provider: spec.provider,
                monthly_cost,
                source_tier: priced.tier,
                description: describe(spec, key, priced),
            });
        }

        // first strictly-minimal provider wins, so ties are stable
        let mut cheapest_provider = CloudProvider::Aws;
        let mut cheapest_total = f64::INFINITY;
        for (provider, total) in &totals {
            if *total < cheapest_total {
                cheapest_provider = *provider;
                cheapest_total = *total;
            }
        }

        let mut savings_vs_cheapest = BTreeMap::new();
        for (provider, total) in &totals {
            if *provider == cheapest_provider {
                continue;
            }
            let monthly_savings = total - cheapest_total;
            let percent_difference = if *total > 0.0 {
                monthly_savings / total * 100.0
            } else {
                0.0
            };
            savings_vs_cheapest.insert(
                *provider,
                Savings {
                    monthly_savings,
                    annual_savings: monthly_savings * MONTHS_PER_YEAR,
                    percent_difference,
                },
            );
        }

        let annual_costs = totals
            .iter()
            .map(|(p, total)| (*p, total * MONTHS_PER_YEAR))
            .collect();

        CostReport {
            per_provider_totals: totals,
            annual_costs,
            breakdown,
            skipped: self.skipped.clone(),
            cheapest_provider,
            savings_vs_cheapest,
        }
    }
}

/// Normalized lookup key for one resource. Compute sizes go through
/// full SKU normalization; other identifiers only need a deterministic
/// case fold.
fn price_key(spec: &ResourceSpec) -> PriceKey {
    let raw_instance = spec
        .instance_id
        .clone()
        .unwrap_or_else(|| catalog::default_instance_id(spec.provider, spec.category).to_string());
    let instance_id = match spec.category {
        ResourceCategory::Compute => {
            normalize::normalize_instance_id(spec.provider, &raw_instance)
        }
        _ => raw_instance.trim().to_ascii_lowercase(),
    };
    let region = normalize::normalize_region(spec.provider, spec.region.as_deref().unwrap_or(""));
    PriceKey::new(spec.provider, spec.category, instance_id, region)
}

fn describe(spec: &ResourceSpec, key: &PriceKey, priced: &Priced) -> String {
    let mut what = format!("{}{}", key.instance_id, specs::describe(&key.instance_id));
    if spec.category == ResourceCategory::ObjectStorage {
        what.push_str(&format!(" {} GB", spec.size_gb));
    }
    if spec.count > 1 {
        what.push_str(&format!(" (x{})", spec.count));
    }
    let region = if spec.region.is_none() {
        format!("{} (assumed)", key.region)
    } else {
        key.region.clone()
    };
    format!("{} in {} - {}", what, region, priced.note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cache::PriceCache;
    use crate::quote::UnitPrice;
    use crate::source::{FetchError, PriceSource};

    fn chain_with_prices(prices: &[(&PriceKey, f64)]) -> Arc<PriceChain> {
        let cache = PriceCache::new();
        for (key, monthly) in prices {
            cache.put(&key.cache_key(), UnitPrice::per_month(*monthly));
        }
        Arc::new(PriceChain::new(cache))
    }

    #[tokio::test]
    async fn aggregation_totals_cheapest_and_savings() {
        let mut estimator = CostEstimator::new();
        estimator
            .add_resource("web", "aws_instance", "aws", Some("x1"), None, 1)
            .unwrap();
        estimator
            .add_resource("db", "aws_instance", "aws", Some("x2"), None, 1)
            .unwrap();
        estimator
            .add_resource("vm", "azurerm_virtual_machine", "azure", Some("Zed"), None, 1)
            .unwrap();

        let keys: Vec<PriceKey> = estimator.resources().iter().map(price_key).collect();
        let chain = chain_with_prices(&[(&keys[0], 10.0), (&keys[1], 5.0), (&keys[2], 8.0)]);

        let report = estimator.estimate(chain).await;

        assert_eq!(report.per_provider_totals[&CloudProvider::Aws], 15.0);
        assert_eq!(report.per_provider_totals[&CloudProvider::Azure], 8.0);
        assert_eq!(report.per_provider_totals[&CloudProvider::Gcp], 0.0);

        // the zero-resource provider is eligible to be cheapest
        assert_eq!(report.cheapest_provider, CloudProvider::Gcp);

        let aws = &report.savings_vs_cheapest[&CloudProvider::Aws];
        assert_eq!(aws.monthly_savings, 15.0);
        assert_eq!(aws.percent_difference, 100.0);
        assert_eq!(aws.annual_savings, 180.0);
        assert!(!report.savings_vs_cheapest.contains_key(&CloudProvider::Gcp));

        assert_eq!(report.annual_costs[&CloudProvider::Aws], 180.0);
    }

    #[tokio::test]
    async fn empty_configuration_still_reports_all_providers() {
        let estimator = CostEstimator::new();
        let report = estimator.estimate(Arc::new(PriceChain::new(PriceCache::new()))).await;

        assert_eq!(report.per_provider_totals.len(), 3);
        assert!(report.per_provider_totals.values().all(|v| *v == 0.0));
        // ties go to the first provider in order
        assert_eq!(report.cheapest_provider, CloudProvider::Aws);
    }

    #[tokio::test]
    async fn invalid_provider_is_a_hard_error() {
        let mut estimator = CostEstimator::new();
        let result =
            estimator.add_resource("x", "aws_instance", "digitalocean", None, None, 1);
        assert!(matches!(result, Err(PricingError::UnknownProvider(_))));
    }

    #[tokio::test]
    async fn zero_quantity_is_a_hard_error() {
        let mut estimator = CostEstimator::new();
        let result = estimator.add_resource("x", "aws_instance", "aws", None, None, 0);
        assert!(matches!(result, Err(PricingError::InvalidQuantity(0))));
    }

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn unit_price(&self, _key: &PriceKey) -> Result<Option<UnitPrice>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(UnitPrice::per_hour(0.1)))
        }
    }

    #[tokio::test]
    async fn identical_keys_are_looked_up_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = Arc::new(
            PriceChain::new(PriceCache::new()).with_live(Box::new(CountingSource {
                calls: Arc::clone(&calls),
            })),
        );

        let mut estimator = CostEstimator::new();
        for name in ["a", "b", "c"] {
            estimator
                .add_resource(
                    name,
                    "azurerm_virtual_machine",
                    "azure",
                    Some("Standard_D2s_v3"),
                    Some("eastus"),
                    1,
                )
                .unwrap();
        }

        let report = estimator.estimate(chain).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.breakdown.len(), 3);
        assert!(
            report
                .breakdown
                .iter()
                .all(|r| r.monthly_cost == report.breakdown[0].monthly_cost)
        );
    }

    #[tokio::test]
    async fn unpriceable_resource_is_visible_not_fatal() {
        let mut estimator = CostEstimator::new();
        estimator
            .add_resource("queue", "aws_sqs_queue", "aws", None, None, 1)
            .unwrap();
        estimator
            .add_resource("web", "aws_instance", "aws", Some("t2.micro"), None, 1)
            .unwrap();

        let report = estimator
            .estimate(Arc::new(PriceChain::new(PriceCache::new())))
            .await;

        assert_eq!(report.breakdown.len(), 2);
        let queue = &report.breakdown[0];
        assert_eq!(queue.source_tier, SourceTier::Unavailable);
        assert_eq!(queue.monthly_cost, 0.0);

        let web = &report.breakdown[1];
        assert_eq!(web.source_tier, SourceTier::Static);
        assert!(web.monthly_cost > 0.0);
    }

    #[tokio::test]
    async fn configuration_end_to_end_with_normalization() {
        let config = vela_core::parse(
            r#"
            variable "location" {
                default = "East US"
            }

            resource "azurerm_virtual_machine" "vm" {
                vm_size  = "D2_v3"
                location = var.location
                count    = 2
            }

            resource "azurerm_virtual_network" "net" {
                address_space = ["10.0.0.0/16"]
            }
            "#,
        );

        let estimator = CostEstimator::from_configuration(&config);
        let report = estimator
            .estimate(Arc::new(PriceChain::new(PriceCache::new())))
            .await;

        assert_eq!(report.breakdown.len(), 2);

        let vm = &report.breakdown[0];
        assert!(vm.description.contains("Standard_D2s_v3"));
        assert!(vm.description.contains("eastus"));
        assert!(vm.description.contains("(x2)"));
        assert_eq!(vm.source_tier, SourceTier::Static);
        assert!((vm.monthly_cost - 0.11 * crate::quote::HOURS_PER_MONTH * 2.0).abs() < 1e-9);

        // free allow-list, not "no data"
        let net = &report.breakdown[1];
        assert_eq!(net.source_tier, SourceTier::Static);
        assert_eq!(net.monthly_cost, 0.0);
        assert!(net.description.contains("free"));
    }

    #[tokio::test]
    async fn missing_region_is_assumed_and_marked() {
        let config = vela_core::parse(
            r#"
            resource "aws_instance" "web" {
                instance_type = "t2.micro"
            }
            "#,
        );

        let estimator = CostEstimator::from_configuration(&config);
        let report = estimator
            .estimate(Arc::new(PriceChain::new(PriceCache::new())))
            .await;

        let web = &report.breakdown[0];
        assert!(web.description.contains("us-east-1 (assumed)"));
    }

    #[tokio::test]
    async fn storage_priced_per_gb() {
        let config = vela_core::parse(
            r#"
            resource "aws_s3_bucket" "data" {
                bucket  = "data"
                size_gb = 500
            }
            "#,
        );

        let estimator = CostEstimator::from_configuration(&config);
        let report = estimator
            .estimate(Arc::new(PriceChain::new(PriceCache::new())))
            .await;

        let bucket = &report.breakdown[0];
        assert!((bucket.monthly_cost - 0.023 * 500.0).abs() < 1e-9);
        assert!(bucket.description.contains("500 GB"));
    }

    #[tokio::test]
    async fn skipped_resources_survive_into_report() {
        let config = vela_core::parse(
            r#"
            resource "p_x" "a" {
                size = "T2"
            }
            "#,
        );

        let estimator = CostEstimator::from_configuration(&config);
        let report = estimator
            .estimate(Arc::new(PriceChain::new(PriceCache::new())))
            .await;

        assert!(report.breakdown.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].address, "p_x.a");
    }
}
