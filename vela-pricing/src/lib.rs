//! Vela Pricing
//!
//! Multi-provider cost normalization: canonicalizes instance sizes and
//! regions, prices resources through a cache / live source / static
//! table chain, and aggregates monthly totals into a provider
//! comparison.

pub mod cache;
pub mod catalog;
pub mod chain;
pub mod normalize;
pub mod quote;
pub mod report;
pub mod source;
pub mod specs;

pub use cache::PriceCache;
pub use chain::{FREE_CATEGORIES, PriceChain};
pub use normalize::{normalize_instance_id, normalize_region};
pub use quote::{HOURS_PER_MONTH, PriceKey, PriceUnit, Quote, SourceTier, UnitPrice};
pub use report::{CostEstimator, CostReport, PricingError, ResourceCost, Savings};
pub use source::{PriceSource, RetailPriceClient};
