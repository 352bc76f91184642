//! Catalog - static fallback price tables
//!
//! Last tier before "unavailable": representative on-demand rates for
//! the common sizes of each provider. Hourly rates are stored as-is
//! and converted with `HOURS_PER_MONTH` at lookup time, matching the
//! live source's unit.

use vela_core::{CloudProvider, ResourceCategory};

use crate::quote::{PriceUnit, UnitPrice};

// AWS on-demand, us-east-1.
const AWS_COMPUTE: &[(&str, f64)] = &[
    ("t2.micro", 0.0116),
    ("t2.small", 0.023),
    ("t2.medium", 0.0464),
    ("t3.micro", 0.0104),
    ("t3.small", 0.0208),
    ("t3.medium", 0.0416),
    ("m5.large", 0.096),
    ("m5.xlarge", 0.192),
    ("m5.2xlarge", 0.384),
    ("c5.large", 0.085),
    ("c5.xlarge", 0.17),
    ("c5.2xlarge", 0.34),
];

const AWS_DATABASE: &[(&str, f64)] = &[
    ("db.t2.micro", 0.017),
    ("db.t2.small", 0.034),
    ("db.t2.medium", 0.067),
    ("db.t3.micro", 0.015),
    ("db.t3.small", 0.03),
    ("db.m5.large", 0.141),
    ("db.m5.xlarge", 0.282),
];

// Per GB per month.
const AWS_STORAGE: &[(&str, f64)] = &[
    ("standard", 0.023),
    ("infrequent_access", 0.0125),
    ("glacier", 0.004),
];

const AWS_LOAD_BALANCER: &[(&str, f64)] = &[("standard", 0.0225)];

// Azure on-demand, eastus.
const AZURE_COMPUTE: &[(&str, f64)] = &[
    ("Standard_B1s", 0.012),
    ("Standard_B2s", 0.048),
    ("Standard_B4ms", 0.192),
    ("Standard_D2s_v3", 0.11),
    ("Standard_D4s_v3", 0.22),
    ("Standard_D8s_v3", 0.44),
    ("Standard_D16s_v3", 0.88),
    ("Standard_D32s_v3", 1.76),
    ("Standard_D2s_v4", 0.096),
    ("Standard_D4s_v4", 0.192),
    ("Standard_D8s_v4", 0.384),
    ("Standard_D16s_v4", 0.768),
    ("Standard_D32s_v4", 1.536),
    ("Standard_D2s_v5", 0.086),
    ("Standard_D4s_v5", 0.172),
    ("Standard_D8s_v5", 0.344),
    ("Standard_D16s_v5", 0.688),
    ("Standard_D32s_v5", 1.376),
    ("Standard_E2s_v3", 0.126),
    ("Standard_E4s_v3", 0.252),
    ("Standard_E8s_v3", 0.504),
    ("Standard_E16s_v3", 1.008),
    ("Standard_E32s_v3", 2.016),
    ("Standard_D32a_v4", 1.536),
];

// Monthly list prices per DTU tier.
const AZURE_DATABASE: &[(&str, f64)] = &[
    ("S0", 0.439),
    ("S1", 2.195),
    ("S2", 4.39),
    ("P1", 12.5),
    ("P2", 25.0),
];

// Per GB per month.
const AZURE_STORAGE: &[(&str, f64)] = &[
    ("blob_standard", 0.0184),
    ("blob_hot", 0.0184),
    ("blob_cool", 0.01),
    ("standard", 0.0184),
];

// Monthly plan prices.
const AZURE_APP_SERVICE: &[(&str, f64)] = &[
    ("B1", 10.5),
    ("B2", 21.0),
    ("B3", 42.0),
    ("S1", 73.0),
    ("S2", 146.0),
];

const AZURE_LOAD_BALANCER: &[(&str, f64)] = &[("standard", 0.246)];

// GCP on-demand, us-central1.
const GCP_COMPUTE: &[(&str, f64)] = &[
    ("f1-micro", 0.0076),
    ("g1-small", 0.0356),
    ("n1-standard-1", 0.0475),
    ("n1-standard-2", 0.095),
    ("n1-standard-4", 0.19),
    ("n1-highmem-2", 0.1184),
    ("n1-highmem-4", 0.2368),
];

const GCP_DATABASE: &[(&str, f64)] = &[
    ("db-f1-micro", 0.0068),
    ("db-g1-small", 0.0288),
    ("db-n1-standard-1", 0.0394),
    ("db-n1-standard-2", 0.0788),
];

// Per GB per month.
const GCP_STORAGE: &[(&str, f64)] = &[
    ("standard", 0.020),
    ("nearline", 0.010),
    ("coldline", 0.004),
];

const GCP_LOAD_BALANCER: &[(&str, f64)] = &[("standard", 0.035)];

fn table(
    provider: CloudProvider,
    category: ResourceCategory,
) -> Option<(&'static [(&'static str, f64)], PriceUnit)> {
    use CloudProvider::*;
    use ResourceCategory::*;

    match (provider, category) {
        (Aws, Compute) => Some((AWS_COMPUTE, PriceUnit::PerHour)),
        (Aws, Database) => Some((AWS_DATABASE, PriceUnit::PerHour)),
        (Aws, ObjectStorage) => Some((AWS_STORAGE, PriceUnit::PerGbMonth)),
        (Aws, LoadBalancer) => Some((AWS_LOAD_BALANCER, PriceUnit::PerHour)),
        (Azure, Compute) => Some((AZURE_COMPUTE, PriceUnit::PerHour)),
        (Azure, Database) => Some((AZURE_DATABASE, PriceUnit::PerMonth)),
        (Azure, ObjectStorage) => Some((AZURE_STORAGE, PriceUnit::PerGbMonth)),
        (Azure, AppService) => Some((AZURE_APP_SERVICE, PriceUnit::PerMonth)),
        (Azure, LoadBalancer) => Some((AZURE_LOAD_BALANCER, PriceUnit::PerHour)),
        (Gcp, Compute) => Some((GCP_COMPUTE, PriceUnit::PerHour)),
        (Gcp, Database) => Some((GCP_DATABASE, PriceUnit::PerHour)),
        (Gcp, ObjectStorage) => Some((GCP_STORAGE, PriceUnit::PerGbMonth)),
        (Gcp, LoadBalancer) => Some((GCP_LOAD_BALANCER, PriceUnit::PerHour)),
        _ => None,
    }
}

/// Static-table lookup for a normalized instance id. Case-insensitive:
/// table keys are already canonical.
pub fn lookup(
    provider: CloudProvider,
    category: ResourceCategory,
    instance_id: &str,
) -> Option<UnitPrice> {
    let (rows, unit) = table(provider, category)?;
    rows.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(instance_id))
        .map(|(_, amount)| UnitPrice {
            amount: *amount,
            unit,
        })
}

/// Instance id assumed when a resource of this category declares none.
pub fn default_instance_id(provider: CloudProvider, category: ResourceCategory) -> &'static str {
    use CloudProvider::*;
    use ResourceCategory::*;

    match (provider, category) {
        (Aws, Database) => "db.t2.micro",
        (Azure, Database) => "S0",
        (Gcp, Database) => "db-f1-micro",
        (Aws, ObjectStorage) | (Gcp, ObjectStorage) => "standard",
        (Azure, ObjectStorage) => "blob_standard",
        (Azure, AppService) => "B1",
        (_, LoadBalancer) => "standard",
        (Aws, _) => "t2.micro",
        (Azure, _) => "Standard_B1s",
        (Gcp, _) => "n1-standard-1",
    }
}
