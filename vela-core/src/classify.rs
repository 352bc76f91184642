//! Classification - derive provider and category from type labels
//!
//! Resource type labels carry a provider prefix (`aws_`, `azurerm_`,
//! `google_`) and a provider-specific suffix that maps onto a small set
//! of canonical billing categories. Unmatched labels are skipped and
//! reported, never fatal.

use serde::Serialize;

use crate::config::Configuration;
use crate::resolver;

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 3] = [
        CloudProvider::Aws,
        CloudProvider::Azure,
        CloudProvider::Gcp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
        }
    }

    /// Region used when a resource declares none at all.
    pub fn default_region(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "us-east-1",
            CloudProvider::Azure => "eastus",
            CloudProvider::Gcp => "us-central1",
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for provider names passed in by callers (API misuse, not
/// untrusted configuration input).
#[derive(Debug, thiserror::Error)]
#[error("unknown provider '{0}', expected one of: aws, azure, gcp")]
pub struct UnknownProvider(pub String);

impl std::str::FromStr for CloudProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "azure" | "azurerm" => Ok(CloudProvider::Azure),
            "gcp" | "google" => Ok(CloudProvider::Gcp),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Canonical billing category of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Compute,
    Database,
    ObjectStorage,
    AppService,
    Function,
    LoadBalancer,
    /// Container resources with no billable meter of their own.
    Network,
    Unknown,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Compute => "compute",
            ResourceCategory::Database => "database",
            ResourceCategory::ObjectStorage => "object_storage",
            ResourceCategory::AppService => "app_service",
            ResourceCategory::Function => "function",
            ResourceCategory::LoadBalancer => "load_balancer",
            ResourceCategory::Network => "network",
            ResourceCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider prefixes in match order. `azurerm_` must precede `azure_`
/// so the longest known prefix wins deterministically.
const PROVIDER_PREFIXES: [(&str, CloudProvider); 5] = [
    ("azurerm_", CloudProvider::Azure),
    ("azure_", CloudProvider::Azure),
    ("google_", CloudProvider::Gcp),
    ("gcp_", CloudProvider::Gcp),
    ("aws_", CloudProvider::Aws),
];

/// Classify a resource type label into provider and category.
/// Returns `None` when the label matches no known provider prefix.
pub fn classify_type(type_label: &str) -> Option<(CloudProvider, ResourceCategory)> {
    let label = type_label.trim().to_ascii_lowercase();
    let (rest, provider) = PROVIDER_PREFIXES
        .iter()
        .find_map(|(prefix, provider)| label.strip_prefix(prefix).map(|r| (r, *provider)))?;

    let category = match provider {
        CloudProvider::Aws => aws_category(rest),
        CloudProvider::Azure => azure_category(rest),
        CloudProvider::Gcp => gcp_category(rest),
    };
    Some((provider, category))
}

fn aws_category(rest: &str) -> ResourceCategory {
    match rest {
        "instance" | "ec2_instance" | "spot_instance_request" => ResourceCategory::Compute,
        "db_instance" | "rds_cluster_instance" => ResourceCategory::Database,
        "s3_bucket" => ResourceCategory::ObjectStorage,
        "lambda_function" => ResourceCategory::Function,
        "lb" | "alb" | "elb" => ResourceCategory::LoadBalancer,
        "vpc" | "subnet" | "security_group" | "internet_gateway" | "route_table"
        | "route_table_association" => ResourceCategory::Network,
        _ => ResourceCategory::Unknown,
    }
}

fn azure_category(rest: &str) -> ResourceCategory {
    if rest.ends_with("virtual_machine") {
        // virtual_machine, linux_virtual_machine, windows_virtual_machine
        return ResourceCategory::Compute;
    }
    match rest {
        "sql_database" | "sql_server" | "mssql_database" | "mssql_server" => {
            ResourceCategory::Database
        }
        "storage_account" => ResourceCategory::ObjectStorage,
        "app_service" | "app_service_plan" | "linux_web_app" | "windows_web_app" => {
            ResourceCategory::AppService
        }
        "function_app" | "linux_function_app" | "windows_function_app" => {
            ResourceCategory::Function
        }
        "application_gateway" | "lb" => ResourceCategory::LoadBalancer,
        "virtual_network" | "subnet" | "network_interface" | "public_ip" | "resource_group"
        | "network_security_group" | "storage_container" => ResourceCategory::Network,
        _ => ResourceCategory::Unknown,
    }
}

fn gcp_category(rest: &str) -> ResourceCategory {
    match rest {
        "compute_instance" => ResourceCategory::Compute,
        "sql_database_instance" => ResourceCategory::Database,
        "storage_bucket" => ResourceCategory::ObjectStorage,
        "cloudfunctions_function" => ResourceCategory::Function,
        "compute_forwarding_rule" => ResourceCategory::LoadBalancer,
        "compute_network" | "compute_subnetwork" | "compute_firewall" => {
            ResourceCategory::Network
        }
        _ => ResourceCategory::Unknown,
    }
}

/// Attribute names that can carry an instance size, in lookup priority
/// order per category. First present key wins.
pub fn instance_key_candidates(category: ResourceCategory) -> &'static [&'static str] {
    match category {
        ResourceCategory::Compute => &["instance_type", "size", "vm_size", "machine_type"],
        ResourceCategory::Database => &["instance_class", "sku_name", "tier", "size"],
        ResourceCategory::AppService => &["sku_name", "sku", "size"],
        ResourceCategory::ObjectStorage => &["storage_class", "account_tier"],
        _ => &["sku_name", "size"],
    }
}

/// Attribute names that can carry a region, in lookup priority order.
pub const REGION_KEY_CANDIDATES: [&str; 2] = ["location", "region"];

/// Pricing-relevant view of one classified resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSpec {
    pub type_label: String,
    pub name: String,
    pub provider: CloudProvider,
    pub category: ResourceCategory,
    /// Raw (un-normalized) instance size, if one was declared and
    /// resolved.
    pub instance_id: Option<String>,
    /// Raw (un-normalized) region, if one was declared and resolved.
    pub region: Option<String>,
    /// Billable storage size for per-GB categories.
    pub size_gb: f64,
    /// Declared instance count, at least 1.
    pub count: u32,
}

impl ResourceSpec {
    pub fn address(&self) -> String {
        format!("{}.{}", self.type_label, self.name)
    }
}

/// A resource excluded from pricing, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedResource {
    pub address: String,
    pub reason: String,
}

/// Result of classifying a whole configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classified {
    pub specs: Vec<ResourceSpec>,
    pub skipped: Vec<SkippedResource>,
}

/// Default billable storage size when a per-GB resource declares none.
pub const DEFAULT_STORAGE_GB: f64 = 100.0;

/// Classify every resource block of a configuration, resolving
/// reference-valued size and region attributes on the way.
pub fn classify_configuration(config: &Configuration) -> Classified {
    let mut out = Classified::default();

    for block in config.resources() {
        let Some(type_label) = block.type_label.as_deref() else {
            out.skipped.push(SkippedResource {
                address: block.address(),
                reason: "resource block has no type label".to_string(),
            });
            continue;
        };
        let Some((provider, category)) = classify_type(type_label) else {
            tracing::debug!(address = %block.address(), "no known provider prefix, skipping");
            out.skipped.push(SkippedResource {
                address: block.address(),
                reason: format!("type '{}' matches no known provider prefix", type_label),
            });
            continue;
        };

        let instance_id = instance_key_candidates(category)
            .iter()
            .find_map(|key| block.property(key))
            .and_then(|value| resolver::resolve(config, value));

        let region = REGION_KEY_CANDIDATES
            .iter()
            .find_map(|key| block.property(key))
            .and_then(|value| resolver::resolve(config, value));

        let size_gb = block
            .property("size_gb")
            .and_then(|value| resolver::resolve(config, value))
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|gb| *gb > 0.0)
            .unwrap_or(DEFAULT_STORAGE_GB);

        let count = block
            .property("count")
            .and_then(|value| resolver::resolve(config, value))
            .and_then(|text| text.parse::<u32>().ok())
            .map_or(1, |n| n.max(1));

        out.specs.push(ResourceSpec {
            type_label: type_label.to_string(),
            name: block
                .name_label
                .clone()
                .unwrap_or_else(|| "unnamed".to_string()),
            provider,
            category,
            instance_id,
            region,
            size_gb,
            count,
        });
    }

    out
}

/// Provider most likely intended by the configuration: the first
/// provider block with a recognizable name, falling back to the first
/// classified resource.
pub fn dominant_provider(config: &Configuration) -> Option<CloudProvider> {
    for block in config.providers() {
        if let Some(name) = block.type_label.as_deref() {
            if let Ok(provider) = name.parse::<CloudProvider>() {
                return Some(provider);
            }
        }
    }
    config
        .resources()
        .filter_map(|b| b.type_label.as_deref())
        .find_map(|label| classify_type(label).map(|(p, _)| p))
}
