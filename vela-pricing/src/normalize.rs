//! Normalization - canonicalize provider-specific identifiers
//!
//! Both functions are total: any string in, a canonical-shaped string
//! out. Unknown inputs get a deterministic best-effort transform so
//! equal spellings still collide to the same cache key; neither
//! function ever fails.

use vela_core::CloudProvider;

/// Azure VM size aliases: shorthand spellings seen in generated or
/// hand-written configurations, mapped to the canonical SKU name.
/// Matched exactly first, then case-insensitively.
const AZURE_VM_ALIASES: &[(&str, &str)] = &[
    // D-series v3
    ("D2_v3", "Standard_D2s_v3"),
    ("D4_v3", "Standard_D4s_v3"),
    ("D8_v3", "Standard_D8s_v3"),
    ("D16_v3", "Standard_D16s_v3"),
    ("D32_v3", "Standard_D32s_v3"),
    ("D2s_v3", "Standard_D2s_v3"),
    ("D4s_v3", "Standard_D4s_v3"),
    ("D8s_v3", "Standard_D8s_v3"),
    ("D16s_v3", "Standard_D16s_v3"),
    ("D32s_v3", "Standard_D32s_v3"),
    // D-series v4
    ("D2_v4", "Standard_D2s_v4"),
    ("D4_v4", "Standard_D4s_v4"),
    ("D8_v4", "Standard_D8s_v4"),
    ("D16_v4", "Standard_D16s_v4"),
    ("D32_v4", "Standard_D32s_v4"),
    ("D2s_v4", "Standard_D2s_v4"),
    ("D4s_v4", "Standard_D4s_v4"),
    ("D8s_v4", "Standard_D8s_v4"),
    ("D16s_v4", "Standard_D16s_v4"),
    ("D32s_v4", "Standard_D32s_v4"),
    // AMD variant with no s-marker in the canonical name
    ("D32a_v4", "Standard_D32a_v4"),
    // B-series
    ("B1s", "Standard_B1s"),
    ("B2s", "Standard_B2s"),
    ("B4ms", "Standard_B4ms"),
    // E-series
    ("E2_v3", "Standard_E2s_v3"),
    ("E4_v3", "Standard_E4s_v3"),
    ("E2s_v3", "Standard_E2s_v3"),
    ("E4s_v3", "Standard_E4s_v3"),
];

/// Region display-name aliases that a plain lowercase/strip transform
/// would not produce.
const AWS_REGION_ALIASES: &[(&str, &str)] = &[
    ("n. virginia", "us-east-1"),
    ("virginia", "us-east-1"),
    ("us east (n. virginia)", "us-east-1"),
    ("ohio", "us-east-2"),
    ("oregon", "us-west-2"),
    ("ireland", "eu-west-1"),
    ("frankfurt", "eu-central-1"),
    ("tokyo", "ap-northeast-1"),
];

const AZURE_REGION_ALIASES: &[(&str, &str)] = &[
    ("us east", "eastus"),
    ("us east 2", "eastus2"),
    ("us west", "westus"),
    ("us west 2", "westus2"),
    ("us central", "centralus"),
];

const GCP_REGION_ALIASES: &[(&str, &str)] = &[
    ("iowa", "us-central1"),
    ("south carolina", "us-east1"),
    ("oregon", "us-west1"),
    ("belgium", "europe-west1"),
    ("tokyo", "asia-northeast1"),
];

/// Canonicalize an instance/VM size for pricing lookups.
///
/// Empty input maps to the provider's smallest common size. For Azure,
/// the alias table is tried first (exact, then case-insensitive), then
/// structural inference reassembles `D2_v3`-shaped spellings into
/// `Standard_D2s_v3`, and anything else gets the `Standard_` prefix so
/// downstream lookup can attempt and fail cleanly. Re-normalizing a
/// canonical id returns it unchanged.
pub fn normalize_instance_id(provider: CloudProvider, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default_compute_size(provider).to_string();
    }

    match provider {
        CloudProvider::Aws | CloudProvider::Gcp => trimmed.to_ascii_lowercase(),
        CloudProvider::Azure => normalize_azure_vm_size(trimmed),
    }
}

/// Smallest common compute size per provider, used when a resource
/// declares no size at all.
pub fn default_compute_size(provider: CloudProvider) -> &'static str {
    match provider {
        CloudProvider::Aws => "t2.micro",
        CloudProvider::Azure => "Standard_B1s",
        CloudProvider::Gcp => "n1-standard-1",
    }
}

fn normalize_azure_vm_size(raw: &str) -> String {
    if let Some((_, canonical)) = AZURE_VM_ALIASES.iter().find(|(alias, _)| *alias == raw) {
        return (*canonical).to_string();
    }
    if raw.starts_with("Standard_") {
        return raw.to_string();
    }
    if let Some((_, canonical)) = AZURE_VM_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(raw))
    {
        return (*canonical).to_string();
    }
    if let Some(inferred) = infer_azure_sku(raw) {
        tracing::debug!(raw, inferred, "inferred Azure SKU shape");
        return inferred;
    }
    // Unrecognized shape: still produce a canonical-looking SKU.
    format!("Standard_{}", raw)
}

/// Reassemble a `D2_v3` / `d16s_V4`-shaped spelling into the canonical
/// `Standard_<family><n>s_v<ver>` form, inserting the missing `s`
/// marker when absent.
fn infer_azure_sku(raw: &str) -> Option<String> {
    let (sku, version) = raw.split_once('_')?;
    let version = version.to_ascii_lowercase();
    if !version.starts_with('v') || !version[1..].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut chars = sku.chars();
    let family = chars.next()?;
    if !family.is_ascii_alphabetic() {
        return None;
    }
    let rest: String = chars.collect();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let suffix: String = rest[digits.len()..].to_ascii_lowercase();
    let suffix = if suffix.contains('s') {
        suffix
    } else {
        format!("{}s", suffix)
    };

    Some(format!(
        "Standard_{}{}{}_{}",
        family.to_ascii_uppercase(),
        digits,
        suffix,
        version
    ))
}

/// Canonicalize a region/location spelling for pricing lookups.
///
/// Empty input maps to the provider's primary region. Known display
/// names go through the alias table; anything else falls back to
/// lowercasing with whitespace removed, so two unrecognized-but-equal
/// spellings still collide to the same cache key.
pub fn normalize_region(provider: CloudProvider, raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return provider.default_region().to_string();
    }

    let aliases = match provider {
        CloudProvider::Aws => AWS_REGION_ALIASES,
        CloudProvider::Azure => AZURE_REGION_ALIASES,
        CloudProvider::Gcp => GCP_REGION_ALIASES,
    };
    if let Some((_, code)) = aliases.iter().find(|(name, _)| *name == lowered) {
        return (*code).to_string();
    }

    lowered.split_whitespace().collect()
}
