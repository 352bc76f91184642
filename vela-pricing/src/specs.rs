//! Specs - hardware metadata for common VM sizes
//!
//! Used to enrich quote descriptions; pricing never depends on it.

/// (canonical size, vCPU, RAM in GB)
const AZURE_VM_SPECS: &[(&str, u32, f64)] = &[
    ("Standard_B1s", 1, 1.0),
    ("Standard_B2s", 2, 4.0),
    ("Standard_B4ms", 4, 16.0),
    ("Standard_D2s_v3", 2, 8.0),
    ("Standard_D4s_v3", 4, 16.0),
    ("Standard_D8s_v3", 8, 32.0),
    ("Standard_D16s_v3", 16, 64.0),
    ("Standard_D32s_v3", 32, 128.0),
    ("Standard_D2s_v4", 2, 8.0),
    ("Standard_D4s_v4", 4, 16.0),
    ("Standard_D8s_v4", 8, 32.0),
    ("Standard_D16s_v4", 16, 64.0),
    ("Standard_D32s_v4", 32, 128.0),
    ("Standard_D32a_v4", 32, 128.0),
    ("Standard_E2s_v3", 2, 16.0),
    ("Standard_E4s_v3", 4, 32.0),
    ("Standard_E8s_v3", 8, 64.0),
    ("Standard_E16s_v3", 16, 128.0),
    ("Standard_E32s_v3", 32, 256.0),
];

/// Hardware specs for a canonical VM size, when known.
pub fn vm_specs(instance_id: &str) -> Option<(u32, f64)> {
    AZURE_VM_SPECS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(instance_id))
        .map(|(_, vcpu, ram)| (*vcpu, *ram))
}

/// Short human-readable suffix like ` (2 vCPU, 8 GB RAM)`, or empty
/// when the size is unknown.
pub fn describe(instance_id: &str) -> String {
    match vm_specs(instance_id) {
        Some((vcpu, ram)) => format!(" ({} vCPU, {} GB RAM)", vcpu, ram),
        None => String::new(),
    }
}
