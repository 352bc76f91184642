//! Resolver - follow symbolic references to concrete values
//!
//! A bare token like `azurerm_resource_group.main.location` points at
//! another block's attribute; `var.location` points at a variable
//! default. Resolution recurses through chained references up to a
//! fixed hop bound, and every failure mode yields `None` ("unresolved")
//! rather than an error.

use crate::config::{Configuration, RawValue};

/// Maximum reference hops before a chain is declared unresolved.
/// Guarantees termination on self- or mutually-referential input.
pub const MAX_REFERENCE_HOPS: usize = 10;

/// Resolve a raw value to a concrete string, following references.
///
/// Literals (no dot, no variable marker) short-circuit without any
/// block search. Lists and maps are returned verbatim: they are never
/// reference-shaped.
pub fn resolve(config: &Configuration, value: &RawValue) -> Option<String> {
    resolve_raw(config, value, 0)
}

/// Resolve raw text (the content of a bare token) to a concrete string.
pub fn resolve_text(config: &Configuration, raw: &str) -> Option<String> {
    resolve_inner(config, raw, 0)
}

fn resolve_raw(config: &Configuration, value: &RawValue, depth: usize) -> Option<String> {
    match value {
        // A quoted string is a literal unless it interpolates.
        RawValue::Str(s) if s.contains("${") => resolve_inner(config, s, depth),
        RawValue::Str(s) => Some(s.clone()),
        RawValue::Bare(s) => resolve_inner(config, s, depth),
        RawValue::List(s) | RawValue::Map(s) => Some(s.clone()),
    }
}

fn resolve_inner(config: &Configuration, raw: &str, depth: usize) -> Option<String> {
    let mut trimmed = raw.trim();

    // The common case: a plain literal. Must not touch the block list.
    if !trimmed.contains('.') && !trimmed.contains("${") {
        return Some(trimmed.to_string());
    }

    if depth >= MAX_REFERENCE_HOPS {
        tracing::warn!(reference = raw, "reference chain exceeded hop bound, unresolved");
        return None;
    }

    if let Some(inner) = trimmed
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        trimmed = inner.trim();
    }

    if let Some(name) = trimmed.strip_prefix("var.") {
        if !is_identifier(name) {
            return Some(trimmed.to_string());
        }
        let variable = config.find_variable(name)?;
        let default = variable.property("default")?;
        return resolve_raw(config, default, depth + 1);
    }

    let segments: Vec<&str> = trimmed.split('.').collect();
    if segments.len() < 3 || !segments.iter().all(|s| is_identifier(s)) {
        // A stray-dot literal such as an IP address or version string.
        return Some(trimmed.to_string());
    }

    let block = config.find_resource(segments[0], segments[1])?;
    let attribute = segments[2..].join(".");
    let found = block
        .property(&attribute)
        .or_else(|| block.property(segments[2]))?;
    resolve_raw(config, found, depth + 1)
}

/// Identifier shape: letter or underscore, then alphanumerics,
/// underscores, or hyphens. Digits-first segments (`10.0.0.0`) fail.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
