//! Vela Core
//!
//! Configuration parsing and reference resolution for the vela cost
//! estimator: a tolerant scanner for a Terraform-style DSL, a typed
//! block model, and classification of resources into providers and
//! billing categories.

pub mod classify;
pub mod config;
pub mod resolver;
pub mod scanner;

pub use classify::{CloudProvider, ResourceCategory, ResourceSpec};
pub use config::{Block, BlockKind, Configuration, PropertyMap, RawValue};
pub use scanner::parse;
