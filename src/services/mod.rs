//! Business logic services for the iFlow proxy.
//!
//! This module contains service layer components, such as the
//! model alias table used to pick the upstream model.

pub mod model_alias;

// Re-export commonly used types
pub use model_alias::{ModelAliasTable, DEFAULT_UPSTREAM_MODEL};
