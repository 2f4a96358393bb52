//! Configuration module for Papermule
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files for the harvester: catalog endpoint and paging, session identity,
//! pacing, retry, and output locations.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, OutputConfig, PacingConfig, PagingMode, RetryConfig, SessionConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
