//! Shared types, error model, and configuration for Despachos.
//!
//! This crate is the foundation depended on by all other Despachos crates.
//! It provides:
//! - [`DespachosError`] — the unified error type
//! - Domain types ([`PersonRecord`], [`ResolvedEntry`], [`OfficeLookup`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DirectoryConfig, OutputConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, to_toml, validate,
};
pub use error::{DespachosError, Result};
pub use types::{OfficeLookup, PLACEHOLDER_OFFICE, PersonRecord, PersonnelResponse, ResolvedEntry};
