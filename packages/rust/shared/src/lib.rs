//! Shared types, error model, and configuration for the flora aggregator.
//!
//! This crate is the foundation depended on by all other flora crates.
//! It provides:
//! - [`FloraError`] — the unified error type
//! - Domain types ([`Entry`], [`AggregateResult`], [`FloraSummary`])
//! - Configuration ([`AppConfig`], [`CandidateTemplate`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CandidateTemplate, EnrichmentConfig, FolderTag, PathsConfig, REPO_PLACEHOLDER,
    RemoteConfig, config_dir, config_file_path, default_candidates, init_config, init_config_at,
    load_config, load_config_from, resolve_config,
};
pub use error::{FloraError, Result};
pub use types::{AggregateResult, Entry, FloraSummary, herb_id};
