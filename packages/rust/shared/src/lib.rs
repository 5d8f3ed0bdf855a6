//! Shared types, error model, and configuration for cyclusgen.
//!
//! This crate is the foundation depended on by all other cyclusgen crates.
//! It provides:
//! - [`CyclusGenError`], the unified error type
//! - Domain types ([`ReactorRecord`], [`Lifecycle`], [`FleetUnit`])
//! - Configuration ([`AppConfig`], [`ScenarioConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_EXCLUDED_STATUS, DEFAULT_MIN_CAPACITY_MWE, FilterConfig, FleetConfig,
    ScenarioConfig, ScenarioDefaults, SpecialModes, TemplatesConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{CyclusGenError, Result};
pub use types::{Coordinates, FleetUnit, Lifecycle, ReactorRecord};
