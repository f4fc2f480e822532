//! Shared types, error model, and configuration for wikiloot.
//!
//! This crate is the foundation depended on by all other wikiloot crates.
//! It provides:
//! - [`WikilootError`]: the unified error type
//! - Domain types ([`ItemRecord`], [`Rarity`], [`ItemCategory`], [`CatalogEntry`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, FetchSection, OutputSection, ParseSection, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, WikilootError};
pub use types::{CatalogEntry, EquipmentKind, ItemCategory, ItemRecord, Rarity};
