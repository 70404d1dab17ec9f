//! Configuration module for the apabi-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{BookConfig, Config, OptionsConfig, SiteConfig};
pub use validation::validate_config;
