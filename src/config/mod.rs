//! Configuration Module
//!
//! Loads and validates configuration from TOML files with environment
//! overrides.

pub mod loader;

pub use loader::{
    load_config, parse_config, AccountAssociation, ApisSection, CacheSection, ChainSection,
    Config, ConfigError, LoggingSection, ManifestSection, ScanSection, ServerSection,
    WebhookSection,
};
