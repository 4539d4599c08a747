//! Configuration module for the scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; `Config::default()` targets open-ephys.org.
//!
//! # Example
//!
//! ```no_run
//! use ephys_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Crawl starts at: {}", config.site.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, NavigationConfig, NavigatorBackend, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
