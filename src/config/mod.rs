//! Configuration module for onyx-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use onyx_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler delay: {}ms", config.crawler.delay_ms);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, GithubConfig, OutputConfig, SiteEntry, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
