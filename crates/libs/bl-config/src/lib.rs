//! Configuration management for the build lights watcher.
//!
//! Provides the TOML-facing user configuration and the validated configuration
//! consumed by the watcher service.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bl_config::{BlConfig, BlUserConfig};
//! use std::path::Path;
//!
//! let user_config = BlUserConfig::from_file(Path::new("blw.toml")).unwrap();
//! let config = BlConfig::from_user_config(user_config).unwrap();
//! ```

pub mod bl_build_set;
pub mod bl_config;
pub mod bl_device;
pub mod error;
pub mod prelude;

pub use bl_config::{BlConfig, BlUserConfig};
