//! Application configuration.
//!
//! Defaults reproduce the stock demo. A YAML file may override any subset of
//! fields; command-line flags are applied on top by the binaries.

mod config;

pub use config::{AppConfig, ConfigError, SceneConfig, ShaderPaths, WindowConfig};
