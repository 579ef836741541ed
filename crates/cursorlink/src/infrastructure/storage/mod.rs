//! Persistent settings.
//!
//! - **`config`** – loads `config.toml` into [`config::AppConfig`] and turns it
//!   into the settings structs the serial port and the streaming loop take.

pub mod config;

pub use config::{load_config, AppConfig, ConfigError};
