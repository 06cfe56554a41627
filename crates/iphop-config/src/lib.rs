//! Client configuration for the ip-hop dashboard.
//!
//! A single TOML file, `client.toml`, in the user config directory:
//!
//! ```toml
//! server = "http://nas.lan:8001"
//! username = "admin"
//! timeout_secs = 30
//! expiry_redirect_delay_ms = 2000
//! ```
//!
//! Every key is optional; a missing file means defaults.

pub mod client;
pub mod discovery;
pub mod error;

pub use client::{
    ClientConfig, DEFAULT_EXPIRY_REDIRECT_DELAY_MS, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS,
    client_config_path, load_client_config, load_client_config_from, save_client_config,
    save_client_config_to,
};
pub use discovery::{CONFIG_DIR_ENV, log_dir, xdg_config_dir};
pub use error::{ConfigError, Result};
