//! eduplatform-client — HTTP transport, token storage and configuration.
//!
//! Implements the core `Backend` trait against the eduplatform REST API and
//! persists the session token on disk.

pub mod config;
pub mod http;
pub mod token;

pub use config::{create_backend, load_config_from, ClientConfig};
pub use http::HttpBackend;
pub use token::FileTokenStore;
