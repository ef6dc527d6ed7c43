//! User accounts service
//!
//! Registration, access-token issuance, profile retrieval and updates, and
//! avatar uploads to a media host, served over actix-web.

pub mod auth;
pub mod config;
pub mod health;
pub mod media;
pub mod server;
pub mod types;
pub mod user;
pub mod utils;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "user-accounts";
