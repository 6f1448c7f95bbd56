// proxmon-api: Async Rust client for the proxy-monitoring backend REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod groups;
mod monitoring;
mod proxies;
mod sessions;

pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
