// shinobi-api: Async Rust client for the Shinobi Video NVR HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{ShinobiClient, StreamType};
pub use error::{Error, ErrorKind};
pub use models::{Monitor, MonitorId, MonitorMode};
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
