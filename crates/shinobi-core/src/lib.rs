//! Polling and entity layer between `shinobi-api` and its consumers.
//!
//! - **[`Coordinator`]**: Periodic poll of the NVR's monitor list. Keeps the
//!   last successful [`MonitorMap`] as a lock-free `Arc` snapshot, marks
//!   itself failed (but keeps the stale map) when a poll errors, and bumps a
//!   `watch` version counter after every attempt.
//!
//! - **Entities** ([`entity`]): [`MonitorCamera`], [`StatusSensor`] and
//!   [`RecordingSwitch`]: read projections over the coordinator's current map,
//!   plus the switch's write path (mode change, then out-of-band refresh).
//!
//! - **[`Integration`]**: One configured NVR connection: builds the client
//!   and coordinator, runs the first refresh, starts polling, hands both to
//!   every entity it creates, and tears the poller down on unload.
//!
//! - **Setup** ([`setup`]): One-shot credential validation that buckets
//!   failures into `cannot_connect` / `invalid_auth` / `unknown`.

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod integration;
pub mod setup;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, DEFAULT_POLL_INTERVAL};
pub use coordinator::{Coordinator, PollState};
pub use entity::{
    Attributes, Entity, EntityKind, EntitySnapshot, MonitorCamera, MonitorEntity,
    RecordingSwitch, StatusSensor,
};
pub use error::CoreError;
pub use integration::Integration;
pub use setup::{ConfigFlow, FlowResult, SetupError, SetupInfo, UserInput};
pub use store::MonitorMap;

// Re-export wire types so consumers need only this crate.
pub use shinobi_api::{ErrorKind, Monitor, MonitorId, MonitorMode, ShinobiClient, StreamType};
