// ── Monitor entities ──
//
// Per-monitor projections over the coordinator's current map. Entities
// hold only the monitor id and the name captured at creation; everything
// else is read from the latest snapshot on each access.

mod camera;
mod sensor;
mod switch;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use shinobi_api::{Monitor, MonitorId, ShinobiClient, StreamType};
use tracing::warn;

use crate::coordinator::Coordinator;

pub use camera::MonitorCamera;
pub use sensor::StatusSensor;
pub use switch::RecordingSwitch;

/// State attributes, ordered by key for stable output.
pub type Attributes = BTreeMap<String, serde_json::Value>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Camera,
    Sensor,
    Switch,
}

/// Shared read surface of every monitor entity.
pub trait Entity {
    fn kind(&self) -> EntityKind;

    fn monitor_id(&self) -> &MonitorId;

    /// Stable identifier, derived from the monitor id.
    fn unique_id(&self) -> String;

    fn name(&self) -> &str;

    fn coordinator(&self) -> &Coordinator;

    /// Entity state string, or `None` when the monitor has gone missing.
    fn state(&self) -> Option<String>;

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    fn icon(&self) -> Option<&'static str> {
        None
    }

    /// The monitor's record in the current snapshot.
    fn monitor(&self) -> Option<Arc<Monitor>> {
        self.coordinator().monitor(self.monitor_id())
    }

    fn available(&self) -> bool {
        self.coordinator().last_update_success() && self.monitor().is_some()
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            unique_id: self.unique_id(),
            kind: self.kind(),
            name: self.name().to_owned(),
            monitor_id: self.monitor_id().clone(),
            state: self.state(),
            available: self.available(),
            icon: self.icon(),
            attributes: self.attributes(),
        }
    }
}

/// Point-in-time, serialisable view of an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub unique_id: String,
    pub kind: EntityKind,
    pub name: String,
    pub monitor_id: MonitorId,
    pub state: Option<String>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    pub attributes: Attributes,
}

/// Any of the three entity variants.
pub enum MonitorEntity {
    Camera(MonitorCamera),
    Sensor(StatusSensor),
    Switch(RecordingSwitch),
}

impl MonitorEntity {
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            Self::Camera(e) => e,
            Self::Sensor(e) => e,
            Self::Switch(e) => e,
        }
    }

    pub fn as_switch(&self) -> Option<&RecordingSwitch> {
        match self {
            Self::Switch(e) => Some(e),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        self.as_entity().snapshot()
    }
}

// ── Platform setup ───────────────────────────────────────────────────
//
// One entity per monitor in the coordinator's current map, in NVR order.

pub fn cameras(
    coordinator: &Coordinator,
    client: &Arc<ShinobiClient>,
    stream_type: StreamType,
) -> Vec<MonitorCamera> {
    coordinator
        .data()
        .monitors()
        .map(|m| MonitorCamera::new(coordinator.clone(), Arc::clone(client), m, stream_type))
        .collect()
}

pub fn sensors(coordinator: &Coordinator) -> Vec<StatusSensor> {
    let data = coordinator.data();
    if data.is_empty() {
        warn!("no monitors found, status sensors not created");
        return Vec::new();
    }
    data.monitors()
        .map(|m| StatusSensor::new(coordinator.clone(), m))
        .collect()
}

pub fn switches(coordinator: &Coordinator, client: &Arc<ShinobiClient>) -> Vec<RecordingSwitch> {
    coordinator
        .data()
        .monitors()
        .map(|m| RecordingSwitch::new(coordinator.clone(), Arc::clone(client), m))
        .collect()
}

/// Every entity across all three platforms.
pub fn all(
    coordinator: &Coordinator,
    client: &Arc<ShinobiClient>,
    stream_type: StreamType,
) -> Vec<MonitorEntity> {
    let mut out = Vec::new();
    out.extend(sensors(coordinator).into_iter().map(MonitorEntity::Sensor));
    out.extend(
        cameras(coordinator, client, stream_type)
            .into_iter()
            .map(MonitorEntity::Camera),
    );
    out.extend(
        switches(coordinator, client)
            .into_iter()
            .map(MonitorEntity::Switch),
    );
    out
}
