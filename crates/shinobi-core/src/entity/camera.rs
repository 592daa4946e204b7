use std::sync::Arc;

use bytes::Bytes;
use shinobi_api::{Monitor, MonitorId, ShinobiClient, StreamType};

use super::{Attributes, Entity, EntityKind};
use crate::coordinator::Coordinator;

pub const BRAND: &str = "Shinobi";

/// Camera entity for one monitor: stills, live stream URL and recording
/// state.
pub struct MonitorCamera {
    coordinator: Coordinator,
    client: Arc<ShinobiClient>,
    monitor_id: MonitorId,
    name: String,
    model: Option<String>,
    stream_type: StreamType,
}

impl MonitorCamera {
    pub fn new(
        coordinator: Coordinator,
        client: Arc<ShinobiClient>,
        monitor: &Monitor,
        stream_type: StreamType,
    ) -> Self {
        Self {
            coordinator,
            client,
            monitor_id: monitor.mid.clone(),
            name: monitor.display_name().to_owned(),
            model: monitor.monitor_type.clone(),
            stream_type,
        }
    }

    /// Only HLS cameras advertise a stream.
    pub fn supports_stream(&self) -> bool {
        self.stream_type == StreamType::Hls
    }

    pub fn is_recording(&self) -> bool {
        self.monitor().is_some_and(|m| m.is_recording())
    }

    /// Fetch a still image. `None` on any failure.
    pub async fn camera_image(&self) -> Option<Bytes> {
        self.client.fetch_snapshot(&self.monitor_id).await
    }

    /// Live stream URL, preferring the first path the NVR reports.
    pub fn stream_source(&self) -> Option<String> {
        if !self.supports_stream() {
            return None;
        }
        let monitor = self.monitor();
        let preferred = monitor.as_deref().and_then(Monitor::first_stream);
        Some(self.client.stream_url(&self.monitor_id, preferred))
    }

    pub fn snapshot_url(&self) -> String {
        self.client.snapshot_url(&self.monitor_id)
    }

    pub fn mjpeg_url(&self) -> String {
        self.client.mjpeg_url(&self.monitor_id)
    }
}

impl Entity for MonitorCamera {
    fn kind(&self) -> EntityKind {
        EntityKind::Camera
    }

    fn monitor_id(&self) -> &MonitorId {
        &self.monitor_id
    }

    fn unique_id(&self) -> String {
        format!("shinobi_{}", self.monitor_id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn state(&self) -> Option<String> {
        let monitor = self.monitor()?;
        Some(if monitor.is_recording() { "recording" } else { "idle" }.to_owned())
    }

    fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("brand".into(), BRAND.into());
        attrs.insert(
            "model".into(),
            self.model.as_deref().unwrap_or("Unknown").into(),
        );
        attrs.insert("stream_type".into(), self.stream_type.as_ref().into());
        attrs
    }
}
