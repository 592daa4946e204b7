use std::sync::Arc;

use shinobi_api::{Monitor, MonitorId, MonitorMode, ShinobiClient};
use tracing::{info, warn};

use super::{Entity, EntityKind};
use crate::coordinator::Coordinator;

/// Toggles a monitor between `record` and `watch` modes.
pub struct RecordingSwitch {
    coordinator: Coordinator,
    client: Arc<ShinobiClient>,
    monitor_id: MonitorId,
    name: String,
}

impl RecordingSwitch {
    pub const ICON: &'static str = "mdi:record-rec";

    pub fn new(coordinator: Coordinator, client: Arc<ShinobiClient>, monitor: &Monitor) -> Self {
        Self {
            coordinator,
            client,
            monitor_id: monitor.mid.clone(),
            name: format!("{} Recording", monitor.display_name()),
        }
    }

    /// `true` when the monitor's mode is `record`.
    pub fn is_on(&self) -> bool {
        self.monitor().is_some_and(|m| m.is_record_mode())
    }

    /// Switch the monitor to `record`.
    pub async fn turn_on(&self) -> bool {
        self.set_mode(MonitorMode::Record).await
    }

    /// Switch the monitor back to `watch`.
    pub async fn turn_off(&self) -> bool {
        self.set_mode(MonitorMode::Watch).await
    }

    /// Returns whether the NVR accepted the change. Only an accepted change
    /// triggers a refresh.
    async fn set_mode(&self, mode: MonitorMode) -> bool {
        if !self.client.set_mode(&self.monitor_id, mode).await {
            warn!(monitor = %self.monitor_id, %mode, "mode change rejected");
            return false;
        }
        info!(monitor = %self.monitor_id, %mode, "mode changed");
        self.coordinator.request_refresh().await;
        true
    }
}

impl Entity for RecordingSwitch {
    fn kind(&self) -> EntityKind {
        EntityKind::Switch
    }

    fn monitor_id(&self) -> &MonitorId {
        &self.monitor_id
    }

    fn unique_id(&self) -> String {
        format!("shinobi_{}_recording", self.monitor_id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn icon(&self) -> Option<&'static str> {
        Some(Self::ICON)
    }

    fn state(&self) -> Option<String> {
        let monitor = self.monitor()?;
        Some(if monitor.is_record_mode() { "on" } else { "off" }.to_owned())
    }
}
