use shinobi_api::{Monitor, MonitorId};

use super::{Attributes, Entity, EntityKind};
use crate::coordinator::Coordinator;

/// Reports a monitor's NVR status string (`recording`, `watching`, ...).
pub struct StatusSensor {
    coordinator: Coordinator,
    monitor_id: MonitorId,
    name: String,
}

impl StatusSensor {
    pub fn new(coordinator: Coordinator, monitor: &Monitor) -> Self {
        Self {
            coordinator,
            monitor_id: monitor.mid.clone(),
            name: format!("{} Status", monitor.display_name()),
        }
    }
}

impl Entity for StatusSensor {
    fn kind(&self) -> EntityKind {
        EntityKind::Sensor
    }

    fn monitor_id(&self) -> &MonitorId {
        &self.monitor_id
    }

    fn unique_id(&self) -> String {
        format!("shinobi_{}_status", self.monitor_id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn state(&self) -> Option<String> {
        self.monitor()?.status.clone()
    }

    fn attributes(&self) -> Attributes {
        let Some(monitor) = self.monitor() else {
            return Attributes::new();
        };

        let mut attrs = Attributes::new();
        attrs.insert("mid".into(), monitor.mid.as_str().into());
        attrs.insert("type".into(), monitor.monitor_type.clone().into());
        attrs.insert("mode".into(), monitor.mode.clone().into());
        if let Some(url) = monitor.first_stream() {
            attrs.insert("stream_url".into(), url.into());
        }
        attrs
    }
}
