// ── Monitor map ──
//
// Immutable snapshot of one poll: monitors keyed by id, in the order the
// NVR listed them. The coordinator swaps whole maps; nothing mutates one
// after it is built.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use shinobi_api::{Monitor, MonitorId};

/// Monitors from a single successful poll, keyed by [`MonitorId`].
///
/// When the NVR lists the same id twice, the later record wins but keeps
/// the position of the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonitorMap(IndexMap<MonitorId, Arc<Monitor>>);

impl MonitorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_monitors(monitors: impl IntoIterator<Item = Monitor>) -> Self {
        let mut map = IndexMap::new();
        for monitor in monitors {
            map.insert(monitor.mid.clone(), Arc::new(monitor));
        }
        Self(map)
    }

    pub fn get(&self, id: &MonitorId) -> Option<&Arc<Monitor>> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &MonitorId) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &MonitorId> {
        self.0.keys()
    }

    pub fn monitors(&self) -> impl Iterator<Item = &Arc<Monitor>> {
        self.0.values()
    }

    /// Resolve a monitor by id, falling back to an exact then
    /// case-insensitive name match.
    pub fn find(&self, identifier: &str) -> Option<&Arc<Monitor>> {
        self.get(&MonitorId::from(identifier))
            .or_else(|| self.monitors().find(|m| m.name == identifier))
            .or_else(|| {
                self.monitors()
                    .find(|m| m.name.eq_ignore_ascii_case(identifier))
            })
    }
}

impl FromIterator<Monitor> for MonitorMap {
    fn from_iter<I: IntoIterator<Item = Monitor>>(iter: I) -> Self {
        Self::from_monitors(iter)
    }
}
