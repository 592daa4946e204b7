// ── Integration lifecycle ──
//
// One configured NVR: client + coordinator, created together on setup
// and torn down together on unload. Entities are built from here so each
// one receives the same client and coordinator handles.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shinobi_api::{MonitorId, ShinobiClient};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::coordinator::Coordinator;
use crate::entity::{self, MonitorCamera, MonitorEntity, RecordingSwitch, StatusSensor};
use crate::error::CoreError;

#[derive(Clone)]
pub struct Integration {
    config: ConnectionConfig,
    client: Arc<ShinobiClient>,
    coordinator: Coordinator,
}

impl Integration {
    /// Build the client, run the first refresh, and start polling.
    ///
    /// Fails if the first refresh fails; no poll task is left running.
    pub async fn setup(config: ConnectionConfig) -> Result<Self, CoreError> {
        let client = Arc::new(config.build_client()?);
        info!(url = %client.base_url(), "setting up Shinobi Video");

        let coordinator = Coordinator::new(Arc::clone(&client), config.poll_interval);
        coordinator.first_refresh().await?;
        coordinator.start().await;

        info!(
            monitors = coordinator.data().len(),
            "Shinobi Video set up"
        );
        Ok(Self {
            config,
            client,
            coordinator,
        })
    }

    /// Stop polling.
    pub async fn unload(&self) {
        self.coordinator.shutdown().await;
        info!("Shinobi Video unloaded");
    }

    /// Set up without periodic polling, run `f`, then unload.
    pub async fn oneshot<F, Fut, T>(config: ConnectionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Integration) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = Duration::ZERO;

        let integration = Self::setup(cfg).await?;
        let result = f(integration.clone()).await;
        integration.unload().await;
        result
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<ShinobiClient> {
        &self.client
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    // ── Entities ─────────────────────────────────────────────────────

    pub fn cameras(&self) -> Vec<MonitorCamera> {
        entity::cameras(&self.coordinator, &self.client, self.config.stream_type)
    }

    pub fn sensors(&self) -> Vec<StatusSensor> {
        entity::sensors(&self.coordinator)
    }

    pub fn switches(&self) -> Vec<RecordingSwitch> {
        entity::switches(&self.coordinator, &self.client)
    }

    pub fn entities(&self) -> Vec<MonitorEntity> {
        entity::all(&self.coordinator, &self.client, self.config.stream_type)
    }

    /// Resolve a monitor by id or name.
    pub fn resolve(&self, identifier: &str) -> Result<MonitorId, CoreError> {
        self.coordinator
            .data()
            .find(identifier)
            .map(|m| m.mid.clone())
            .ok_or_else(|| CoreError::MonitorNotFound {
                identifier: identifier.to_owned(),
            })
    }

    pub fn camera(&self, identifier: &str) -> Result<MonitorCamera, CoreError> {
        let id = self.resolve(identifier)?;
        let monitor = self.monitor_or_missing(&id)?;
        Ok(MonitorCamera::new(
            self.coordinator.clone(),
            Arc::clone(&self.client),
            &monitor,
            self.config.stream_type,
        ))
    }

    pub fn switch(&self, identifier: &str) -> Result<RecordingSwitch, CoreError> {
        let id = self.resolve(identifier)?;
        let monitor = self.monitor_or_missing(&id)?;
        Ok(RecordingSwitch::new(
            self.coordinator.clone(),
            Arc::clone(&self.client),
            &monitor,
        ))
    }

    fn monitor_or_missing(
        &self,
        id: &MonitorId,
    ) -> Result<Arc<shinobi_api::Monitor>, CoreError> {
        self.coordinator
            .monitor(id)
            .ok_or_else(|| CoreError::MonitorNotFound {
                identifier: id.to_string(),
            })
    }
}
