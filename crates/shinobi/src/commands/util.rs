//! Shared helpers for command handlers.

use std::sync::Arc;

use shinobi_core::{Integration, Monitor};

use crate::error::CliError;

/// Resolve a monitor by id or name from the integration's current map.
pub fn resolve_monitor(integration: &Integration, identifier: &str) -> Result<Arc<Monitor>, CliError> {
    integration
        .coordinator()
        .data()
        .find(identifier)
        .cloned()
        .ok_or_else(|| CliError::MonitorNotFound {
            identifier: identifier.into(),
        })
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// `-` for absent optional fields in tables.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}
