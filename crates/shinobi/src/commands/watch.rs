//! `shinobi watch`: keep an integration running and print entity state
//! changes after every poll.

use std::collections::HashMap;

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info};

use shinobi_core::{ConnectionConfig, DEFAULT_POLL_INTERVAL, EntitySnapshot, Integration};

use super::entities::entity_state;
use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Change {
    at: String,
    entity: String,
    from: Option<String>,
    to: String,
}

pub async fn handle(
    mut conn: ConnectionConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if conn.poll_interval.is_zero() {
        conn.poll_interval = DEFAULT_POLL_INTERVAL;
    }
    info!(interval_secs = conn.poll_interval.as_secs(), "watching NVR");

    let integration = Integration::setup(conn).await?;
    let result = watch_loop(&integration, &args, global).await;
    integration.unload().await;
    result
}

async fn watch_loop(
    integration: &Integration,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut rx = integration.coordinator().subscribe();
    rx.mark_unchanged();

    // Initial state is reported as changes from nothing.
    let mut last: HashMap<String, String> = HashMap::new();
    emit(&diff(&mut last, &snapshots(integration)), global, color);

    let mut polls = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                emit(&diff(&mut last, &snapshots(integration)), global, color);
                polls += 1;
                if args.count > 0 && polls >= args.count {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn snapshots(integration: &Integration) -> Vec<EntitySnapshot> {
    integration.entities().iter().map(shinobi_core::MonitorEntity::snapshot).collect()
}

/// Update `last` and return the entities whose state string changed.
fn diff(last: &mut HashMap<String, String>, current: &[EntitySnapshot]) -> Vec<Change> {
    let at = Local::now().format("%H:%M:%S").to_string();
    let mut changes = Vec::new();
    for entity in current {
        let state = entity_state(entity).to_owned();
        let previous = last.insert(entity.unique_id.clone(), state.clone());
        if previous.as_deref() != Some(state.as_str()) {
            changes.push(Change {
                at: at.clone(),
                entity: entity.unique_id.clone(),
                from: previous,
                to: state,
            });
        }
    }
    changes
}

fn emit(changes: &[Change], global: &GlobalOpts, color: bool) {
    for change in changes {
        let line = match global.output {
            OutputFormat::Table | OutputFormat::Plain => format!(
                "{}  {}  {} -> {}",
                change.at,
                change.entity,
                change.from.as_deref().unwrap_or("-"),
                output::paint_state(&change.to, color),
            ),
            // One record per line so the stream stays parseable.
            _ => output::render_single(&OutputFormat::JsonCompact, change, |_| String::new(), |_| String::new()),
        };
        output::print_output(&line, global.quiet);
    }
}
