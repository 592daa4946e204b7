//! Mode and recording-switch writes. Both re-poll after an accepted change
//! so the printed state reflects the NVR.

use serde::Serialize;

use shinobi_core::{Entity, Integration, MonitorMode};

use super::util::resolve_monitor;
use crate::cli::{GlobalOpts, ModeArg, ModeCmdArgs, RecordArgs, SwitchState};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct WriteResult {
    monitor: String,
    requested: String,
    mode: Option<String>,
    status: Option<String>,
}

impl From<ModeArg> for MonitorMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Record => MonitorMode::Record,
            ModeArg::Watch => MonitorMode::Watch,
            ModeArg::Stop => MonitorMode::Stop,
            ModeArg::Start => MonitorMode::Start,
        }
    }
}

pub async fn mode(
    integration: &Integration,
    args: &ModeCmdArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let monitor = resolve_monitor(integration, &args.monitor)?;
    let mode = MonitorMode::from(args.mode);

    if !integration.client().set_mode(&monitor.mid, mode).await {
        return Err(CliError::ModeRejected {
            monitor: monitor.mid.to_string(),
            mode: mode.to_string(),
        });
    }
    integration.coordinator().request_refresh().await;

    print_result(integration, &args.monitor, &mode.to_string(), global)
}

pub async fn record(
    integration: &Integration,
    args: &RecordArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let switch = integration.switch(&args.monitor)?;

    let (accepted, requested) = match args.state {
        SwitchState::On => (switch.turn_on().await, MonitorMode::Record),
        SwitchState::Off => (switch.turn_off().await, MonitorMode::Watch),
    };
    if !accepted {
        return Err(CliError::ModeRejected {
            monitor: switch.monitor_id().to_string(),
            mode: requested.to_string(),
        });
    }

    print_result(integration, &args.monitor, &requested.to_string(), global)
}

fn print_result(
    integration: &Integration,
    identifier: &str,
    requested: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let monitor = resolve_monitor(integration, identifier)?;
    let result = WriteResult {
        monitor: monitor.mid.to_string(),
        requested: requested.to_owned(),
        mode: monitor.mode.clone(),
        status: monitor.status.clone(),
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &result,
        |r| {
            format!(
                "{} -> {} (mode: {}, status: {})",
                r.monitor,
                r.requested,
                r.mode.as_deref().unwrap_or("-"),
                output::paint_state(r.status.as_deref().unwrap_or("-"), color),
            )
        },
        |r| r.mode.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
