//! Monitor command handlers.

use std::sync::Arc;

use tabled::Tabled;

use shinobi_core::{Integration, Monitor};

use super::util::{or_dash, resolve_monitor};
use crate::cli::{GlobalOpts, MonitorsArgs, MonitorsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct MonitorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Streams")]
    streams: usize,
}

fn to_row(m: &Arc<Monitor>, color: bool) -> MonitorRow {
    MonitorRow {
        id: m.mid.to_string(),
        name: m.display_name().to_owned(),
        status: output::paint_state(m.status.as_deref().unwrap_or("-"), color),
        mode: or_dash(m.mode.as_deref()),
        kind: or_dash(m.monitor_type.as_deref()),
        streams: m.streams.len(),
    }
}

fn detail(m: &Monitor) -> String {
    let mut pairs = vec![
        ("ID", m.mid.to_string()),
        ("Name", m.display_name().to_owned()),
        ("Status", or_dash(m.status.as_deref())),
        ("Mode", or_dash(m.mode.as_deref())),
        ("Type", or_dash(m.monitor_type.as_deref())),
        ("Group", or_dash(m.ke.as_deref())),
    ];
    for stream in &m.streams {
        pairs.push(("Stream", stream.clone()));
    }
    output::detail_lines(&pairs)
}

pub fn handle(
    integration: &Integration,
    args: MonitorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        MonitorsCommand::List => {
            let data = integration.coordinator().data();
            let monitors: Vec<Arc<Monitor>> = data.monitors().cloned().collect();
            let out = output::render_list(
                &global.output,
                &monitors,
                |m| to_row(m, color),
                |m| m.mid.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorsCommand::Get { monitor } => {
            let m = resolve_monitor(integration, &monitor)?;
            let out = output::render_single(
                &global.output,
                m.as_ref(),
                detail,
                |m| m.mid.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
