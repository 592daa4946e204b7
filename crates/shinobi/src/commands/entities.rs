//! Entity listing.

use tabled::Tabled;

use shinobi_core::{EntityKind, EntitySnapshot, Integration};

use crate::cli::{EntitiesArgs, EntityKindArg, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    unique_id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
}

pub(crate) fn entity_state(e: &EntitySnapshot) -> &str {
    if e.available {
        e.state.as_deref().unwrap_or("unknown")
    } else {
        "unavailable"
    }
}

fn matches_kind(kind: EntityKind, filter: Option<EntityKindArg>) -> bool {
    match filter {
        None => true,
        Some(EntityKindArg::Camera) => kind == EntityKind::Camera,
        Some(EntityKindArg::Sensor) => kind == EntityKind::Sensor,
        Some(EntityKindArg::Switch) => kind == EntityKind::Switch,
    }
}

pub fn handle(
    integration: &Integration,
    args: &EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let snapshots: Vec<EntitySnapshot> = integration
        .entities()
        .iter()
        .map(shinobi_core::MonitorEntity::snapshot)
        .filter(|s| matches_kind(s.kind, args.kind))
        .collect();

    let out = output::render_list(
        &global.output,
        &snapshots,
        |e| EntityRow {
            unique_id: e.unique_id.clone(),
            kind: e.kind.to_string(),
            name: e.name.clone(),
            state: output::paint_state(entity_state(e), color),
        },
        |e| e.unique_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
