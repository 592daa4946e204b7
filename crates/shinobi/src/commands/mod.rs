//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod entities;
pub mod media;
pub mod monitors;
pub mod util;
pub mod watch;
pub mod write;

use shinobi_core::{ConnectionConfig, Integration};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an NVR-bound command to the appropriate handler.
///
/// `test` validates without setting anything up and `watch` owns a
/// long-lived integration; everything else is one poll plus one action.
pub async fn dispatch(
    cmd: Command,
    conn: ConnectionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Test => test::handle(&conn, global).await,
        Command::Watch(args) => watch::handle(conn, args, global).await,
        cmd => {
            Integration::oneshot(conn, |integration| async move {
                Ok(run_oneshot(cmd, &integration, global).await)
            })
            .await?
        }
    }
}

async fn run_oneshot(
    cmd: Command,
    integration: &Integration,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Monitors(args) => monitors::handle(integration, args, global),
        Command::Entities(args) => entities::handle(integration, &args, global),
        Command::Snapshot(args) => media::snapshot(integration, args, global).await,
        Command::Stream(args) => media::stream(integration, &args, global),
        Command::Mode(args) => write::mode(integration, &args, global).await,
        Command::Record(args) => write::record(integration, &args, global).await,
        // Handled before the integration is set up
        Command::Test | Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
            unreachable!()
        }
    }
}
