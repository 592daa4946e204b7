//! Snapshot and stream URL handlers.

use std::io::{IsTerminal, Write};

use bytesize::ByteSize;
use serde::Serialize;

use shinobi_core::{Entity, Integration};

use crate::cli::{GlobalOpts, SnapshotArgs, StreamArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StreamInfo {
    monitor: String,
    name: String,
    url: String,
}

pub async fn snapshot(
    integration: &Integration,
    args: SnapshotArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let camera = integration.camera(&args.monitor)?;

    if args.file.is_none() && std::io::stdout().is_terminal() {
        return Err(CliError::Validation {
            field: "file".into(),
            reason: "refusing to write JPEG data to a terminal; pass --file or redirect stdout"
                .into(),
        });
    }

    let image = camera
        .camera_image()
        .await
        .ok_or_else(|| CliError::NoImage {
            monitor: args.monitor.clone(),
        })?;

    match args.file {
        Some(path) => {
            std::fs::write(&path, &image)?;
            let size = ByteSize::b(image.len() as u64);
            output::print_output(
                &format!("Saved {size} snapshot of {} to {}", camera.name(), path.display()),
                global.quiet,
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&image)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub fn stream(
    integration: &Integration,
    args: &StreamArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let camera = integration.camera(&args.monitor)?;

    // Cameras configured for MJPEG advertise no stream source.
    let url = if args.mjpeg {
        camera.mjpeg_url()
    } else {
        camera.stream_source().unwrap_or_else(|| camera.mjpeg_url())
    };

    let info = StreamInfo {
        monitor: camera.monitor_id().to_string(),
        name: camera.name().to_owned(),
        url,
    };
    let out = output::render_single(&global.output, &info, |i| i.url.clone(), |i| i.url.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
