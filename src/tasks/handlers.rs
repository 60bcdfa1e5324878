// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{sync::mpsc::Sender, thread};

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    backend,
    config::AppConfig,
    disc::{DiscDescriptor, DiscIdentifier},
    drives::{DriveLocator, DriveStatus},
    events::{AppEvent, RipKind},
    ripper::{RipHandle, RipOrchestrator},
    tasks::TaskContext,
    video::{TitleInfo, TitleScanner, VideoRipper},
};

pub(super) fn update_config(ctx: &mut TaskContext, config: AppConfig) -> Result<()> {
    ctx.backend = backend::from_config(&config);
    ctx.config = config;
    debug!(backend = ctx.backend.name(), "configuration updated");

    Ok(())
}

pub(super) fn detect_drives(ctx: &mut TaskContext) -> Result<()> {
    let drives: Vec<DriveStatus> = DriveLocator::default()
        .detect_drives()
        .into_iter()
        .map(DriveStatus::probe)
        .collect();
    info!(count = drives.len(), "drive detection finished");
    ctx.event_tx.send(AppEvent::DrivesDetected(drives))?;

    Ok(())
}

pub(super) fn identify_disc(ctx: &mut TaskContext) -> Result<()> {
    let result = DiscIdentifier::new(&ctx.config, ctx.backend.clone()).identify();
    ctx.event_tx.send(AppEvent::DiscIdentified(result))?;

    Ok(())
}

pub(super) fn scan_titles(ctx: &mut TaskContext) -> Result<()> {
    let result = TitleScanner::new(&ctx.config, ctx.backend.clone()).scan();
    ctx.event_tx.send(AppEvent::TitlesScanned(result))?;

    Ok(())
}

pub(super) fn start_cd_rip(ctx: &mut TaskContext, disc: DiscDescriptor) -> Result<()> {
    match RipOrchestrator::new(&ctx.config, ctx.backend.clone()).rip(&disc) {
        Ok(handle) => forward_progress(RipKind::Cd, handle, ctx.event_tx.clone()),
        Err(e) => ctx.event_tx.send(AppEvent::RipRejected(e))?,
    }

    Ok(())
}

pub(super) fn start_title_rip(ctx: &mut TaskContext, title: TitleInfo) -> Result<()> {
    match VideoRipper::new(&ctx.config, ctx.backend.clone()).rip(&title) {
        Ok(handle) => forward_progress(RipKind::Video, handle, ctx.event_tx.clone()),
        Err(e) => ctx.event_tx.send(AppEvent::RipRejected(e))?,
    }

    Ok(())
}

/// Relays a running session's progress into the UI event channel until the
/// stream ends, then reports the session's final state.
fn forward_progress(kind: RipKind, handle: RipHandle, event_tx: Sender<AppEvent>) {
    if event_tx
        .send(AppEvent::RipStarted(kind, handle.cancel_token()))
        .is_err()
    {
        handle.cancel();
        return;
    }

    thread::spawn(move || {
        while let Ok(event) = handle.progress.recv() {
            let terminal = event.is_terminal();
            if event_tx.send(AppEvent::RipProgress(event)).is_err() {
                handle.cancel();
                break;
            }
            if terminal {
                break;
            }
        }

        if !handle.state().is_finished() {
            debug!(?kind, "progress stream ended before the tool exited");
        }
        let state = handle.wait();
        info!(?kind, ?state, "rip finished");
        let _ = event_tx.send(AppEvent::RipFinished(state));
    });
}
