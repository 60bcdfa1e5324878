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

use tracing::{info, warn};

use crate::{
    ActiveRip, App, StatusKind,
    disc::DiscDescriptor,
    drives::DriveStatus,
    error::RipError,
    events::RipKind,
    ripper::{CancelToken, ProgressEvent, RipState},
    video::TitleInfo,
};

/// Status-bar wording for a failed operation.
pub(super) fn describe_error(e: &RipError) -> String {
    match e {
        RipError::ToolUnavailable { .. } => {
            format!("{e}. Install it, or enable demo mode in Settings")
        }
        RipError::Cancelled => "Operation cancelled".to_string(),
        _ => e.to_string(),
    }
}

pub(super) fn handle_drives_detected(app: &mut App, drives: Vec<DriveStatus>) {
    app.busy = false;
    app.drives = drives;

    let configured = app.config.drives.cd_drive.clone();
    if app.drives.is_empty() {
        app.set_status(StatusKind::Error, "No optical drives found");
    } else if configured.is_empty() {
        if app.config.drives.auto_detect {
            let device = app.drives[0].info.device.clone();
            let mut config = app.config.clone();
            config.drives.cd_drive = device.clone();
            config.drives.available = app.drives.iter().map(|d| d.info.device.clone()).collect();
            if let Err(e) = app.apply_config(config, format!("Using drive {device}")) {
                warn!("could not apply detected drive: {e:#}");
            }
        } else {
            app.set_status(StatusKind::Info, "No CD drive configured, choose one in Settings");
        }
    } else if !app.drives.iter().any(|d| d.info.device == configured) {
        app.set_status(
            StatusKind::Error,
            format!("Configured drive {configured} was not found"),
        );
    } else {
        let count = app.drives.len();
        let plural = if count == 1 { "" } else { "s" };
        app.set_status(StatusKind::Info, format!("Found {count} drive{plural}"));
    }
}

pub(super) fn handle_disc_identified(app: &mut App, result: Result<DiscDescriptor, RipError>) {
    app.busy = false;
    match result {
        Ok(disc) => {
            info!(%disc, disc_id = %disc.disc_id, "disc identified");
            let message = match &disc.metadata_source {
                Some(source) => format!("Found {disc}, metadata from {source}"),
                None => format!("Found {disc}"),
            };
            app.disc = Some(disc);
            app.rip_state = RipState::Idle;
            app.progress = None;
            app.set_status(StatusKind::Success, message);
        }
        Err(e) => {
            warn!("identification failed: {e}");
            app.disc = None;
            app.set_status(StatusKind::Error, describe_error(&e));
        }
    }
}

pub(super) fn handle_titles_scanned(app: &mut App, result: Result<Vec<TitleInfo>, RipError>) {
    app.busy = false;
    app.confirm_title = None;
    app.title_index = 0;
    match result {
        Ok(titles) => {
            let count = titles.len();
            app.titles = titles;
            app.set_status(StatusKind::Success, format!("Found {count} titles"));
        }
        Err(e) => {
            warn!("title scan failed: {e}");
            app.titles.clear();
            app.set_status(StatusKind::Error, describe_error(&e));
        }
    }
}

pub(super) fn handle_rip_started(app: &mut App, kind: RipKind, cancel: CancelToken) {
    app.busy = false;
    app.active_rip = Some(ActiveRip { kind, cancel });
    app.rip_state = RipState::Running;
    app.set_status(StatusKind::Busy, "Ripping...");
}

pub(super) fn handle_rip_progress(app: &mut App, event: ProgressEvent) {
    if let Some(e) = &event.error {
        app.set_status(StatusKind::Error, describe_error(e));
    } else if !event.status.is_empty() {
        let kind = if event.progress >= 100 {
            StatusKind::Success
        } else {
            StatusKind::Busy
        };
        app.set_status(kind, event.status.clone());
    }
    app.progress = Some(event);
}

pub(super) fn handle_rip_finished(app: &mut App, state: RipState) {
    let kind = app.active_rip.take().map(|rip| rip.kind);
    app.rip_state = state;
    let reported = app.progress.as_ref().and_then(|p| p.error.as_ref());

    match state {
        RipState::Completed => {
            let dir = match kind {
                Some(RipKind::Video) => &app.config.paths.movies,
                _ => &app.config.paths.music,
            };
            let (kind, message) = match reported {
                Some(e) => (
                    StatusKind::Error,
                    format!(
                        "Rip complete with errors ({}), files saved under {}",
                        describe_error(e),
                        dir.display()
                    ),
                ),
                None => (
                    StatusKind::Success,
                    format!("Rip complete, files saved under {}", dir.display()),
                ),
            };
            app.set_status(kind, message);
        }
        RipState::Cancelled => app.set_status(StatusKind::Info, "Rip cancelled"),
        RipState::Failed => {
            if reported.is_none() {
                app.set_status(StatusKind::Error, "Rip failed, see the log for details");
            }
        }
        RipState::Idle | RipState::Starting | RipState::Running => {}
    }
}

pub(super) fn handle_rip_rejected(app: &mut App, e: RipError) {
    warn!("rip could not start: {e}");
    app.busy = false;
    app.rip_state = RipState::Failed;
    app.set_status(StatusKind::Error, describe_error(&e));
}

pub(super) fn handle_error(app: &mut App, message: String) {
    app.busy = false;
    app.set_status(StatusKind::Error, message);
}

pub(super) fn handle_tick(app: &mut App) {
    app.tick = app.tick.wrapping_add(1);
}
