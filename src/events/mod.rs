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

//! Application events and the main event loop.
//!
//! Key presses, ticks and the results of background tasks all arrive on one
//! channel. Each event updates the [`App`] state, then the frame is redrawn.

mod handlers;
mod key_handlers;
use handlers::*;
use key_handlers::process_key_event;

use std::{
    io::Stdout,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{Terminal, prelude::CrosstermBackend};
use tracing::{info, warn};

use crate::{
    App,
    disc::DiscDescriptor,
    drives::DriveStatus,
    error::RipError,
    render::draw,
    ripper::{CancelToken, ProgressEvent, RipState},
    video::TitleInfo,
};

/// Longest wait on exit for a cancelled rip to stop its tool.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Which flow a running rip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RipKind {
    Cd,
    Video,
}

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    DrivesDetected(Vec<DriveStatus>),
    DiscIdentified(Result<DiscDescriptor, RipError>),
    TitlesScanned(Result<Vec<TitleInfo>, RipError>),

    RipStarted(RipKind, CancelToken),
    RipProgress(ProgressEvent),
    RipFinished(RipState),
    RipRejected(RipError),

    Tick,

    ExitApplication,

    Error(String),
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a quit event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        if matches!(event, AppEvent::ExitApplication) {
            break;
        }

        handle_event(app, event)?;

        terminal.draw(|f| draw(f, app))?;
    }

    stop_active_rip(app, SHUTDOWN_TIMEOUT);

    Ok(())
}

/// Cancels a rip that is still running, or still being started, and waits
/// for its session to report a final state so the tool has been stopped
/// before the application exits.
///
/// Returns the final state, or `None` when there was nothing to stop, the
/// rip was rejected, or `timeout` passed first.
pub(crate) fn stop_active_rip(app: &mut App, timeout: Duration) -> Option<RipState> {
    if !app.rip_in_progress() {
        return None;
    }

    info!("stopping the active rip before exit");
    if let Some(rip) = &app.active_rip {
        rip.cancel.cancel();
    }

    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match app.event_rx.recv_timeout(remaining) {
            // Started after the quit was requested.
            Ok(AppEvent::RipStarted(_, cancel)) => cancel.cancel(),
            Ok(AppEvent::RipFinished(state)) => {
                app.active_rip = None;
                app.rip_state = state;
                return Some(state);
            }
            Ok(AppEvent::RipRejected(_)) => {
                app.rip_state = RipState::Failed;
                return None;
            }
            Ok(_) => {}
            Err(_) => {
                warn!(?timeout, "rip did not stop before exit");
                return None;
            }
        }
    }
}

pub(crate) fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => process_key_event(app, key)?,
        AppEvent::DrivesDetected(drives) => handle_drives_detected(app, drives),
        AppEvent::DiscIdentified(result) => handle_disc_identified(app, result),
        AppEvent::TitlesScanned(result) => handle_titles_scanned(app, result),
        AppEvent::RipStarted(kind, cancel) => handle_rip_started(app, kind, cancel),
        AppEvent::RipProgress(event) => handle_rip_progress(app, event),
        AppEvent::RipFinished(state) => handle_rip_finished(app, state),
        AppEvent::RipRejected(e) => handle_rip_rejected(app, e),
        AppEvent::Error(message) => handle_error(app, message),
        AppEvent::Tick | AppEvent::ExitApplication => handle_tick(app),
    }

    Ok(())
}
