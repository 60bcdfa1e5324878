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

//! Keyboard handling, one function per screen.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::{
    App, Screen, StatusKind,
    events::AppEvent,
    ripper::RipState,
    settings::{SettingsAction, SettingsView},
    tasks::AppTask,
};

pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.screen {
        Screen::Welcome => process_welcome_key(app, key),
        Screen::CdRip => process_cd_key(app, key),
        Screen::VideoTitles => process_video_key(app, key),
        Screen::Settings => process_settings_key(app, key),
    }
}

fn process_welcome_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.event_tx.send(AppEvent::ExitApplication)?,
        KeyCode::Char('c') => {
            app.screen = Screen::CdRip;
            if app.disc.is_none() && !app.rip_in_progress() {
                identify_disc(app)?;
            }
        }
        KeyCode::Char('v') => {
            app.screen = Screen::VideoTitles;
            if app.titles.is_empty() && !app.rip_in_progress() {
                scan_titles(app)?;
            }
        }
        KeyCode::Char('s') => {
            app.settings = SettingsView::new();
            app.screen = Screen::Settings;
        }
        KeyCode::Char('r') => detect_drives(app)?,
        _ => {}
    }

    Ok(())
}

fn process_cd_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => leave_rip_screen(app),
        KeyCode::Char('x') => cancel_rip(app),
        KeyCode::Char('r') if !app.rip_in_progress() => identify_disc(app)?,
        KeyCode::Enter if !app.rip_in_progress() => match app.disc.clone() {
            Some(disc) => {
                app.busy = true;
                app.progress = None;
                app.rip_state = RipState::Starting;
                app.set_status(StatusKind::Busy, format!("Starting rip of {}...", disc.album));
                app.task_tx.send(AppTask::StartCdRip(disc))?;
            }
            None => app.set_status(StatusKind::Info, "No disc identified, press r to read the drive"),
        },
        _ => {}
    }

    Ok(())
}

fn process_video_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if app.confirm_title.is_some() {
        match key.code {
            KeyCode::Char('y') => {
                let selected = app.confirm_title.take().and_then(|i| app.titles.get(i).cloned());
                if let Some(title) = selected {
                    app.busy = true;
                    app.progress = None;
                    app.rip_state = RipState::Starting;
                    app.set_status(
                        StatusKind::Busy,
                        format!("Starting rip of {}...", title.display_name()),
                    );
                    app.task_tx.send(AppTask::StartTitleRip(title))?;
                }
            }
            KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => app.confirm_title = None,
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => leave_rip_screen(app),
        KeyCode::Char('x') => cancel_rip(app),
        KeyCode::Char('r') if !app.rip_in_progress() => scan_titles(app)?,
        KeyCode::Down | KeyCode::Char('j') if !app.titles.is_empty() => {
            app.title_index = (app.title_index + 1) % app.titles.len();
        }
        KeyCode::Up | KeyCode::Char('k') if !app.titles.is_empty() => {
            app.title_index = (app.title_index + app.titles.len() - 1) % app.titles.len();
        }
        KeyCode::Enter if !app.rip_in_progress() && !app.titles.is_empty() => {
            app.confirm_title = Some(app.title_index);
        }
        _ => {}
    }

    Ok(())
}

fn process_settings_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.settings.handle_key(key, &app.config, &app.drives) {
        SettingsAction::None => {}
        SettingsAction::Back => app.screen = Screen::Welcome,
        SettingsAction::RefreshDrives => detect_drives(app)?,
        SettingsAction::Apply(config, message) => app.apply_config(*config, message)?,
        SettingsAction::Invalid(message) => app.set_status(StatusKind::Error, message),
    }

    Ok(())
}

fn leave_rip_screen(app: &mut App) {
    if app.rip_in_progress() {
        app.set_status(StatusKind::Info, "A rip is running, press x to cancel it first");
    } else {
        app.screen = Screen::Welcome;
    }
}

fn cancel_rip(app: &mut App) {
    match &app.active_rip {
        Some(rip) => {
            rip.cancel.cancel();
            app.set_status(StatusKind::Busy, "Cancelling...");
        }
        None => app.set_status(StatusKind::Info, "No rip is running"),
    }
}

fn detect_drives(app: &mut App) -> Result<()> {
    app.busy = true;
    app.set_status(StatusKind::Busy, "Detecting drives...");
    app.task_tx.send(AppTask::DetectDrives)?;

    Ok(())
}

fn identify_disc(app: &mut App) -> Result<()> {
    if app.config.drives.cd_drive.is_empty() {
        app.set_status(StatusKind::Error, "No CD drive configured, choose one in Settings");
        return Ok(());
    }

    app.busy = true;
    app.disc = None;
    app.set_status(
        StatusKind::Busy,
        format!("Reading disc in {}...", app.config.drives.cd_drive),
    );
    app.task_tx.send(AppTask::IdentifyDisc)?;

    Ok(())
}

fn scan_titles(app: &mut App) -> Result<()> {
    app.busy = true;
    app.set_status(StatusKind::Busy, "Scanning disc titles...");
    app.task_tx.send(AppTask::ScanTitles)?;

    Ok(())
}
