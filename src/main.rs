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

//! # Disc Ripper TUI.
//!
//! A terminal front end for ripping audio CDs and video disc titles with
//! external tools.
//!
//! This application coordinates a TUI frontend built with `ratatui` and a
//! background processing layer.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** manages the terminal lifecycle and UI rendering.
//! * A **Task Worker** detects drives, identifies discs, scans titles and
//!   starts rips, all of which block on subprocesses.
//! * **Rip Sessions** run each ripping tool on its own thread and report
//!   through a bounded progress channel, which is relayed into the UI event
//!   channel.
//! * **Event Loops** capture user input and system ticks to drive the UI
//!   state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of an error. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.

mod backend;
mod config;
mod disc;
mod drives;
mod error;
mod events;
mod render;
mod ripper;
mod settings;
mod tasks;
mod theme;
mod tools;
mod util;
mod video;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    disc::DiscDescriptor,
    drives::DriveStatus,
    events::{AppEvent, RipKind, process_events},
    ripper::{CancelToken, ProgressEvent, RipState},
    settings::SettingsView,
    tasks::AppTask,
    theme::Theme,
    video::TitleInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Welcome,
    CdRip,
    VideoTitles,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Busy,
    Success,
    Error,
}

/// A rip that has started and not yet reported its final state.
pub(crate) struct ActiveRip {
    pub(crate) kind: RipKind,
    pub(crate) cancel: CancelToken,
}

/// Application state.
pub(crate) struct App {
    pub(crate) config: AppConfig,

    pub(crate) theme: Theme,
    pub(crate) screen: Screen,

    pub(crate) event_tx: Sender<AppEvent>,
    pub(crate) event_rx: Receiver<AppEvent>,

    pub(crate) task_tx: Sender<AppTask>,

    /// Tick period in milliseconds, shared with the tick thread.
    pub(crate) tick_interval: Arc<AtomicU64>,
    pub(crate) tick: usize,

    pub(crate) status: String,
    pub(crate) status_kind: StatusKind,
    /// A background task is running.
    pub(crate) busy: bool,

    pub(crate) drives: Vec<DriveStatus>,

    pub(crate) disc: Option<DiscDescriptor>,
    pub(crate) progress: Option<ProgressEvent>,
    pub(crate) rip_state: RipState,
    pub(crate) active_rip: Option<ActiveRip>,

    pub(crate) titles: Vec<TitleInfo>,
    pub(crate) title_index: usize,
    /// Title waiting for a yes/no before ripping.
    pub(crate) confirm_title: Option<usize>,

    pub(crate) settings: SettingsView,
}

impl App {
    /// Create a new instance of application state.
    pub(crate) fn new(config: AppConfig, task_tx: Sender<AppTask>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            theme: Theme::from_name(config.ui.theme),
            tick_interval: Arc::new(AtomicU64::new(config.ui.refresh_rate)),
            config,
            screen: Screen::Welcome,
            event_tx,
            event_rx,
            task_tx,
            tick: 0,
            status: "Press c to rip a CD, v for video titles, s for settings".to_string(),
            status_kind: StatusKind::Info,
            busy: false,
            drives: Vec::new(),
            disc: None,
            progress: None,
            rip_state: RipState::Idle,
            active_rip: None,
            titles: Vec::new(),
            title_index: 0,
            confirm_title: None,
            settings: SettingsView::new(),
        }
    }

    pub(crate) fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = message.into();
        self.status_kind = kind;
    }

    /// Whether a rip has been requested and has not finished yet.
    pub(crate) fn rip_in_progress(&self) -> bool {
        self.active_rip.is_some() || self.rip_state == RipState::Starting
    }

    /// Adopts an edited configuration, saves it, and hands a copy to the task
    /// worker.
    pub(crate) fn apply_config(&mut self, config: AppConfig, message: String) -> Result<()> {
        let saved = config::save_config(&config);

        self.theme = Theme::from_name(config.ui.theme);
        self.tick_interval
            .store(config.ui.refresh_rate, Ordering::Relaxed);
        self.task_tx
            .send(AppTask::UpdateConfig(Box::new(config.clone())))
            .context("Task worker has stopped")?;
        self.config = config;

        match saved {
            Ok(()) => self.set_status(StatusKind::Success, message),
            Err(e) => {
                warn!("failed to save configuration: {e}");
                self.set_status(StatusKind::Error, format!("{message}, but saving failed: {e}"));
            }
        }

        Ok(())
    }

    /// Puts configuration problems found at startup in the status bar.
    fn report_startup_problems(&mut self, load_error: Option<String>) {
        if let Some(message) = load_error {
            self.set_status(StatusKind::Error, message);
        } else if let Err(errors) = self.config.validate() {
            for e in &errors.0 {
                warn!("{e}");
            }
            let message = match errors.0.as_slice() {
                [first] => format!("Configuration problem: {first}"),
                [first, rest @ ..] => {
                    format!("Configuration problem: {first} (and {} more)", rest.len())
                }
                [] => return,
            };
            self.set_status(StatusKind::Error, message);
        }
    }
}

/// The entry point of the application.
///
/// Loads the configuration, starts logging, manages the terminal lifecycle,
/// and returns an error if any part of the execution fails.
fn main() -> Result<()> {
    let (config, load_error) = match config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (
            AppConfig::default(),
            Some(format!("Could not load configuration, using defaults: {e}")),
        ),
    };

    // Without a usable log file the application still runs, just silently.
    let _ = util::logging::init(&config.paths.log_file, config.execution.verbose_logging);
    info!(version = env!("CARGO_PKG_VERSION"), "starting");
    if let Some(message) = &load_error {
        warn!("{message}");
    }

    let (task_tx, task_rx) = mpsc::channel();

    let mut app = App::new(config, task_tx);
    app.report_startup_problems(load_error);

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app, task_rx);
    restore_terminal(&mut terminal);

    info!("exiting");
    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the current theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        util::term::set_terminal_bg(&hex).ok();
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`]. It is best-effort
/// and does not return a result, as it is called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg().ok();
    terminal.show_cursor().ok();
}

/// Starts the application's background workers and enters the main event loop.
///
/// This function spawns several long-running background threads:
/// * A task worker to process [`AppTask`]s.
/// * An input thread to poll for system keyboard events.
/// * A tick thread to trigger periodic UI refreshes.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_rx: Receiver<AppTask>,
) -> Result<()> {
    tasks::spawn_task_worker(&app.config, task_rx, app.event_tx.clone());

    // Translate raw key presses to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    // The tick is effectively the minimum "frame rate" for rendering and
    // drives the spinner.
    let tx_tick = app.event_tx.clone();
    let interval = app.tick_interval.clone();
    thread::spawn(move || {
        loop {
            if tx_tick.send(AppEvent::Tick).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(interval.load(Ordering::Relaxed)));
        }
    });

    if app.config.drives.auto_detect {
        app.busy = true;
        if app.status_kind != StatusKind::Error {
            app.set_status(StatusKind::Busy, "Detecting drives...");
        }
        app.task_tx
            .send(AppTask::DetectDrives)
            .context("Task worker has stopped")?;
    }

    process_events(terminal, app)
}
