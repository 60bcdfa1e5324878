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

//! Rip orchestration.
//!
//! A rip is started synchronously, failing fast when the tool or the output
//! directory is unusable, and then runs on its own thread. From there on the
//! only way it reports back is the progress channel held by the returned
//! [`RipHandle`].

mod interpret;
mod progress;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::Receiver,
    },
    thread::{self, JoinHandle},
};

pub(crate) use interpret::{AbcdeInterpreter, ProgressModel, VideoInterpreter};
pub(crate) use progress::{ProgressEvent, progress_channel};
pub(crate) use session::Session;

use tracing::info;

use crate::{
    backend::{ExecutionBackend, Invocation},
    config::{AppConfig, Choice, MetadataMethod, OutputFormat},
    disc::DiscDescriptor,
    error::RipError,
    tools::Tool,
};

const OUTPUT_TEMPLATE: &str = "${ARTISTFILE}/${ALBUMFILE}/${TRACKNUM}_${TRACKFILE}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RipState {
    Idle,
    Starting,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RipState {
    pub(crate) fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Cooperative cancellation flag shared with a running session.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The caller's side of a running rip.
#[derive(Debug)]
pub(crate) struct RipHandle {
    pub(crate) progress: Receiver<ProgressEvent>,
    cancel: CancelToken,
    state: Arc<Mutex<RipState>>,
    thread: JoinHandle<RipState>,
}

impl RipHandle {
    pub(crate) fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn state(&self) -> RipState {
        self.state.lock().map(|s| *s).unwrap_or(RipState::Failed)
    }

    /// Stops listening and waits for the session to end.
    pub(crate) fn wait(self) -> RipState {
        drop(self.progress);
        self.thread.join().unwrap_or(RipState::Failed)
    }
}

/// Spawns `session` on its own thread after announcing it on the channel.
pub(crate) fn start_session(session: Session) -> Result<RipHandle, RipError> {
    let (sink, progress) = progress_channel();
    let cancel = CancelToken::default();
    let state = Arc::new(Mutex::new(RipState::Starting));

    sink.emit(ProgressEvent::status("Initializing..."));

    let thread = {
        let cancel = cancel.clone();
        let state = state.clone();
        thread::Builder::new()
            .name(format!("rip-{}", session.tool))
            .spawn(move || session::run(session, sink, cancel, state))
            .map_err(|e| RipError::subprocess("rip", e.to_string()))?
    };

    Ok(RipHandle {
        progress,
        cancel,
        state,
        thread,
    })
}

pub(crate) fn ensure_output_dir(path: &Path) -> Result<(), RipError> {
    fs::create_dir_all(path).map_err(|e| RipError::OutputDirectoryError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Starts audio CD rips with `abcde`.
#[derive(Debug, Clone)]
pub(crate) struct RipOrchestrator {
    backend: Arc<dyn ExecutionBackend>,
    device: String,
    output_dir: PathBuf,
    format: OutputFormat,
    metadata: MetadataMethod,
    auto_eject: bool,
    verbose: bool,
    phase_weight: u8,
}

impl RipOrchestrator {
    pub(crate) fn new(cfg: &AppConfig, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            backend,
            device: cfg.drives.cd_drive.trim().to_string(),
            output_dir: cfg.paths.music.clone(),
            format: cfg.cd_ripping.output_format,
            metadata: cfg.cd_ripping.metadata_method,
            auto_eject: cfg.cd_ripping.auto_eject,
            verbose: cfg.execution.verbose_logging,
            phase_weight: cfg.cd_ripping.rip_phase_weight,
        }
    }

    /// Starts ripping `disc`.
    ///
    /// # Errors
    ///
    /// [`RipError::ToolUnavailable`] or [`RipError::OutputDirectoryError`]
    /// before anything is launched. Later failures arrive on the channel.
    pub(crate) fn rip(&self, disc: &DiscDescriptor) -> Result<RipHandle, RipError> {
        let invocation = self.invocation();
        let launch = self.backend.command(&invocation)?;
        ensure_output_dir(&self.output_dir)?;

        info!(
            disc_id = %disc.disc_id,
            tracks = disc.track_count,
            output = %self.output_dir.display(),
            backend = self.backend.name(),
            "starting CD rip"
        );

        let names = disc.tracks.iter().map(|t| t.title.clone()).collect();
        start_session(Session {
            tool: Tool::Abcde.binary_name(),
            launch,
            interpreter: Arc::new(AbcdeInterpreter),
            model: ProgressModel::new(Tool::Abcde.binary_name(), names, self.phase_weight),
        })
    }

    fn invocation(&self) -> Invocation {
        let actions = match self.metadata {
            MetadataMethod::None => "read,encode,tag,move,clean",
            _ => "cddb,read,encode,tag,move,clean",
        };

        let mut inv = Invocation::new(Tool::Abcde)
            // Non-interactive, and no host config file.
            .args(["-N", "-c", "/dev/null"])
            .args(["-d", self.device.as_str()])
            .args(["-o", self.format.as_str()])
            .args(["-a", actions]);

        if self.auto_eject {
            inv = inv.arg("-x");
        }
        if self.verbose {
            inv = inv.arg("-V");
        }

        let output_dir = self.output_dir.to_string_lossy().into_owned();
        inv = inv
            .env("OUTPUTDIR", output_dir.as_str())
            .env("OUTPUTFORMAT", OUTPUT_TEMPLATE)
            .device(self.device.as_str())
            .current_dir(&self.output_dir);

        match self.metadata {
            MetadataMethod::MusicBrainz => inv.env("CDDBMETHOD", "musicbrainz"),
            MetadataMethod::Cddb => inv.env("CDDBMETHOD", "cddb"),
            MetadataMethod::None => inv,
        }
    }
}
