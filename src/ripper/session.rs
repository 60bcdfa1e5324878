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

//! One running rip: a child process, its two output readers and the wait
//! loop that races exit against cancellation.

use std::{
    io::{BufRead, BufReader, Read},
    process::{Child, Command, Stdio},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};

use tracing::{debug, error, info, warn};

use super::{
    CancelToken, RipState,
    interpret::{OutputInterpreter, ProgressModel, Stream},
    progress::ProgressSink,
};
use crate::{
    backend::Launch,
    error::RipError,
    tools::{self, POLL_INTERVAL},
};

pub(crate) const COMPLETED_STATUS: &str = "Ripping completed successfully!";
pub(crate) const CANCELLED_STATUS: &str = "Ripping cancelled";

pub(crate) struct Session {
    pub(crate) tool: &'static str,
    pub(crate) launch: Launch,
    pub(crate) interpreter: Arc<dyn OutputInterpreter>,
    pub(crate) model: ProgressModel,
}

/// Drives `session` to a terminal state, reporting through `sink`.
pub(crate) fn run(
    session: Session,
    sink: ProgressSink,
    cancel: CancelToken,
    state: Arc<Mutex<RipState>>,
) -> RipState {
    let Session {
        tool,
        launch: Launch {
            mut command,
            mut stop,
        },
        interpreter,
        model,
    } = session;

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    info!(tool, command = ?command, "starting rip");

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            error!(tool, error = %e, "failed to launch rip tool");
            sink.fail(RipError::subprocess(tool, e.to_string()), "Ripping failed");
            return set_state(&state, RipState::Failed);
        }
    };
    set_state(&state, RipState::Running);

    let model = Arc::new(Mutex::new(model));
    let readers = [
        spawn_reader(child.stdout.take(), Stream::Stdout, &interpreter, &model, &sink),
        spawn_reader(child.stderr.take(), Stream::Stderr, &interpreter, &model, &sink),
    ];

    match wait(&mut child, &cancel, stop.as_mut()) {
        Outcome::Cancelled => {
            info!(tool, "rip cancelled");
            sink.fail(RipError::Cancelled, CANCELLED_STATUS);
            set_state(&state, RipState::Cancelled)
        }
        Outcome::Exited(Ok(status)) if status.success() => {
            // Let the readers drain so every track is reported before the end.
            for reader in readers.into_iter().flatten() {
                let _ = reader.join();
            }
            info!(tool, "rip completed");
            sink.complete(COMPLETED_STATUS);
            set_state(&state, RipState::Completed)
        }
        Outcome::Exited(Ok(status)) => {
            warn!(tool, %status, "rip tool failed");
            sink.fail(
                RipError::subprocess(tool, format!("exited with {status}")),
                "Ripping failed",
            );
            set_state(&state, RipState::Failed)
        }
        Outcome::Exited(Err(e)) => {
            error!(tool, error = %e, "lost track of rip tool");
            sink.fail(RipError::subprocess(tool, e.to_string()), "Ripping failed");
            set_state(&state, RipState::Failed)
        }
    }
}

enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
}

fn wait(child: &mut Child, cancel: &CancelToken, stop: Option<&mut Command>) -> Outcome {
    loop {
        if cancel.is_cancelled() {
            tools::terminate(child, stop);
            return Outcome::Cancelled;
        }

        match child.try_wait() {
            Ok(Some(status)) => return Outcome::Exited(Ok(status)),
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Outcome::Exited(Err(e)),
        }
    }
}

fn set_state(state: &Mutex<RipState>, next: RipState) -> RipState {
    if let Ok(mut current) = state.lock() {
        debug!(from = ?*current, to = ?next, "rip state");
        *current = next;
    }
    next
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
    stream: Stream,
    interpreter: &Arc<dyn OutputInterpreter>,
    model: &Arc<Mutex<ProgressModel>>,
    sink: &ProgressSink,
) -> Option<JoinHandle<()>> {
    let pipe = pipe?;
    let interpreter = interpreter.clone();
    let model = model.clone();
    let sink = sink.clone();

    Some(thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end();
            debug!(?stream, line, "tool output");

            let Some(output) = interpreter.interpret(stream, line) else {
                continue;
            };
            let Ok(mut model) = model.lock() else {
                break;
            };
            let event = model.event(output);
            drop(model);

            sink.emit(event);
        }
    }))
}
