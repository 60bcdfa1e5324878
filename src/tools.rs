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

//! External tool discovery and bounded execution.
//!
//! Every third-party binary the application drives is named by a [`Tool`].
//! A tool resolves to its configured path when one is set, otherwise to the
//! first executable match on `PATH`.

use std::{
    env,
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{backend::Launch, config::ToolsConfig};

/// How often a child is polled for exit while waiting on a deadline.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Longest wait for a stop command to finish.
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tool {
    DiscId,
    Abcde,
    CdInfo,
    CddbTool,
    MakeMkv,
    VideoRip,
    Docker,
}

impl Tool {
    /// The executable name searched for on `PATH`.
    pub(crate) fn binary_name(self) -> &'static str {
        match self {
            Self::DiscId => "cd-discid",
            Self::Abcde => "abcde",
            Self::CdInfo => "cd-info",
            Self::CddbTool => "cddb_tool",
            Self::MakeMkv => "makemkvcon",
            Self::VideoRip => "rip-video",
            Self::Docker => "docker",
        }
    }

    fn configured_path(self, tools: &ToolsConfig) -> &str {
        match self {
            Self::DiscId => &tools.cd_discid_path,
            Self::Abcde => &tools.abcde_path,
            Self::CdInfo => &tools.cd_info_path,
            Self::CddbTool => &tools.cddb_tool_path,
            Self::MakeMkv => &tools.makemkv_path,
            Self::VideoRip => &tools.video_rip_path,
            Self::Docker => &tools.docker_path,
        }
    }

    /// Locates the tool, preferring an explicit configured path.
    pub(crate) fn resolve(self, tools: &ToolsConfig) -> Option<PathBuf> {
        let configured = self.configured_path(tools).trim();
        if !configured.is_empty() {
            let path = PathBuf::from(configured);
            return is_executable(&path).then_some(path);
        }

        find_in_path(self.binary_name())
    }
}

/// Searches each `PATH` entry for an executable called `name`.
pub(crate) fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Runs `launch` to completion, stopping it if it outlives `timeout`.
///
/// Standard input is closed and both output streams are captured on
/// dedicated threads so a chatty child can never block on a full pipe.
///
/// # Errors
///
/// Returns the spawn error, or an error of kind [`io::ErrorKind::TimedOut`]
/// when the deadline passes first.
pub(crate) fn output_with_timeout(launch: Launch, timeout: Duration) -> io::Result<Output> {
    let Launch {
        command: mut cmd,
        mut stop,
    } = launch;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(command = ?cmd, ?timeout, "running tool");

    let mut child = cmd.spawn()?;
    let stdout = capture(child.stdout.take());
    let stderr = capture(child.stderr.take());

    let status = match wait_deadline(&mut child, Instant::now() + timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            terminate(&mut child, stop.as_mut());
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "tool did not finish before its deadline",
            ));
        }
        Err(e) => return Err(e),
    };

    Ok(Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn capture<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

/// Polls `child` until it exits, or returns `None` once `deadline` passes.
fn wait_deadline(
    child: &mut Child,
    deadline: Instant,
) -> io::Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Stops `child` for good: runs `stop` first when given, then kills and
/// reaps the local process.
pub(crate) fn terminate(child: &mut Child, stop: Option<&mut Command>) {
    if let Some(stop) = stop {
        stop.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        debug!(command = ?stop, "running stop command");

        match stop.spawn() {
            Ok(mut stopper) => match wait_deadline(&mut stopper, Instant::now() + STOP_TIMEOUT) {
                Ok(Some(status)) if !status.success() => warn!(%status, "stop command failed"),
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!("stop command timed out");
                    let _ = stopper.kill();
                    let _ = stopper.wait();
                }
                Err(e) => warn!(error = %e, "lost track of stop command"),
            },
            Err(e) => warn!(error = %e, "failed to run stop command"),
        }
    }

    if let Err(e) = child.kill() {
        debug!(error = %e, "kill failed, the tool may have exited already");
    }
    let _ = child.wait();
}

/// Stdout followed by stderr, lossily decoded.
pub(crate) fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake tool scripts for exercising subprocess handling.

    use std::{fs, os::unix::fs::PermissionsExt, path::Path, path::PathBuf};

    /// Writes an executable `/bin/sh` script called `name` into `dir`.
    pub(crate) fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::fake_tool;

    #[test]
    fn configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_tool(dir.path(), "my-discid", "echo hi");

        let tools = ToolsConfig {
            cd_discid_path: script.to_string_lossy().into_owned(),
            ..ToolsConfig::default()
        };

        assert_eq!(Tool::DiscId.resolve(&tools), Some(script));
    }

    #[test]
    fn configured_path_that_is_not_executable_is_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abcde");
        std::fs::write(&path, "text").unwrap();

        let tools = ToolsConfig {
            abcde_path: path.to_string_lossy().into_owned(),
            ..ToolsConfig::default()
        };

        assert_eq!(Tool::Abcde.resolve(&tools), None);
    }

    #[test]
    fn finds_shell_on_path() {
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("definitely-not-a-real-tool-name").is_none());
    }

    #[test]
    fn captures_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_tool(dir.path(), "tool", "echo out; echo err >&2; exit 3");

        let output = output_with_timeout(Command::new(script).into(), Duration::from_secs(5)).unwrap();

        assert_eq!(output.status.code(), Some(3));
        assert_eq!(combined_output(&output), "out\nerr\n");
    }

    #[test]
    fn kills_tool_after_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_tool(dir.path(), "slow", "exec sleep 30");

        let started = Instant::now();
        let err = output_with_timeout(Command::new(script).into(), Duration::from_millis(200)).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn deadline_runs_the_stop_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("stopped");
        let script = fake_tool(dir.path(), "slow", "exec sleep 30");
        let stopper = fake_tool(dir.path(), "stopper", &format!("echo \"$1\" > {}", marker.display()));

        let mut stop = Command::new(stopper);
        stop.arg("ripui-slow-1");
        let launch = Launch {
            command: Command::new(script),
            stop: Some(stop),
        };

        let err = output_with_timeout(launch, Duration::from_millis(200)).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(std::fs::read_to_string(marker).unwrap(), "ripui-slow-1\n");
    }
}
