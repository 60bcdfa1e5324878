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

//! Where and how external tools are launched.
//!
//! Callers describe what they want to run as an [`Invocation`]; a backend
//! turns that description into a ready-to-spawn [`Launch`], either on the
//! host or inside a container.

mod container;
mod native;

use std::{path::PathBuf, process::Command, sync::Arc};

pub(crate) use container::ContainerBackend;
pub(crate) use native::NativeBackend;

use crate::{config::AppConfig, error::RipError, tools::Tool};

/// A tool launch, independent of where it runs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    pub(crate) tool: Tool,
    pub(crate) args: Vec<String>,
    pub(crate) env: Vec<(String, String)>,
    pub(crate) working_dir: Option<PathBuf>,
    /// Device node the tool reads from.
    pub(crate) device: Option<String>,
    /// Host directories the tool writes into.
    pub(crate) volumes: Vec<PathBuf>,
}

impl Invocation {
    pub(crate) fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            env: Vec::new(),
            working_dir: None,
            device: None,
            volumes: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub(crate) fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets the working directory, which is also made available to the tool.
    pub(crate) fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !self.volumes.contains(&dir) {
            self.volumes.push(dir.clone());
        }
        self.working_dir = Some(dir);
        self
    }

    pub(crate) fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub(crate) fn volume(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !self.volumes.contains(&dir) {
            self.volumes.push(dir);
        }
        self
    }
}

/// A command ready to spawn.
#[derive(Debug)]
pub(crate) struct Launch {
    pub(crate) command: Command,
    /// Stops what `command` started when killing the local process is not
    /// enough, as with a container runtime client.
    pub(crate) stop: Option<Command>,
}

impl From<Command> for Launch {
    fn from(command: Command) -> Self {
        Self {
            command,
            stop: None,
        }
    }
}

pub(crate) trait ExecutionBackend: Send + Sync + std::fmt::Debug {
    /// Short label shown in the UI.
    fn name(&self) -> &'static str;

    /// Builds the launch for `invocation`.
    ///
    /// # Errors
    ///
    /// [`RipError::ToolUnavailable`] when the tool (or the container runtime)
    /// cannot be located.
    fn command(&self, invocation: &Invocation) -> Result<Launch, RipError>;
}

/// Picks the backend requested by the execution settings.
pub(crate) fn from_config(cfg: &AppConfig) -> Arc<dyn ExecutionBackend> {
    if cfg.uses_container() {
        Arc::new(ContainerBackend::new(&cfg.tools, &cfg.container))
    } else {
        Arc::new(NativeBackend::new(&cfg.tools))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    #[test]
    fn builder_collects_volumes_once() {
        let inv = Invocation::new(Tool::Abcde)
            .arg("-N")
            .args(["-d", "/dev/sr0"])
            .env("OUTPUTDIR", "/music")
            .device("/dev/sr0")
            .volume("/music")
            .current_dir("/music");

        assert_eq!(inv.args, vec!["-N", "-d", "/dev/sr0"]);
        assert_eq!(inv.volumes, vec![PathBuf::from("/music")]);
        assert_eq!(inv.working_dir, Some(PathBuf::from("/music")));
        assert_eq!(inv.device.as_deref(), Some("/dev/sr0"));
    }

    #[test]
    fn backend_follows_execution_settings() {
        let mut cfg = AppConfig::default();
        assert_eq!(from_config(&cfg).name(), "native");

        cfg.execution.preferred_backend = BackendKind::Container;
        assert_eq!(from_config(&cfg).name(), "container");

        cfg.execution.preferred_backend = BackendKind::Native;
        cfg.container.enabled = true;
        assert_eq!(from_config(&cfg).name(), "container");
    }
}
