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

use std::process::Command;

use tracing::debug;

use super::{ExecutionBackend, Invocation, Launch};
use crate::{config::ToolsConfig, error::RipError};

/// Runs tools directly on the host.
#[derive(Debug, Clone)]
pub(crate) struct NativeBackend {
    tools: ToolsConfig,
}

impl NativeBackend {
    pub(crate) fn new(tools: &ToolsConfig) -> Self {
        Self { tools: tools.clone() }
    }
}

impl ExecutionBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn command(&self, invocation: &Invocation) -> Result<Launch, RipError> {
        let tool = invocation.tool;
        let path = tool
            .resolve(&self.tools)
            .ok_or_else(|| RipError::tool_unavailable(tool.binary_name()))?;

        debug!(tool = tool.binary_name(), path = %path.display(), "resolved tool");

        let mut cmd = Command::new(path);
        cmd.args(&invocation.args);
        cmd.envs(invocation.env.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        Ok(cmd.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, testing::fake_tool};

    #[test]
    fn builds_a_host_command() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_tool(dir.path(), "abcde", "exit 0");
        let tools = ToolsConfig {
            abcde_path: script.to_string_lossy().into_owned(),
            ..ToolsConfig::default()
        };

        let inv = Invocation::new(Tool::Abcde)
            .args(["-N", "-d", "/dev/sr0"])
            .env("OUTPUTDIR", "/music")
            .current_dir(dir.path());

        let launch = NativeBackend::new(&tools).command(&inv).unwrap();
        assert!(launch.stop.is_none());
        let cmd = launch.command;

        assert_eq!(cmd.get_program(), script.as_os_str());
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-N", "-d", "/dev/sr0"]);
        assert_eq!(cmd.get_current_dir(), Some(dir.path()));
        let envs: Vec<_> = cmd.get_envs().collect();
        assert_eq!(envs.len(), 1);
    }

    #[test]
    fn missing_tool_is_unavailable() {
        let tools = ToolsConfig {
            abcde_path: "/nonexistent/abcde".into(),
            ..ToolsConfig::default()
        };

        let err = NativeBackend::new(&tools)
            .command(&Invocation::new(Tool::Abcde))
            .unwrap_err();

        assert_eq!(err, RipError::tool_unavailable("abcde"));
    }
}
