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

use std::{
    process::{self, Command},
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::debug;

use super::{ExecutionBackend, Invocation, Launch};
use crate::{
    config::{ContainerConfig, PullPolicy, ToolsConfig},
    error::RipError,
    tools::Tool,
};

static NEXT_CONTAINER: AtomicU64 = AtomicU64::new(0);

/// A container name unique to this process and launch.
fn container_name(tool: &str) -> String {
    let seq = NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed);
    format!("ripui-{tool}-{}-{seq}", process::id())
}

/// Runs tools inside a throwaway container from a prepared image.
///
/// The image is expected to carry every tool under its usual binary name.
/// Devices and host directories named by the invocation are passed through
/// at the same paths. Each container is named so it can be killed through
/// the runtime; a signal to the local client does not reach it.
#[derive(Debug, Clone)]
pub(crate) struct ContainerBackend {
    tools: ToolsConfig,
    image: String,
    pull_policy: PullPolicy,
}

impl ContainerBackend {
    pub(crate) fn new(tools: &ToolsConfig, container: &ContainerConfig) -> Self {
        Self {
            tools: tools.clone(),
            image: container.image.clone(),
            pull_policy: container.pull_policy,
        }
    }

    fn pull_flag(&self) -> &'static str {
        match self.pull_policy {
            PullPolicy::Always => "always",
            PullPolicy::IfNotPresent => "missing",
            PullPolicy::Never => "never",
        }
    }
}

impl ExecutionBackend for ContainerBackend {
    fn name(&self) -> &'static str {
        "container"
    }

    fn command(&self, invocation: &Invocation) -> Result<Launch, RipError> {
        let docker = Tool::Docker
            .resolve(&self.tools)
            .ok_or_else(|| RipError::tool_unavailable(Tool::Docker.binary_name()))?;
        let name = container_name(invocation.tool.binary_name());

        let mut cmd = Command::new(&docker);
        cmd.args(["run", "--rm", "--init", "--name", name.as_str()])
            .args(["--pull", self.pull_flag()]);

        if let Some(device) = &invocation.device {
            cmd.arg("--device").arg(device);
        }
        for dir in &invocation.volumes {
            let dir = dir.to_string_lossy();
            cmd.arg("-v").arg(format!("{dir}:{dir}"));
        }
        for (key, value) in &invocation.env {
            cmd.arg("-e").arg(format!("{key}={value}"));
        }
        if let Some(dir) = &invocation.working_dir {
            cmd.arg("-w").arg(dir);
        }

        cmd.arg(&self.image)
            .arg(invocation.tool.binary_name())
            .args(&invocation.args);

        let mut stop = Command::new(&docker);
        stop.args(["kill", name.as_str()]);

        debug!(image = %self.image, container = %name, tool = invocation.tool.binary_name(), "built container command");
        Ok(Launch {
            command: cmd,
            stop: Some(stop),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::fake_tool;

    fn backend(docker: &str, pull_policy: PullPolicy) -> ContainerBackend {
        let tools = ToolsConfig {
            docker_path: docker.to_string(),
            ..ToolsConfig::default()
        };
        let container = ContainerConfig {
            image: "ripui-tools:test".into(),
            pull_policy,
            enabled: true,
        };
        ContainerBackend::new(&tools, &container)
    }

    #[test]
    fn wraps_the_tool_in_docker_run() {
        let dir = tempfile::tempdir().unwrap();
        let docker = fake_tool(dir.path(), "docker", "exit 0");
        let backend = backend(&docker.to_string_lossy(), PullPolicy::IfNotPresent);

        let inv = Invocation::new(Tool::Abcde)
            .args(["-d", "/dev/sr0"])
            .device("/dev/sr0")
            .env("OUTPUTDIR", "/music")
            .current_dir("/music");

        let launch = backend.command(&inv).unwrap();
        let args = strings(&launch.command);

        assert_eq!(launch.command.get_program(), docker.as_os_str());
        assert_eq!(&args[..4], ["run", "--rm", "--init", "--name"]);
        assert!(args[4].starts_with("ripui-abcde-"));
        assert_eq!(
            &args[5..],
            [
                "--pull", "missing", "--device", "/dev/sr0", "-v", "/music:/music", "-e",
                "OUTPUTDIR=/music", "-w", "/music", "ripui-tools:test", "abcde", "-d",
                "/dev/sr0",
            ]
        );
    }

    fn strings(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn stop_kills_the_named_container() {
        let dir = tempfile::tempdir().unwrap();
        let docker = fake_tool(dir.path(), "docker", "exit 0");
        let backend = backend(&docker.to_string_lossy(), PullPolicy::Never);

        let first = backend.command(&Invocation::new(Tool::Abcde)).unwrap();
        let second = backend.command(&Invocation::new(Tool::Abcde)).unwrap();

        let name = strings(&first.command)[4].clone();
        let stop = first.stop.unwrap();
        assert_eq!(stop.get_program(), docker.as_os_str());
        assert_eq!(strings(&stop), ["kill", name.as_str()]);
        assert_ne!(strings(&second.command)[4], name);
    }

    #[test]
    fn missing_runtime_is_unavailable() {
        let err = backend("/nonexistent/docker", PullPolicy::Never)
            .command(&Invocation::new(Tool::DiscId))
            .unwrap_err();

        assert_eq!(err, RipError::tool_unavailable("docker"));
    }
}
