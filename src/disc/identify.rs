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

use std::{io, sync::Arc, thread, time::Duration};

use tracing::{debug, info, warn};

use super::{DiscDescriptor, Enricher, parse_discid_output};
use crate::{
    backend::{ExecutionBackend, Invocation},
    config::{AppConfig, MetadataMethod},
    error::RipError,
    tools::{self, Tool},
};

const DETECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads the disc in the configured drive.
#[derive(Debug, Clone)]
pub(crate) struct DiscIdentifier {
    backend: Arc<dyn ExecutionBackend>,
    device: String,
    demo_mode: bool,
    retry_count: u32,
    retry_delay: Duration,
    enricher: Option<Enricher>,
}

impl DiscIdentifier {
    pub(crate) fn new(cfg: &AppConfig, backend: Arc<dyn ExecutionBackend>) -> Self {
        let enricher = (cfg.cd_ripping.metadata_method != MetadataMethod::None)
            .then(|| Enricher::new(cfg, backend.clone()));

        Self {
            backend,
            device: cfg.drives.cd_drive.trim().to_string(),
            demo_mode: cfg.execution.demo_mode,
            retry_count: cfg.cd_ripping.retry_count,
            retry_delay: Duration::from_secs(cfg.cd_ripping.retry_delay),
            enricher,
        }
    }

    /// Detects the disc, retrying while the drive is not ready, then looks
    /// up its metadata. Lookup failures leave the placeholders in place.
    pub(crate) fn identify(&self) -> Result<DiscDescriptor, RipError> {
        let mut disc = self.detect_with_retry()?;

        if let Some(enricher) = &self.enricher {
            disc.metadata_source = enricher.enrich(&mut disc);
        }

        Ok(disc)
    }

    /// Runs [`detect`](Self::detect) up to `retry_count` more times while it
    /// fails with [`RipError::DetectionFailed`].
    pub(crate) fn detect_with_retry(&self) -> Result<DiscDescriptor, RipError> {
        let mut attempt = 0;
        loop {
            match self.detect() {
                Err(RipError::DetectionFailed(reason)) if attempt < self.retry_count => {
                    attempt += 1;
                    warn!(attempt, %reason, "disc detection failed, retrying");
                    thread::sleep(self.retry_delay);
                }
                result => return result,
            }
        }
    }

    /// Runs `cd-discid` once against the drive and parses its answer.
    pub(crate) fn detect(&self) -> Result<DiscDescriptor, RipError> {
        if self.device.is_empty() {
            return Err(RipError::DetectionFailed("no CD drive configured".into()));
        }

        let invocation = Invocation::new(Tool::DiscId)
            .arg(&self.device)
            .device(&self.device);

        let cmd = match self.backend.command(&invocation) {
            Ok(cmd) => cmd,
            Err(RipError::ToolUnavailable { tool }) if self.demo_mode => {
                info!(%tool, "tool missing, using the demo disc");
                return Ok(DiscDescriptor::demo());
            }
            Err(e) => return Err(e),
        };

        let output = tools::output_with_timeout(cmd, DETECT_TIMEOUT)
            .map_err(|e| self.launch_failure(&e))?;

        if !output.status.success() {
            let text = tools::combined_output(&output);
            debug!(status = %output.status, output = %text.trim(), "cd-discid failed");
            return Err(classify_failure(&self.device, &text));
        }

        let disc = parse_discid_output(&String::from_utf8_lossy(&output.stdout))?;
        info!(disc_id = %disc.disc_id, tracks = disc.track_count, "disc detected");
        Ok(disc)
    }

    fn launch_failure(&self, err: &io::Error) -> RipError {
        match err.kind() {
            io::ErrorKind::NotFound => RipError::tool_unavailable(Tool::DiscId.binary_name()),
            _ => classify_failure(&self.device, &err.to_string()),
        }
    }
}

/// Turns identification tool output into a message naming the cause.
fn classify_failure(device: &str, output: &str) -> RipError {
    let lower = output.to_lowercase();

    let message = if lower.contains("no disc") || lower.contains("no medium found") {
        format!("no CD found in drive {device}")
    } else if lower.contains("permission denied") {
        format!("permission denied accessing {device}")
    } else if lower.contains("no such file") {
        format!("drive {device} not found")
    } else {
        let detail = output.trim();
        let detail = if detail.is_empty() { "tool exited with an error" } else { detail };
        format!("failed to detect CD in {device}: {detail}")
    };

    RipError::DetectionFailed(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::NativeBackend, tools::testing::fake_tool};
    use rstest::rstest;
    use std::path::Path;

    fn config(discid: &Path) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.drives.cd_drive = "/dev/sr0".into();
        cfg.tools.cd_discid_path = discid.to_string_lossy().into_owned();
        cfg.cd_ripping.metadata_method = MetadataMethod::None;
        cfg.cd_ripping.retry_count = 0;
        cfg.cd_ripping.retry_delay = 0;
        cfg
    }

    fn identifier(cfg: &AppConfig) -> DiscIdentifier {
        DiscIdentifier::new(cfg, Arc::new(NativeBackend::new(&cfg.tools)))
    }

    #[test]
    fn detects_the_disc_in_the_drive() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "cd-discid",
            "[ \"$1\" = /dev/sr0 ] || exit 3\n\
             echo 'a10c6b0d 10 150 12345 23456 34567 45678 56789 67890 78901 89012 90123 180000'",
        );

        let disc = identifier(&config(&tool)).identify().unwrap();

        assert_eq!(disc.disc_id, "a10c6b0d");
        assert_eq!(disc.track_count, 10);
        assert_eq!(disc.offsets.len(), 11);
        assert_eq!(disc.metadata_source, None);
    }

    #[test]
    fn empty_media_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "cd-discid",
            "echo 'cd-discid: /dev/sr0: no disc' >&2\nexit 1",
        );

        let err = identifier(&config(&tool)).detect().unwrap_err();

        match err {
            RipError::DetectionFailed(message) => assert!(message.contains("no CD found")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn garbage_output_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "cd-discid", "echo 'hello'");

        let err = identifier(&config(&tool)).detect().unwrap_err();
        assert!(matches!(err, RipError::ParseError { .. }));
    }

    #[rstest]
    #[case("a10c6b0d 18446744073709551615 150 180000")]
    #[case("a10c6b0d 5000000 150 180000")]
    fn impossible_track_count_is_a_parse_error(#[case] line: &str) {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "cd-discid", &format!("echo '{line}'"));

        let err = identifier(&config(&tool)).detect().unwrap_err();
        assert!(matches!(err, RipError::ParseError { .. }));
    }

    #[test]
    fn missing_tool_fails_unless_in_demo_mode() {
        let mut cfg = config(Path::new("/nonexistent/cd-discid"));

        assert_eq!(
            identifier(&cfg).detect().unwrap_err(),
            RipError::tool_unavailable("cd-discid")
        );

        cfg.execution.demo_mode = true;
        assert_eq!(identifier(&cfg).detect().unwrap(), DiscDescriptor::demo());
    }

    #[test]
    fn unconfigured_drive_fails_detection() {
        let mut cfg = config(Path::new("/nonexistent/cd-discid"));
        cfg.drives.cd_drive = "  ".into();

        assert_eq!(
            identifier(&cfg).detect().unwrap_err(),
            RipError::DetectionFailed("no CD drive configured".into())
        );
    }

    #[test]
    fn retries_while_the_drive_settles() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");
        let body = format!(
            "echo x >> '{c}'\n\
             [ $(wc -l < '{c}') -ge 3 ] || {{ echo 'No medium found' >&2; exit 1; }}\n\
             echo '0b02a903 2 150 9000 12000'",
            c = counter.display()
        );
        let tool = fake_tool(dir.path(), "cd-discid", &body);

        let mut cfg = config(&tool);
        cfg.cd_ripping.retry_count = 3;

        let disc = identifier(&cfg).detect_with_retry().unwrap();

        assert_eq!(disc.track_count, 2);
        assert_eq!(std::fs::read_to_string(&counter).unwrap().lines().count(), 3);
    }

    #[test]
    fn gives_up_after_the_retry_budget() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");
        let body = format!("echo x >> '{}'\necho 'no disc' >&2\nexit 1", counter.display());
        let tool = fake_tool(dir.path(), "cd-discid", &body);

        let mut cfg = config(&tool);
        cfg.cd_ripping.retry_count = 2;

        assert!(matches!(
            identifier(&cfg).detect_with_retry(),
            Err(RipError::DetectionFailed(_))
        ));
        assert_eq!(std::fs::read_to_string(&counter).unwrap().lines().count(), 3);
    }

    #[rstest]
    #[case("cd-discid: No medium found", "no CD found in drive /dev/sr1")]
    #[case("open: Permission denied", "permission denied accessing /dev/sr1")]
    #[case("/dev/sr1: No such file or directory", "drive /dev/sr1 not found")]
    #[case("ioctl failed", "failed to detect CD in /dev/sr1: ioctl failed")]
    #[case("", "failed to detect CD in /dev/sr1: tool exited with an error")]
    fn classifies_failures(#[case] output: &str, #[case] expected: &str) {
        assert_eq!(
            classify_failure("/dev/sr1", output),
            RipError::DetectionFailed(expected.into())
        );
    }
}
