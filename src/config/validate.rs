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

//! Field-level configuration validation.
//!
//! Validation never stops at the first problem; every offending field is
//! reported with its key path, the value found, and a message. The per-field
//! checks are shared with the interactive settings editor.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{config::AppConfig, tools};

const MAX_RETRY_COUNT: u32 = 10;
const MAX_RETRY_DELAY: u64 = 60;
const MAX_LOOKUP_TIMEOUT: u64 = 300;
const MIN_REFRESH_RATE: u64 = 50;
const MAX_REFRESH_RATE: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("config validation failed for {field}: {message} (value: {value})")]
pub(crate) struct ValidationError {
    pub(crate) field: String,
    pub(crate) value: String,
    pub(crate) message: String,
}

impl ValidationError {
    pub(crate) fn new(
        field: impl Into<String>,
        value: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ValidationErrors(pub(crate) Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no validation errors"),
            [single] => write!(f, "{single}"),
            errors => {
                writeln!(f, "{} validation errors:", errors.len())?;
                for (i, e) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl AppConfig {
    /// Checks every section, collecting all field errors.
    pub(crate) fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        self.validate_drives(&mut errors);
        self.validate_paths(&mut errors);
        self.validate_cd_ripping(&mut errors);
        self.validate_tools(&mut errors);
        self.validate_video(&mut errors);
        self.validate_ui(&mut errors);
        self.validate_container(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    fn validate_drives(&self, errors: &mut Vec<ValidationError>) {
        let drive = &self.drives.cd_drive;
        push_err(errors, check_device("drives.cd_drive", drive));

        if !self.drives.auto_detect && !drive.is_empty() && !Path::new(drive).exists() {
            errors.push(ValidationError::new(
                "drives.cd_drive",
                drive,
                "device does not exist",
            ));
        }

        for (i, device) in self.drives.available.iter().enumerate() {
            push_err(
                errors,
                check_device(&format!("drives.available[{i}]"), device),
            );
        }
    }

    fn validate_paths(&self, errors: &mut Vec<ValidationError>) {
        push_err(errors, check_absolute("paths.music", &self.paths.music));
        push_err(errors, check_absolute("paths.movies", &self.paths.movies));
        push_err(errors, check_absolute("paths.log_file", &self.paths.log_file));
    }

    fn validate_cd_ripping(&self, errors: &mut Vec<ValidationError>) {
        let cd = &self.cd_ripping;
        push_err(
            errors,
            check_max("cd_ripping.retry_count", cd.retry_count.into(), MAX_RETRY_COUNT.into(), ""),
        );
        push_err(
            errors,
            check_max("cd_ripping.retry_delay", cd.retry_delay, MAX_RETRY_DELAY, " seconds"),
        );
        push_err(errors, check_phase_weight(cd.rip_phase_weight));
        push_err(
            errors,
            check_range(
                "cd_ripping.lookup_timeout_secs",
                cd.lookup_timeout_secs,
                1,
                MAX_LOOKUP_TIMEOUT,
            ),
        );
    }

    fn validate_tools(&self, errors: &mut Vec<ValidationError>) {
        let t = &self.tools;
        for (field, value) in [
            ("tools.cd_discid_path", &t.cd_discid_path),
            ("tools.abcde_path", &t.abcde_path),
            ("tools.cd_info_path", &t.cd_info_path),
            ("tools.cddb_tool_path", &t.cddb_tool_path),
            ("tools.makemkv_path", &t.makemkv_path),
            ("tools.video_rip_path", &t.video_rip_path),
            ("tools.docker_path", &t.docker_path),
        ] {
            push_err(errors, check_tool_path(field, value));
        }
    }

    fn validate_video(&self, errors: &mut Vec<ValidationError>) {
        let v = &self.video;
        if !(v.extra_max_gb >= 0.0) {
            errors.push(ValidationError::new(
                "video.extra_max_gb",
                v.extra_max_gb,
                "cannot be negative",
            ));
        }
        if !(v.feature_min_gb > v.extra_max_gb) {
            errors.push(ValidationError::new(
                "video.feature_min_gb",
                v.feature_min_gb,
                "must be greater than video.extra_max_gb",
            ));
        }
        push_err(
            errors,
            check_range("video.scan_timeout_secs", v.scan_timeout_secs, 1, MAX_LOOKUP_TIMEOUT),
        );
    }

    fn validate_ui(&self, errors: &mut Vec<ValidationError>) {
        push_err(errors, check_refresh_rate(self.ui.refresh_rate));
    }

    fn validate_container(&self, errors: &mut Vec<ValidationError>) {
        if self.uses_container() && self.container.image.trim().is_empty() {
            errors.push(ValidationError::new(
                "container.image",
                &self.container.image,
                "cannot be empty when the container backend is selected",
            ));
        }
    }
}

fn push_err(errors: &mut Vec<ValidationError>, result: Result<(), ValidationError>) {
    if let Err(e) = result {
        errors.push(e);
    }
}

pub(crate) fn check_device(field: &str, device: &str) -> Result<(), ValidationError> {
    if device.is_empty() {
        Err(ValidationError::new(field, device, "cannot be empty"))
    } else if !device.starts_with("/dev/") {
        Err(ValidationError::new(
            field,
            device,
            "must be a device path starting with /dev/",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_absolute(field: &str, path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        Err(ValidationError::new(field, "", "cannot be empty"))
    } else if !path.is_absolute() {
        Err(ValidationError::new(
            field,
            path.display(),
            "must be an absolute path",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_max(field: &str, value: u64, max: u64, unit: &str) -> Result<(), ValidationError> {
    if value > max {
        Err(ValidationError::new(
            field,
            value,
            format!("cannot exceed {max}{unit}"),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), ValidationError> {
    if value < min || value > max {
        Err(ValidationError::new(
            field,
            value,
            format!("must be between {min} and {max}"),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_phase_weight(weight: u8) -> Result<(), ValidationError> {
    check_range("cd_ripping.rip_phase_weight", weight.into(), 1, 99)
}

pub(crate) fn check_refresh_rate(rate: u64) -> Result<(), ValidationError> {
    if rate < MIN_REFRESH_RATE {
        Err(ValidationError::new(
            "ui.refresh_rate",
            rate,
            format!("cannot be less than {MIN_REFRESH_RATE}ms"),
        ))
    } else if rate > MAX_REFRESH_RATE {
        Err(ValidationError::new(
            "ui.refresh_rate",
            rate,
            format!("cannot exceed {MAX_REFRESH_RATE}ms"),
        ))
    } else {
        Ok(())
    }
}

/// An empty tool path is valid, it means "search `PATH`".
pub(crate) fn check_tool_path(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    let path = Path::new(value);
    if !path.exists() {
        Err(ValidationError::new(field, value, "file does not exist"))
    } else if !tools::is_executable(path) {
        Err(ValidationError::new(field, value, "file is not executable"))
    } else {
        Ok(())
    }
}

/// Expands a leading `~/` to the home directory.
pub(crate) fn expand_path(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AppConfig::default().validate(), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut cfg = AppConfig::default();
        cfg.drives.cd_drive = "sr0".into();
        cfg.drives.available = vec!["/dev/sr0".into(), "".into()];
        cfg.paths.music = PathBuf::from("music");
        cfg.cd_ripping.retry_count = 11;
        cfg.cd_ripping.retry_delay = 61;
        cfg.ui.refresh_rate = 10;

        let errors = cfg.validate().unwrap_err();
        let fields: Vec<&str> = errors.0.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(
            fields,
            vec![
                "drives.cd_drive",
                "drives.available[1]",
                "paths.music",
                "cd_ripping.retry_count",
                "cd_ripping.retry_delay",
                "ui.refresh_rate",
            ]
        );
        assert!(errors.to_string().starts_with("6 validation errors:"));
    }

    #[test]
    fn single_error_displays_field_value_and_message() {
        let err = check_device("drives.cd_drive", "sr0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "config validation failed for drives.cd_drive: must be a device path starting with /dev/ (value: sr0)"
        );
    }

    #[test]
    fn missing_device_is_reported_when_not_auto_detecting() {
        let mut cfg = AppConfig::default();
        cfg.drives.auto_detect = false;
        cfg.drives.cd_drive = "/dev/definitely-not-a-drive".into();

        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.0[0].message, "device does not exist");
    }

    #[test]
    fn container_backend_requires_image() {
        let mut cfg = AppConfig::default();
        cfg.execution.preferred_backend = BackendKind::Container;
        cfg.container.image = " ".into();

        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "container.image");
    }

    #[test]
    fn feature_threshold_must_exceed_extra_threshold() {
        let mut cfg = AppConfig::default();
        cfg.video.feature_min_gb = 4.0;

        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "video.feature_min_gb");
    }

    #[rstest]
    #[case("", true)]
    #[case("/definitely/not/here", false)]
    fn tool_paths(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(check_tool_path("tools.abcde_path", value).is_ok(), ok);
    }

    #[test]
    fn non_executable_tool_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abcde");
        std::fs::write(&path, "not a program").unwrap();

        let err = check_tool_path("tools.abcde_path", path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.message, "file is not executable");
    }

    #[rstest]
    #[case(49, false)]
    #[case(50, true)]
    #[case(1000, true)]
    #[case(1001, false)]
    fn refresh_rate_bounds(#[case] rate: u64, #[case] ok: bool) {
        assert_eq!(check_refresh_rate(rate).is_ok(), ok);
    }

    #[test]
    fn expands_home_prefix_only() {
        assert_eq!(expand_path("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_path("rel/~/x"), PathBuf::from("rel/~/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/Music"), home.join("Music"));
        }
    }
}
