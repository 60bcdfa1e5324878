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

//! The editable settings, one table per configuration section.

use std::fmt::Display;
use std::str::FromStr;

use crate::config::{
    AppConfig, BackendKind, Choice, MetadataMethod, OutputFormat, PullPolicy, ThemeName,
    ValidationError, expand_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    Number,
    Toggle,
    Choice,
}

/// One editable key.
pub(crate) struct Field {
    /// Dotted path of the key, as used in validation errors.
    pub(crate) key: &'static str,
    pub(crate) label: &'static str,
    pub(crate) kind: FieldKind,
    get: fn(&AppConfig) -> String,
    set: fn(&mut AppConfig, &str) -> Result<(), ValidationError>,
    /// Next value for toggles and choices.
    next: Option<fn(&str) -> String>,
}

impl Field {
    pub(crate) fn value(&self, cfg: &AppConfig) -> String {
        (self.get)(cfg)
    }

    /// The value Enter would switch to, for toggles and choices.
    pub(crate) fn next_value(&self, cfg: &AppConfig) -> Option<String> {
        self.next.map(|next| next(&self.value(cfg)))
    }

    /// Returns `cfg` with `input` applied, provided the result still passes
    /// validation for this key.
    pub(crate) fn apply(&self, cfg: &AppConfig, input: &str) -> Result<AppConfig, ValidationError> {
        let mut updated = cfg.clone();
        (self.set)(&mut updated, input.trim())?;

        if let Err(errors) = updated.validate()
            && let Some(error) = errors.0.into_iter().find(|e| e.field == self.key)
        {
            return Err(error);
        }

        Ok(updated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Drives,
    Paths,
    CdRipping,
    Execution,
    Tools,
    Video,
    Ui,
    Container,
}

impl Section {
    pub(crate) const ALL: [Section; 8] = [
        Section::Drives,
        Section::Paths,
        Section::CdRipping,
        Section::Execution,
        Section::Tools,
        Section::Video,
        Section::Ui,
        Section::Container,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Section::Drives => "Drives",
            Section::Paths => "Output Paths",
            Section::CdRipping => "CD Ripping",
            Section::Execution => "Execution",
            Section::Tools => "Tool Paths",
            Section::Video => "Video Titles",
            Section::Ui => "Interface",
            Section::Container => "Container",
        }
    }

    pub(crate) fn fields(self) -> &'static [Field] {
        match self {
            Section::Drives => DRIVES,
            Section::Paths => PATHS,
            Section::CdRipping => CD_RIPPING,
            Section::Execution => EXECUTION,
            Section::Tools => TOOLS,
            Section::Video => VIDEO,
            Section::Ui => UI,
            Section::Container => CONTAINER,
        }
    }
}

fn number<T: FromStr>(key: &str, input: &str) -> Result<T, ValidationError> {
    input
        .parse()
        .map_err(|_| ValidationError::new(key, input, "must be a number"))
}

fn flag(key: &str, input: &str) -> Result<bool, ValidationError> {
    match input {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::new(key, input, "must be true or false")),
    }
}

fn choice<C: Choice>(key: &str, input: &str) -> Result<C, ValidationError> {
    C::parse(input).ok_or_else(|| {
        ValidationError::new(key, input, format!("must be one of: {}", C::choices()))
    })
}

fn list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn toggle_next(value: &str) -> String {
    (value != "true").to_string()
}

fn choice_next<C: Choice>(value: &str) -> String {
    C::parse(value)
        .map(|c| c.cycle())
        .unwrap_or(C::ALL[0])
        .as_str()
        .to_string()
}

fn shown<T: Display>(value: T) -> String {
    value.to_string()
}

static DRIVES: &[Field] = &[
    Field {
        key: "drives.cd_drive",
        label: "CD drive",
        kind: FieldKind::Text,
        get: |c| c.drives.cd_drive.clone(),
        set: |c, v| {
            c.drives.cd_drive = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "drives.auto_detect",
        label: "Auto-detect drives",
        kind: FieldKind::Toggle,
        get: |c| shown(c.drives.auto_detect),
        set: |c, v| {
            c.drives.auto_detect = flag("drives.auto_detect", v)?;
            Ok(())
        },
        next: Some(toggle_next),
    },
    Field {
        key: "drives.available",
        label: "Known drives",
        kind: FieldKind::Text,
        get: |c| c.drives.available.join(", "),
        set: |c, v| {
            c.drives.available = list(v);
            Ok(())
        },
        next: None,
    },
];

static PATHS: &[Field] = &[
    Field {
        key: "paths.music",
        label: "Music output",
        kind: FieldKind::Text,
        get: |c| c.paths.music.display().to_string(),
        set: |c, v| {
            c.paths.music = expand_path(v);
            Ok(())
        },
        next: None,
    },
    Field {
        key: "paths.movies",
        label: "Movie output",
        kind: FieldKind::Text,
        get: |c| c.paths.movies.display().to_string(),
        set: |c, v| {
            c.paths.movies = expand_path(v);
            Ok(())
        },
        next: None,
    },
    Field {
        key: "paths.log_file",
        label: "Log file",
        kind: FieldKind::Text,
        get: |c| c.paths.log_file.display().to_string(),
        set: |c, v| {
            c.paths.log_file = expand_path(v);
            Ok(())
        },
        next: None,
    },
];

static CD_RIPPING: &[Field] = &[
    Field {
        key: "cd_ripping.output_format",
        label: "Output format",
        kind: FieldKind::Choice,
        get: |c| shown(c.cd_ripping.output_format),
        set: |c, v| {
            c.cd_ripping.output_format = choice::<OutputFormat>("cd_ripping.output_format", v)?;
            Ok(())
        },
        next: Some(choice_next::<OutputFormat>),
    },
    Field {
        key: "cd_ripping.metadata_method",
        label: "Metadata lookup",
        kind: FieldKind::Choice,
        get: |c| shown(c.cd_ripping.metadata_method),
        set: |c, v| {
            c.cd_ripping.metadata_method =
                choice::<MetadataMethod>("cd_ripping.metadata_method", v)?;
            Ok(())
        },
        next: Some(choice_next::<MetadataMethod>),
    },
    Field {
        key: "cd_ripping.auto_eject",
        label: "Eject when done",
        kind: FieldKind::Toggle,
        get: |c| shown(c.cd_ripping.auto_eject),
        set: |c, v| {
            c.cd_ripping.auto_eject = flag("cd_ripping.auto_eject", v)?;
            Ok(())
        },
        next: Some(toggle_next),
    },
    Field {
        key: "cd_ripping.retry_count",
        label: "Detection retries",
        kind: FieldKind::Number,
        get: |c| shown(c.cd_ripping.retry_count),
        set: |c, v| {
            c.cd_ripping.retry_count = number("cd_ripping.retry_count", v)?;
            Ok(())
        },
        next: None,
    },
    Field {
        key: "cd_ripping.retry_delay",
        label: "Retry delay (s)",
        kind: FieldKind::Number,
        get: |c| shown(c.cd_ripping.retry_delay),
        set: |c, v| {
            c.cd_ripping.retry_delay = number("cd_ripping.retry_delay", v)?;
            Ok(())
        },
        next: None,
    },
    Field {
        key: "cd_ripping.rip_phase_weight",
        label: "Grab phase share (%)",
        kind: FieldKind::Number,
        get: |c| shown(c.cd_ripping.rip_phase_weight),
        set: |c, v| {
            c.cd_ripping.rip_phase_weight = number("cd_ripping.rip_phase_weight", v)?;
            Ok(())
        },
        next: None,
    },
    Field {
        key: "cd_ripping.lookup_timeout_secs",
        label: "Lookup timeout (s)",
        kind: FieldKind::Number,
        get: |c| shown(c.cd_ripping.lookup_timeout_secs),
        set: |c, v| {
            c.cd_ripping.lookup_timeout_secs = number("cd_ripping.lookup_timeout_secs", v)?;
            Ok(())
        },
        next: None,
    },
];

static EXECUTION: &[Field] = &[
    Field {
        key: "execution.preferred_backend",
        label: "Backend",
        kind: FieldKind::Choice,
        get: |c| shown(c.execution.preferred_backend),
        set: |c, v| {
            c.execution.preferred_backend = choice::<BackendKind>("execution.preferred_backend", v)?;
            Ok(())
        },
        next: Some(choice_next::<BackendKind>),
    },
    Field {
        key: "execution.verbose_logging",
        label: "Verbose logging",
        kind: FieldKind::Toggle,
        get: |c| shown(c.execution.verbose_logging),
        set: |c, v| {
            c.execution.verbose_logging = flag("execution.verbose_logging", v)?;
            Ok(())
        },
        next: Some(toggle_next),
    },
    Field {
        key: "execution.demo_mode",
        label: "Demo mode",
        kind: FieldKind::Toggle,
        get: |c| shown(c.execution.demo_mode),
        set: |c, v| {
            c.execution.demo_mode = flag("execution.demo_mode", v)?;
            Ok(())
        },
        next: Some(toggle_next),
    },
];

static TOOLS: &[Field] = &[
    Field {
        key: "tools.cd_discid_path",
        label: "cd-discid",
        kind: FieldKind::Text,
        get: |c| c.tools.cd_discid_path.clone(),
        set: |c, v| {
            c.tools.cd_discid_path = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "tools.abcde_path",
        label: "abcde",
        kind: FieldKind::Text,
        get: |c| c.tools.abcde_path.clone(),
        set: |c, v| {
            c.tools.abcde_path = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "tools.cd_info_path",
        label: "cd-info",
        kind: FieldKind::Text,
        get: |c| c.tools.cd_info_path.clone(),
        set: |c, v| {
            c.tools.cd_info_path = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "tools.cddb_tool_path",
        label: "cddb_tool",
        kind: FieldKind::Text,
        get: |c| c.tools.cddb_tool_path.clone(),
        set: |c, v| {
            c.tools.cddb_tool_path = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "tools.makemkv_path",
        label: "makemkvcon",
        kind: FieldKind::Text,
        get: |c| c.tools.makemkv_path.clone(),
        set: |c, v| {
            c.tools.makemkv_path = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "tools.video_rip_path",
        label: "rip-video",
        kind: FieldKind::Text,
        get: |c| c.tools.video_rip_path.clone(),
        set: |c, v| {
            c.tools.video_rip_path = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "tools.docker_path",
        label: "docker",
        kind: FieldKind::Text,
        get: |c| c.tools.docker_path.clone(),
        set: |c, v| {
            c.tools.docker_path = v.to_string();
            Ok(())
        },
        next: None,
    },
];

static VIDEO: &[Field] = &[
    Field {
        key: "video.main_feature_patterns",
        label: "Main feature files",
        kind: FieldKind::Text,
        get: |c| c.video.main_feature_patterns.join(", "),
        set: |c, v| {
            c.video.main_feature_patterns = list(v);
            Ok(())
        },
        next: None,
    },
    Field {
        key: "video.extra_max_gb",
        label: "Extras below (GB)",
        kind: FieldKind::Number,
        get: |c| shown(c.video.extra_max_gb),
        set: |c, v| {
            c.video.extra_max_gb = number("video.extra_max_gb", v)?;
            Ok(())
        },
        next: None,
    },
    Field {
        key: "video.feature_min_gb",
        label: "Features from (GB)",
        kind: FieldKind::Number,
        get: |c| shown(c.video.feature_min_gb),
        set: |c, v| {
            c.video.feature_min_gb = number("video.feature_min_gb", v)?;
            Ok(())
        },
        next: None,
    },
    Field {
        key: "video.scan_timeout_secs",
        label: "Scan timeout (s)",
        kind: FieldKind::Number,
        get: |c| shown(c.video.scan_timeout_secs),
        set: |c, v| {
            c.video.scan_timeout_secs = number("video.scan_timeout_secs", v)?;
            Ok(())
        },
        next: None,
    },
];

static UI: &[Field] = &[
    Field {
        key: "ui.theme",
        label: "Theme",
        kind: FieldKind::Choice,
        get: |c| shown(c.ui.theme),
        set: |c, v| {
            c.ui.theme = choice::<ThemeName>("ui.theme", v)?;
            Ok(())
        },
        next: Some(choice_next::<ThemeName>),
    },
    Field {
        key: "ui.refresh_rate",
        label: "Refresh rate (ms)",
        kind: FieldKind::Number,
        get: |c| shown(c.ui.refresh_rate),
        set: |c, v| {
            c.ui.refresh_rate = number("ui.refresh_rate", v)?;
            Ok(())
        },
        next: None,
    },
];

static CONTAINER: &[Field] = &[
    Field {
        key: "container.enabled",
        label: "Use container",
        kind: FieldKind::Toggle,
        get: |c| shown(c.container.enabled),
        set: |c, v| {
            c.container.enabled = flag("container.enabled", v)?;
            Ok(())
        },
        next: Some(toggle_next),
    },
    Field {
        key: "container.image",
        label: "Image",
        kind: FieldKind::Text,
        get: |c| c.container.image.clone(),
        set: |c, v| {
            c.container.image = v.to_string();
            Ok(())
        },
        next: None,
    },
    Field {
        key: "container.pull_policy",
        label: "Pull policy",
        kind: FieldKind::Choice,
        get: |c| shown(c.container.pull_policy),
        set: |c, v| {
            c.container.pull_policy = choice::<PullPolicy>("container.pull_policy", v)?;
            Ok(())
        },
        next: Some(choice_next::<PullPolicy>),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn field(key: &str) -> &'static Field {
        Section::ALL
            .iter()
            .flat_map(|s| s.fields())
            .find(|f| f.key == key)
            .unwrap()
    }

    #[test]
    fn keys_are_unique_and_readable() {
        let cfg = AppConfig::default();
        let mut keys: Vec<&str> = Section::ALL
            .iter()
            .flat_map(|s| s.fields())
            .map(|f| {
                let _ = f.value(&cfg);
                f.key
            })
            .collect();
        let count = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), count);
    }

    #[test]
    fn every_field_round_trips_its_own_value() {
        let cfg = AppConfig::default();
        for field in Section::ALL.iter().flat_map(|s| s.fields()) {
            let applied = field.apply(&cfg, &field.value(&cfg)).unwrap();
            assert_eq!(field.value(&applied), field.value(&cfg), "{}", field.key);
        }
    }

    #[rstest]
    #[case("cd_ripping.retry_count", "11")]
    #[case("cd_ripping.retry_count", "three")]
    #[case("cd_ripping.rip_phase_weight", "0")]
    #[case("ui.refresh_rate", "10")]
    #[case("paths.music", "relative/dir")]
    #[case("drives.cd_drive", "sr0")]
    #[case("video.feature_min_gb", "1.0")]
    #[case("cd_ripping.output_format", "aac")]
    #[case("tools.abcde_path", "/nonexistent/abcde")]
    fn invalid_values_are_rejected(#[case] key: &str, #[case] input: &str) {
        let err = field(key).apply(&AppConfig::default(), input).unwrap_err();
        assert_eq!(err.field, key);
    }

    #[test]
    fn valid_values_are_applied() {
        let cfg = field("cd_ripping.retry_count")
            .apply(&AppConfig::default(), " 7 ")
            .unwrap();
        assert_eq!(cfg.cd_ripping.retry_count, 7);

        let cfg = field("video.main_feature_patterns")
            .apply(&cfg, "00001.mpls, ,00002.mpls")
            .unwrap();
        assert_eq!(cfg.video.main_feature_patterns, vec!["00001.mpls", "00002.mpls"]);
    }

    #[test]
    fn unrelated_errors_do_not_block_an_edit() {
        let mut cfg = AppConfig::default();
        cfg.paths.music = "relative".into();

        let updated = field("ui.refresh_rate").apply(&cfg, "200").unwrap();
        assert_eq!(updated.ui.refresh_rate, 200);
    }

    #[test]
    fn toggles_and_choices_cycle() {
        let cfg = AppConfig::default();
        assert_eq!(field("execution.demo_mode").next_value(&cfg).as_deref(), Some("true"));
        assert_eq!(field("ui.theme").next_value(&cfg).as_deref(), Some("high-contrast"));
        assert_eq!(field("cd_ripping.retry_count").next_value(&cfg), None);
    }
}
