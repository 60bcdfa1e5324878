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

//! Application configuration.
//!
//! This module manages the application configuration file, a TOML document
//! stored with `confy` under the platform configuration directory. Every
//! section falls back to its defaults when missing, so a partial file written
//! by an older version still loads.

mod validate;

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

pub(crate) use validate::{ValidationError, expand_path};

const CONFIG_NAME: &str = "ripui";
const CONFIG_FILE: &str = "config";

/// A closed set of string choices for a configuration key.
pub(crate) trait Choice: Sized + Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    /// Comma separated list of the valid spellings, for error messages.
    fn choices() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The choice following this one, wrapping around.
    fn cycle(self) -> Self {
        let index = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

macro_rules! impl_display_for_choice {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    #[default]
    Flac,
    Mp3,
    Ogg,
    Wav,
}

impl Choice for OutputFormat {
    const ALL: &'static [Self] = &[Self::Flac, Self::Mp3, Self::Ogg, Self::Wav];

    fn as_str(self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
        }
    }
}

/// How disc metadata is looked up before and during a rip.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MetadataMethod {
    #[default]
    MusicBrainz,
    Cddb,
    None,
}

impl Choice for MetadataMethod {
    const ALL: &'static [Self] = &[Self::MusicBrainz, Self::Cddb, Self::None];

    fn as_str(self) -> &'static str {
        match self {
            Self::MusicBrainz => "musicbrainz",
            Self::Cddb => "cddb",
            Self::None => "none",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BackendKind {
    #[default]
    Native,
    Container,
}

impl Choice for BackendKind {
    const ALL: &'static [Self] = &[Self::Native, Self::Container];

    fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Container => "container",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PullPolicy {
    Always,
    #[default]
    IfNotPresent,
    Never,
}

impl Choice for PullPolicy {
    const ALL: &'static [Self] = &[Self::Always, Self::IfNotPresent, Self::Never];

    fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::IfNotPresent => "if_not_present",
            Self::Never => "never",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ThemeName {
    #[default]
    Default,
    HighContrast,
}

impl Choice for ThemeName {
    const ALL: &'static [Self] = &[Self::Default, Self::HighContrast];

    fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::HighContrast => "high-contrast",
        }
    }
}

impl_display_for_choice!(OutputFormat, MetadataMethod, BackendKind, PullPolicy, ThemeName);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) version: u32,
    pub(crate) drives: DrivesConfig,
    pub(crate) paths: PathsConfig,
    pub(crate) cd_ripping: CdRippingConfig,
    pub(crate) execution: ExecutionConfig,
    pub(crate) tools: ToolsConfig,
    pub(crate) video: VideoConfig,
    pub(crate) ui: UiConfig,
    pub(crate) container: ContainerConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct DrivesConfig {
    pub(crate) cd_drive: String,
    pub(crate) auto_detect: bool,
    pub(crate) available: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct PathsConfig {
    pub(crate) music: PathBuf,
    pub(crate) movies: PathBuf,
    pub(crate) log_file: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct CdRippingConfig {
    pub(crate) retry_count: u32,
    pub(crate) retry_delay: u64,
    pub(crate) auto_eject: bool,
    pub(crate) output_format: OutputFormat,
    pub(crate) metadata_method: MetadataMethod,
    /// Share of the progress bar owned by the grab phase, the encode phase
    /// gets the rest.
    pub(crate) rip_phase_weight: u8,
    pub(crate) lookup_timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct ExecutionConfig {
    pub(crate) preferred_backend: BackendKind,
    pub(crate) verbose_logging: bool,
    /// Substitute a fixed demo disc when the identification tool is missing.
    pub(crate) demo_mode: bool,
}

/// Tool path overrides, an empty value means search `PATH`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub(crate) struct ToolsConfig {
    pub(crate) cd_discid_path: String,
    pub(crate) abcde_path: String,
    pub(crate) cd_info_path: String,
    pub(crate) cddb_tool_path: String,
    pub(crate) makemkv_path: String,
    pub(crate) video_rip_path: String,
    pub(crate) docker_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct VideoConfig {
    pub(crate) main_feature_patterns: Vec<String>,
    /// Titles smaller than this are labelled as extras regardless of name.
    pub(crate) extra_max_gb: f64,
    /// Titles at least this large are labelled as the feature regardless of
    /// name.
    pub(crate) feature_min_gb: f64,
    pub(crate) scan_timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct UiConfig {
    pub(crate) theme: ThemeName,
    pub(crate) refresh_rate: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct ContainerConfig {
    pub(crate) image: String,
    pub(crate) pull_policy: PullPolicy,
    pub(crate) enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            drives: DrivesConfig::default(),
            paths: PathsConfig::default(),
            cd_ripping: CdRippingConfig::default(),
            execution: ExecutionConfig::default(),
            tools: ToolsConfig::default(),
            video: VideoConfig::default(),
            ui: UiConfig::default(),
            container: ContainerConfig::default(),
        }
    }
}

impl Default for DrivesConfig {
    fn default() -> Self {
        Self {
            cd_drive: "/dev/sr0".to_string(),
            auto_detect: true,
            available: vec![
                "/dev/sr0".to_string(),
                "/dev/sr1".to_string(),
                "/dev/cdrom".to_string(),
            ],
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let state = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| home.join(".local").join("state"));

        Self {
            music: dirs::audio_dir().unwrap_or_else(|| home.join("Music")),
            movies: dirs::video_dir().unwrap_or_else(|| home.join("Videos")),
            log_file: state.join(CONFIG_NAME).join("ripui.log"),
        }
    }
}

impl Default for CdRippingConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: 5,
            auto_eject: true,
            output_format: OutputFormat::Flac,
            metadata_method: MetadataMethod::MusicBrainz,
            rip_phase_weight: 50,
            lookup_timeout_secs: 30,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendKind::Native,
            verbose_logging: true,
            demo_mode: false,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            main_feature_patterns: vec![
                "00800.mpls".to_string(),
                "00801.mpls".to_string(),
                "00001.mpls".to_string(),
            ],
            extra_max_gb: 5.0,
            feature_min_gb: 15.0,
            scan_timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Default,
            refresh_rate: 100,
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: "ripui-tools:latest".to_string(),
            pull_policy: PullPolicy::IfNotPresent,
            enabled: false,
        }
    }
}

impl PathsConfig {
    /// Expands a leading `~/` in every path.
    fn expand_home(&mut self) {
        for path in [&mut self.music, &mut self.movies, &mut self.log_file] {
            if let Some(text) = path.to_str() {
                *path = expand_path(text);
            }
        }
    }
}

impl AppConfig {
    /// Resolves `~/` in paths written by hand into the configuration file.
    fn with_home_expanded(mut self) -> Self {
        self.paths.expand_home();
        self
    }

    /// Whether tools should be launched through the container runtime.
    pub(crate) fn uses_container(&self) -> bool {
        self.execution.preferred_backend == BackendKind::Container || self.container.enabled
    }
}

pub(crate) fn load_config() -> Result<AppConfig, confy::ConfyError> {
    confy::load(CONFIG_NAME, Some(CONFIG_FILE)).map(AppConfig::with_home_expanded)
}

pub(crate) fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, Some(CONFIG_FILE), cfg)
}

pub(crate) fn config_path() -> Option<PathBuf> {
    confy::get_configuration_file_path(CONFIG_NAME, Some(CONFIG_FILE)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn partial_file_falls_back_to_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[cd_ripping]\noutput_format = \"mp3\"\nmetadata_method = \"none\"\n",
        )
        .unwrap();

        let cfg: AppConfig = confy::load_path(&path).unwrap();

        assert_eq!(cfg.cd_ripping.output_format, OutputFormat::Mp3);
        assert_eq!(cfg.cd_ripping.metadata_method, MetadataMethod::None);
        assert_eq!(cfg.cd_ripping.retry_count, 3);
        assert_eq!(cfg.cd_ripping.rip_phase_weight, 50);
        assert_eq!(cfg.drives.cd_drive, "/dev/sr0");
        assert_eq!(cfg.ui.refresh_rate, 100);
    }

    #[test]
    fn home_relative_paths_are_expanded_on_load() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[paths]\nmusic = \"~/Rips/Music\"\nmovies = \"/srv/movies\"\nlog_file = \"~/ripui.log\"\n",
        )
        .unwrap();

        let cfg = confy::load_path::<AppConfig>(&path).unwrap().with_home_expanded();

        assert_eq!(cfg.paths.music, home.join("Rips/Music"));
        assert_eq!(cfg.paths.movies, PathBuf::from("/srv/movies"));
        assert_eq!(cfg.paths.log_file, home.join("ripui.log"));
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn stored_config_uses_readable_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.container.pull_policy = PullPolicy::IfNotPresent;
        cfg.ui.theme = ThemeName::HighContrast;
        confy::store_path(&path, &cfg).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("pull_policy = \"if_not_present\""));
        assert!(text.contains("theme = \"high-contrast\""));
        assert!(text.contains("metadata_method = \"musicbrainz\""));
    }

    #[rstest]
    #[case("flac", Some(OutputFormat::Flac))]
    #[case(" ogg ", Some(OutputFormat::Ogg))]
    #[case("aac", None)]
    #[case("", None)]
    fn parses_output_format(#[case] input: &str, #[case] expected: Option<OutputFormat>) {
        assert_eq!(OutputFormat::parse(input), expected);
    }

    #[test]
    fn choices_cycle_and_list() {
        assert_eq!(MetadataMethod::None.cycle(), MetadataMethod::MusicBrainz);
        assert_eq!(BackendKind::Native.cycle(), BackendKind::Container);
        assert_eq!(OutputFormat::choices(), "flac, mp3, ogg, wav");
    }

    #[test]
    fn container_flag_or_backend_selects_container() {
        let mut cfg = AppConfig::default();
        assert!(!cfg.uses_container());

        cfg.container.enabled = true;
        assert!(cfg.uses_container());

        cfg.container.enabled = false;
        cfg.execution.preferred_backend = BackendKind::Container;
        assert!(cfg.uses_container());
    }
}
