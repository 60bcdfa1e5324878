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

//! Video disc titles: listing, labelling and ripping one chosen title.
//!
//! Labels are a guess built from the playlist file name and the title size.
//! They only order the list; the user always picks and confirms the title.

use std::{collections::BTreeMap, fmt, path::PathBuf, sync::Arc, sync::LazyLock, time::Duration};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    backend::{ExecutionBackend, Invocation},
    config::{AppConfig, VideoConfig},
    error::RipError,
    ripper::{self, ProgressModel, RipHandle, Session, VideoInterpreter},
    tools::{self, Tool},
};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

static TITLE_ADDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"File (\S+) was added as title #(\d+)").unwrap());
static TINFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^TINFO:(\d+),(\d+),\d+,"(.*)"$"#).unwrap());
static SIZE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\d.]+)\s*(KB|MB|GB|TB)$").unwrap());

/// Robot attribute ids used for title details.
const ATTR_DURATION: u32 = 9;
const ATTR_SIZE_TEXT: u32 = 10;
const ATTR_SIZE_BYTES: u32 = 11;
const ATTR_SOURCE_FILE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TitleLabel {
    LikelyMainFeature,
    PossibleMainFeature,
    LikelyExtra,
}

impl fmt::Display for TitleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LikelyMainFeature => "likely main feature (guess)",
            Self::PossibleMainFeature => "possible main feature (guess)",
            Self::LikelyExtra => "likely extra (guess)",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TitleInfo {
    pub(crate) index: usize,
    pub(crate) source_file: String,
    pub(crate) duration: Option<String>,
    pub(crate) size: Option<String>,
    pub(crate) size_gb: Option<f64>,
    pub(crate) label: TitleLabel,
}

impl TitleInfo {
    pub(crate) fn display_name(&self) -> String {
        format!("Title {} ({})", self.index, self.source_file)
    }
}

/// Per-title attributes from robot output.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TitleDetails {
    pub(crate) duration: Option<String>,
    pub(crate) size: Option<String>,
    pub(crate) size_gb: Option<f64>,
    pub(crate) source_file: Option<String>,
}

/// Reads `File <name> was added as title #<n>` lines, in disc order.
pub(crate) fn parse_title_list(output: &str) -> Vec<(usize, String)> {
    let mut titles: Vec<(usize, String)> = output
        .lines()
        .filter_map(|line| TITLE_ADDED.captures(line))
        .filter_map(|caps| Some((caps[2].parse().ok()?, caps[1].to_string())))
        .collect();

    titles.sort_by_key(|(index, _)| *index);
    titles.dedup_by_key(|(index, _)| *index);
    titles
}

/// Collects `TINFO:<title>,<attr>,<code>,"<value>"` lines by title.
pub(crate) fn parse_robot_details(output: &str) -> BTreeMap<usize, TitleDetails> {
    let mut details: BTreeMap<usize, TitleDetails> = BTreeMap::new();

    for caps in output.lines().filter_map(|line| TINFO.captures(line.trim())) {
        let (Ok(title), Ok(attr)) = (caps[1].parse::<usize>(), caps[2].parse::<u32>()) else {
            continue;
        };
        let value = caps[3].to_string();
        let entry = details.entry(title).or_default();

        match attr {
            ATTR_DURATION => entry.duration = Some(value),
            ATTR_SIZE_TEXT => {
                entry.size_gb = entry.size_gb.or_else(|| size_text_gb(&value));
                entry.size = Some(value);
            }
            ATTR_SIZE_BYTES => {
                if let Ok(bytes) = value.parse::<u64>() {
                    entry.size_gb = Some(bytes as f64 / BYTES_PER_GB);
                }
            }
            ATTR_SOURCE_FILE => entry.source_file = Some(value),
            _ => {}
        }
    }

    details
}

fn size_text_gb(text: &str) -> Option<f64> {
    let caps = SIZE_TEXT.captures(text.trim())?;
    let value: f64 = caps[1].parse().ok()?;
    let scale = match &caps[2] {
        "KB" => 1.0 / (1024.0 * 1024.0),
        "MB" => 1.0 / 1024.0,
        "GB" => 1.0,
        _ => 1024.0,
    };
    Some(value * scale)
}

/// Guesses what a title is. Size, when known, outweighs the file name.
pub(crate) fn classify(source_file: &str, size_gb: Option<f64>, cfg: &VideoConfig) -> TitleLabel {
    let named_like_feature = cfg
        .main_feature_patterns
        .iter()
        .any(|pattern| source_file.eq_ignore_ascii_case(pattern.trim()));

    match size_gb {
        Some(size) if size >= cfg.feature_min_gb => TitleLabel::LikelyMainFeature,
        Some(size) if size < cfg.extra_max_gb => TitleLabel::LikelyExtra,
        Some(_) if named_like_feature => TitleLabel::LikelyMainFeature,
        Some(_) => TitleLabel::PossibleMainFeature,
        None if named_like_feature => TitleLabel::LikelyMainFeature,
        None => TitleLabel::LikelyExtra,
    }
}

/// Lists the titles on the video disc in the drive.
#[derive(Debug, Clone)]
pub(crate) struct TitleScanner {
    backend: Arc<dyn ExecutionBackend>,
    device: String,
    video: VideoConfig,
}

impl TitleScanner {
    pub(crate) fn new(cfg: &AppConfig, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            backend,
            device: cfg.drives.cd_drive.trim().to_string(),
            video: cfg.video.clone(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.video.scan_timeout_secs)
    }

    fn run(&self, invocation: Invocation) -> Result<String, RipError> {
        let tool = invocation.tool.binary_name();
        let cmd = self.backend.command(&invocation)?;

        let output = tools::output_with_timeout(cmd, self.timeout())
            .map_err(|e| RipError::subprocess(tool, e.to_string()))?;
        if !output.status.success() {
            return Err(RipError::subprocess(tool, format!("exited with {}", output.status)));
        }

        Ok(tools::combined_output(&output))
    }

    /// Lists the titles, then fills in duration and size from one robot
    /// pass. A failed robot pass leaves titles labelled by name only.
    pub(crate) fn scan(&self) -> Result<Vec<TitleInfo>, RipError> {
        if self.device.is_empty() {
            return Err(RipError::DetectionFailed("no drive configured".into()));
        }
        let source = format!("dev:{}", self.device);

        let listing = self.run(
            Invocation::new(Tool::MakeMkv)
                .args(["info", source.as_str()])
                .device(self.device.as_str()),
        )?;

        let titles = parse_title_list(&listing);
        if titles.is_empty() {
            return Err(RipError::DetectionFailed(format!(
                "no video titles found in drive {}",
                self.device
            )));
        }
        debug!(count = titles.len(), "titles listed");

        let details = match self.run(
            Invocation::new(Tool::MakeMkv)
                .args(["-r", "info", source.as_str()])
                .device(self.device.as_str()),
        ) {
            Ok(robot) => parse_robot_details(&robot),
            Err(e) => {
                warn!(error = %e, "title details unavailable");
                BTreeMap::new()
            }
        };

        let titles = titles
            .into_iter()
            .map(|(index, source_file)| {
                let detail = details.get(&index).cloned().unwrap_or_default();
                TitleInfo {
                    index,
                    label: classify(&source_file, detail.size_gb, &self.video),
                    source_file,
                    duration: detail.duration,
                    size: detail.size,
                    size_gb: detail.size_gb,
                }
            })
            .collect();

        Ok(titles)
    }
}

/// Rips one chosen title with the video rip wrapper.
#[derive(Debug, Clone)]
pub(crate) struct VideoRipper {
    backend: Arc<dyn ExecutionBackend>,
    device: String,
    output_dir: PathBuf,
}

impl VideoRipper {
    pub(crate) fn new(cfg: &AppConfig, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            backend,
            device: cfg.drives.cd_drive.trim().to_string(),
            output_dir: cfg.paths.movies.clone(),
        }
    }

    pub(crate) fn rip(&self, title: &TitleInfo) -> Result<RipHandle, RipError> {
        let output_dir = self.output_dir.to_string_lossy().into_owned();
        let invocation = Invocation::new(Tool::VideoRip)
            .args([self.device.clone(), title.index.to_string(), output_dir])
            .device(self.device.as_str())
            .volume(&self.output_dir);

        let launch = self.backend.command(&invocation)?;
        ripper::ensure_output_dir(&self.output_dir)?;

        info!(title = title.index, source = %title.source_file, "starting title rip");

        let tool = Tool::VideoRip.binary_name();
        ripper::start_session(Session {
            tool,
            launch,
            interpreter: Arc::new(VideoInterpreter),
            model: ProgressModel::new(tool, vec![title.display_name()], 50),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::NativeBackend, ripper::RipState, tools::testing::fake_tool};
    use rstest::rstest;

    const LISTING: &str = "\
MakeMKV v1.17.7 linux(x64-release) started
Using direct disc access mode
Title #00001.m2ts was skipped
File 00801.mpls was added as title #1
File 00800.mpls was added as title #0
File 00042.mpls was added as title #2
Operation successfully completed
";

    const ROBOT: &str = r#"MSG:1005,0,1,"MakeMKV started","%1 started","MakeMKV"
TCOUNT:3
TINFO:0,9,0,"2:11:08"
TINFO:0,10,0,"31.4 GB"
TINFO:0,11,0,"33715322880"
TINFO:0,16,0,"00800.mpls"
TINFO:1,9,0,"2:11:08"
TINFO:1,10,0,"9.8 GB"
TINFO:2,9,0,"0:04:12"
TINFO:2,10,0,"512.0 MB"
"#;

    fn video_config() -> VideoConfig {
        VideoConfig::default()
    }

    #[test]
    fn title_list_is_ordered_by_index() {
        assert_eq!(
            parse_title_list(LISTING),
            vec![
                (0, "00800.mpls".to_string()),
                (1, "00801.mpls".to_string()),
                (2, "00042.mpls".to_string()),
            ]
        );
    }

    #[test]
    fn robot_details_by_title() {
        let details = parse_robot_details(ROBOT);

        assert_eq!(details.len(), 3);
        assert_eq!(details[&0].duration.as_deref(), Some("2:11:08"));
        assert_eq!(details[&0].source_file.as_deref(), Some("00800.mpls"));
        assert!((details[&0].size_gb.unwrap() - 31.4).abs() < 0.05);
        assert!((details[&1].size_gb.unwrap() - 9.8).abs() < 1e-9);
        assert!((details[&2].size_gb.unwrap() - 0.5).abs() < 1e-9);
    }

    #[rstest]
    #[case("00042.mpls", Some(20.0), TitleLabel::LikelyMainFeature)]
    #[case("00800.mpls", Some(1.2), TitleLabel::LikelyExtra)]
    #[case("00800.mpls", Some(9.0), TitleLabel::LikelyMainFeature)]
    #[case("00042.mpls", Some(9.0), TitleLabel::PossibleMainFeature)]
    #[case("00801.mpls", None, TitleLabel::LikelyMainFeature)]
    #[case("00042.mpls", None, TitleLabel::LikelyExtra)]
    fn labels_are_guessed(
        #[case] source: &str,
        #[case] size_gb: Option<f64>,
        #[case] expected: TitleLabel,
    ) {
        assert_eq!(classify(source, size_gb, &video_config()), expected);
    }

    #[test]
    fn labels_say_they_are_guesses() {
        assert!(TitleLabel::LikelyMainFeature.to_string().contains("guess"));
        assert!(TitleLabel::LikelyExtra.to_string().contains("guess"));
    }

    fn config(dir: &std::path::Path, makemkv: &str, rip_video: &str) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.drives.cd_drive = "/dev/sr0".into();
        cfg.paths.movies = dir.join("movies");
        cfg.video.scan_timeout_secs = 5;
        cfg.tools.makemkv_path = fake_tool(dir, "makemkvcon", makemkv)
            .to_string_lossy()
            .into_owned();
        cfg.tools.video_rip_path = fake_tool(dir, "rip-video", rip_video)
            .to_string_lossy()
            .into_owned();
        cfg
    }

    #[test]
    fn scan_combines_listing_and_details() {
        let dir = tempfile::tempdir().unwrap();
        let listing = dir.path().join("listing.txt");
        let robot = dir.path().join("robot.txt");
        std::fs::write(&listing, LISTING).unwrap();
        std::fs::write(&robot, ROBOT).unwrap();
        let script = format!(
            "if [ \"$1\" = -r ]; then cat '{}'; else cat '{}'; fi",
            robot.display(),
            listing.display()
        );
        let cfg = config(dir.path(), &script, "exit 0");

        let titles = TitleScanner::new(&cfg, Arc::new(NativeBackend::new(&cfg.tools)))
            .scan()
            .unwrap();

        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0].label, TitleLabel::LikelyMainFeature);
        assert_eq!(titles[1].label, TitleLabel::LikelyMainFeature);
        assert_eq!(titles[2].label, TitleLabel::LikelyExtra);
        assert_eq!(titles[2].duration.as_deref(), Some("0:04:12"));
    }

    #[test]
    fn failed_robot_pass_keeps_the_listing() {
        let dir = tempfile::tempdir().unwrap();
        let listing = dir.path().join("listing.txt");
        std::fs::write(&listing, LISTING).unwrap();
        let script = format!("[ \"$1\" = -r ] && exit 1\ncat '{}'", listing.display());
        let cfg = config(dir.path(), &script, "exit 0");

        let titles = TitleScanner::new(&cfg, Arc::new(NativeBackend::new(&cfg.tools)))
            .scan()
            .unwrap();

        assert_eq!(titles.len(), 3);
        assert!(titles.iter().all(|t| t.size_gb.is_none()));
        assert_eq!(titles[2].label, TitleLabel::LikelyExtra);
    }

    #[test]
    fn empty_disc_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), "echo 'Operation successfully completed'", "exit 0");

        let err = TitleScanner::new(&cfg, Arc::new(NativeBackend::new(&cfg.tools)))
            .scan()
            .unwrap_err();

        assert!(matches!(err, RipError::DetectionFailed(_)));
    }

    #[test]
    fn title_rip_reports_robot_progress() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(
            dir.path(),
            "exit 0",
            "[ \"$2\" = 3 ] || exit 9\necho 'PRGV:0,16384,65536'\necho 'PRGV:0,49152,65536'",
        );
        let title = TitleInfo {
            index: 3,
            source_file: "00800.mpls".into(),
            duration: None,
            size: None,
            size_gb: None,
            label: TitleLabel::LikelyMainFeature,
        };

        let handle = VideoRipper::new(&cfg, Arc::new(NativeBackend::new(&cfg.tools)))
            .rip(&title)
            .unwrap();

        let percents: Vec<u8> = handle
            .progress
            .iter()
            .take_while(|e| e.progress < 100 && e.error.is_none())
            .map(|e| e.progress)
            .collect();
        assert_eq!(percents, vec![0, 25, 75]);
        assert_eq!(handle.wait(), RipState::Completed);
        assert!(cfg.paths.movies.is_dir());
    }
}
