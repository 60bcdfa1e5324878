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

//! Recognisers for the text that rip tools print.
//!
//! Each supported tool gets its own interpreter so that a change in a tool's
//! wording breaks one set of pinned samples rather than silently stalling
//! progress. Interpreters only classify lines; [`ProgressModel`] turns the
//! classification into percentages.

use std::sync::LazyLock;

use regex::Regex;

use super::ProgressEvent;
use crate::error::RipError;

static GRABBING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Grabbing track (\d+)").unwrap());
static ENCODING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Encoding track (\d+)").unwrap());
static ROBOT_PROGRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PRGV:(\d+),(\d+),(\d+)").unwrap());
static ROBOT_OPERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^PRG[CT]:\d+,\d+,"([^"]*)""#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

/// A recognised line of tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ToolOutput {
    /// Reading raw audio for the 1-based track.
    Grabbing(usize),
    /// Compressing the 1-based track.
    Encoding(usize),
    Percent(u8),
    Operation(String),
    Error(String),
}

pub(crate) trait OutputInterpreter: Send + Sync {
    fn interpret(&self, stream: Stream, line: &str) -> Option<ToolOutput>;
}

fn stderr_error(stream: Stream, line: &str) -> Option<ToolOutput> {
    (stream == Stream::Stderr && line.to_lowercase().contains("error"))
        .then(|| ToolOutput::Error(line.trim().to_string()))
}

/// Output of `abcde`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AbcdeInterpreter;

impl OutputInterpreter for AbcdeInterpreter {
    fn interpret(&self, stream: Stream, line: &str) -> Option<ToolOutput> {
        if stream == Stream::Stderr {
            return stderr_error(stream, line);
        }

        let track = |re: &Regex| {
            re.captures(line)
                .and_then(|caps| caps[1].parse::<usize>().ok())
        };

        track(&GRABBING)
            .map(ToolOutput::Grabbing)
            .or_else(|| track(&ENCODING).map(ToolOutput::Encoding))
    }
}

/// Robot-mode output of the video rip wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VideoInterpreter;

impl OutputInterpreter for VideoInterpreter {
    fn interpret(&self, stream: Stream, line: &str) -> Option<ToolOutput> {
        if stream == Stream::Stderr {
            return stderr_error(stream, line);
        }

        if let Some(caps) = ROBOT_PROGRESS.captures(line) {
            let total: u64 = caps[2].parse().ok()?;
            let max: u64 = caps[3].parse().ok()?;
            if max == 0 {
                return None;
            }
            let percent = (total.min(max) * 100 / max) as u8;
            return Some(ToolOutput::Percent(percent));
        }

        ROBOT_OPERATION
            .captures(line)
            .map(|caps| ToolOutput::Operation(caps[1].to_string()))
    }
}

/// Maps recognised output onto the overall progress bar.
///
/// The grab phase owns the first `phase_weight` percent of the bar and the
/// encode phase the rest, each advancing in proportion to the track number.
#[derive(Debug, Clone)]
pub(crate) struct ProgressModel {
    tool: &'static str,
    track_names: Vec<String>,
    phase_weight: u8,
    current_track: usize,
}

impl ProgressModel {
    pub(crate) fn new(tool: &'static str, track_names: Vec<String>, phase_weight: u8) -> Self {
        Self {
            tool,
            track_names,
            phase_weight: phase_weight.clamp(1, 99),
            current_track: 0,
        }
    }

    fn total(&self) -> usize {
        self.track_names.len().max(1)
    }

    fn track_event(&mut self, track: usize, percent: u8, status: String) -> ProgressEvent {
        self.current_track = track.clamp(1, self.total());
        ProgressEvent {
            current_track: self.current_track,
            total_tracks: self.total(),
            track_name: self.track_names.get(self.current_track - 1).cloned(),
            progress: percent,
            status,
            error: None,
        }
    }

    fn scaled(&self, track: usize, span: u8) -> u8 {
        let track = track.min(self.total()) as u64;
        (track * span as u64 / self.total() as u64) as u8
    }

    pub(crate) fn event(&mut self, output: ToolOutput) -> ProgressEvent {
        let total = self.total();
        match output {
            ToolOutput::Grabbing(track) => {
                let percent = self.scaled(track, self.phase_weight);
                self.track_event(track, percent, format!("Ripping track {track}/{total}"))
            }
            ToolOutput::Encoding(track) => {
                let percent = self.phase_weight + self.scaled(track, 100 - self.phase_weight);
                self.track_event(track, percent, format!("Encoding track {track}/{total}"))
            }
            ToolOutput::Percent(percent) => {
                let track = self.current_track.max(1);
                self.track_event(track, percent, format!("Ripping... {percent}%"))
            }
            ToolOutput::Operation(name) => {
                let track = self.current_track.max(1);
                self.track_event(track, 0, name)
            }
            ToolOutput::Error(line) => ProgressEvent {
                current_track: self.current_track,
                total_tracks: total,
                track_name: None,
                progress: 0,
                status: format!("Error: {line}"),
                error: Some(RipError::subprocess(self.tool, line)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Track {i:02}")).collect()
    }

    #[rstest]
    #[case("Grabbing track 03: Track 03...", Some(ToolOutput::Grabbing(3)))]
    #[case("Grabbing track 10", Some(ToolOutput::Grabbing(10)))]
    #[case("Encoding track 3 of 10: \"Track 03\"...", Some(ToolOutput::Encoding(3)))]
    #[case("Tagging track 3 of 10: Track 03...", None)]
    #[case("CDDB: error looking up disc", None)]
    fn abcde_stdout(#[case] line: &str, #[case] expected: Option<ToolOutput>) {
        assert_eq!(AbcdeInterpreter.interpret(Stream::Stdout, line), expected);
    }

    #[rstest]
    #[case("[ERROR] abcde: CD could not be read", true)]
    #[case("cdparanoia: read error on sector 1234", true)]
    #[case("[WARNING] something odd", false)]
    #[case("Grabbing track 1", false)]
    fn abcde_stderr(#[case] line: &str, #[case] is_error: bool) {
        let out = AbcdeInterpreter.interpret(Stream::Stderr, line);
        assert_eq!(matches!(out, Some(ToolOutput::Error(_))), is_error);
    }

    #[rstest]
    #[case("PRGV:0,0,65536", Some(ToolOutput::Percent(0)))]
    #[case("PRGV:12000,32768,65536", Some(ToolOutput::Percent(50)))]
    #[case("PRGV:65536,65536,65536", Some(ToolOutput::Percent(100)))]
    #[case("PRGV:1,1,0", None)]
    #[case("PRGC:5018,0,\"Saving to MKV file\"", Some(ToolOutput::Operation("Saving to MKV file".into())))]
    #[case("MSG:5036,0,0,\"Copy complete.\"", None)]
    fn video_stdout(#[case] line: &str, #[case] expected: Option<ToolOutput>) {
        assert_eq!(VideoInterpreter.interpret(Stream::Stdout, line), expected);
    }

    #[test]
    fn half_split_matches_track_position() {
        let mut model = ProgressModel::new("abcde", names(10), 50);

        let grab = model.event(ToolOutput::Grabbing(3));
        assert_eq!(grab.progress, 15);
        assert_eq!(grab.current_track, 3);
        assert_eq!(grab.track_name.as_deref(), Some("Track 03"));

        let encode = model.event(ToolOutput::Encoding(3));
        assert_eq!(encode.progress, 65);
        assert_eq!(encode.status, "Encoding track 3/10");
    }

    #[test]
    fn phase_weight_moves_the_boundary() {
        let mut model = ProgressModel::new("abcde", names(4), 80);
        assert_eq!(model.event(ToolOutput::Grabbing(4)).progress, 80);
        assert_eq!(model.event(ToolOutput::Encoding(2)).progress, 90);
    }

    #[test]
    fn out_of_range_tracks_are_clamped() {
        let mut model = ProgressModel::new("abcde", names(2), 50);
        let event = model.event(ToolOutput::Grabbing(7));
        assert_eq!(event.progress, 50);
        assert_eq!(event.current_track, 2);
    }

    #[test]
    fn errors_carry_the_tool_name() {
        let mut model = ProgressModel::new("abcde", names(2), 50);
        let event = model.event(ToolOutput::Error("read error".into()));
        assert!(event.is_terminal());
        assert_eq!(event.error, Some(RipError::subprocess("abcde", "read error")));
    }
}
