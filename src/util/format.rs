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

//! Formatting helpers for values shown in the interface.

/// Frames of the busy indicator, advanced on every tick.
const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub(crate) fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Formats a size in gigabytes, e.g. `"24.7 GB"`, or `"?"` when unknown.
pub(crate) fn format_gb(size_gb: Option<f64>) -> String {
    match size_gb {
        Some(gb) => format!("{gb:.1} GB"),
        None => "?".to_string(),
    }
}

/// Track position for the progress panel, e.g. `"Track 3 of 12"`.
pub(crate) fn format_track_position(current: usize, total: usize) -> String {
    match (current, total) {
        (0, _) => String::new(),
        (current, 0) => format!("Track {current}"),
        (current, total) => format!("Track {current} of {total}"),
    }
}

/// Ratio for a gauge from a 0 to 100 percentage.
pub(crate) fn percent_ratio(percent: u8) -> f64 {
    f64::from(percent.min(100)) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(24.66), "24.7 GB")]
    #[case(Some(0.0), "0.0 GB")]
    #[case(None, "?")]
    fn sizes(#[case] size: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_gb(size), expected);
    }

    #[rstest]
    #[case(0, 10, "")]
    #[case(3, 0, "Track 3")]
    #[case(3, 12, "Track 3 of 12")]
    fn track_positions(#[case] current: usize, #[case] total: usize, #[case] expected: &str) {
        assert_eq!(format_track_position(current, total), expected);
    }

    #[test]
    fn spinner_wraps() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER_FRAMES.len()));
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(percent_ratio(50), 0.5);
        assert_eq!(percent_ratio(250), 1.0);
    }
}
