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

//! Audio disc descriptors and the identification front door.

mod enrich;
mod identify;

use std::fmt;

pub(crate) use enrich::{Enricher, MetadataSource};
pub(crate) use identify::DiscIdentifier;

use tracing::warn;

use crate::error::RipError;

pub(crate) const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub(crate) const UNKNOWN_ALBUM: &str = "Audio CD";

const DISCID_TOOL: &str = "cd-discid";

/// Red Book limit on audio tracks per disc.
pub(crate) const MAX_TRACKS: usize = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackInfo {
    /// 1-based position on the disc.
    pub(crate) number: usize,
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) duration: Option<String>,
}

impl TrackInfo {
    fn placeholder(number: usize) -> Self {
        Self {
            number,
            title: format!("Track {number:02}"),
            artist: UNKNOWN_ARTIST.to_string(),
            duration: None,
        }
    }
}

/// Everything known about the disc currently in the drive.
///
/// `tracks` always holds exactly `track_count` entries numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiscDescriptor {
    pub(crate) artist: String,
    pub(crate) album: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) track_count: usize,
    pub(crate) tracks: Vec<TrackInfo>,
    pub(crate) disc_id: String,
    pub(crate) cddb_id: String,
    /// Track start sectors followed by the total disc length.
    pub(crate) offsets: Vec<u64>,
    /// Where artist and album came from, when a lookup succeeded.
    pub(crate) metadata_source: Option<MetadataSource>,
}

impl DiscDescriptor {
    pub(crate) fn new(disc_id: &str, track_count: usize, offsets: Vec<u64>) -> Self {
        Self {
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            year: String::new(),
            genre: String::new(),
            track_count,
            tracks: (1..=track_count).map(TrackInfo::placeholder).collect(),
            disc_id: disc_id.to_string(),
            // cd-discid already prints the CDDB form of the id.
            cddb_id: disc_id.to_string(),
            offsets,
            metadata_source: None,
        }
    }

    /// The fixed descriptor used in demo mode.
    pub(crate) fn demo() -> Self {
        let offsets = vec![
            150, 12345, 23456, 34567, 45678, 56789, 67890, 78901, 89012, 90123, 180000,
        ];
        let mut disc = Self::new("a10c6b0d", 10, offsets);
        for track in &mut disc.tracks {
            track.duration = Some("3:45".to_string());
        }
        disc
    }

    /// Sets the disc artist, carrying it to tracks that still show the
    /// placeholder.
    pub(crate) fn set_artist(&mut self, artist: &str) {
        for track in &mut self.tracks {
            if track.artist == self.artist || track.artist == UNKNOWN_ARTIST {
                track.artist = artist.to_string();
            }
        }
        self.artist = artist.to_string();
    }
}

impl fmt::Display for DiscDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({} tracks)", self.artist, self.album, self.track_count)
    }
}

/// Parses a `cd-discid` line: `<id> <count> <offset>... <length>`.
///
/// At most `count + 1` offsets are read; tokens that are not integers are
/// skipped rather than treated as fatal.
///
/// # Errors
///
/// [`RipError::ParseError`] for fewer than three fields, a track count that
/// is zero or above [`MAX_TRACKS`], or offsets out of disc order.
pub(crate) fn parse_discid_output(output: &str) -> Result<DiscDescriptor, RipError> {
    let output = output.trim();
    let fields: Vec<&str> = output.split_whitespace().collect();

    if fields.len() < 3 {
        return Err(RipError::parse(
            DISCID_TOOL,
            format!(
                "'{output}' (expected at least 3 fields, got {})",
                fields.len()
            ),
        ));
    }

    let disc_id = fields[0];
    let track_count: usize = fields[1]
        .parse()
        .map_err(|e| RipError::parse(DISCID_TOOL, format!("invalid track count '{}': {e}", fields[1])))?;

    if track_count == 0 {
        return Err(RipError::parse(DISCID_TOOL, "disc reports no tracks"));
    }
    if track_count > MAX_TRACKS {
        return Err(RipError::parse(
            DISCID_TOOL,
            format!("disc reports {track_count} tracks (at most {MAX_TRACKS} allowed)"),
        ));
    }

    let offsets: Vec<u64> = fields[2..]
        .iter()
        .take(track_count.saturating_add(1))
        .filter_map(|field| match field.parse() {
            Ok(offset) => Some(offset),
            Err(_) => {
                warn!(field, "skipping non-numeric disc offset");
                None
            }
        })
        .collect();

    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(RipError::parse(DISCID_TOOL, "track offsets are out of disc order"));
    }

    Ok(DiscDescriptor::new(disc_id, track_count, offsets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str =
        "a10c6b0d 10 150 12345 23456 34567 45678 56789 67890 78901 89012 90123 180000\n";

    #[test]
    fn parses_a_ten_track_disc() {
        let disc = parse_discid_output(SAMPLE).unwrap();

        assert_eq!(disc.disc_id, "a10c6b0d");
        assert_eq!(disc.cddb_id, "a10c6b0d");
        assert_eq!(disc.track_count, 10);
        assert_eq!(disc.offsets.len(), 11);
        assert_eq!(disc.offsets.last(), Some(&180000));
        assert_eq!(disc.tracks.len(), 10);
        assert_eq!(disc.tracks[0].title, "Track 01");
        assert_eq!(disc.tracks[9].title, "Track 10");
        assert_eq!(disc.artist, UNKNOWN_ARTIST);
        assert_eq!(disc.album, UNKNOWN_ALBUM);
    }

    #[rstest]
    #[case("")]
    #[case("a10c6b0d")]
    #[case("a10c6b0d 10")]
    fn too_few_fields_is_a_parse_error(#[case] output: &str) {
        assert!(matches!(
            parse_discid_output(output),
            Err(RipError::ParseError { .. })
        ));
    }

    #[rstest]
    #[case("a10c6b0d ten 150 180000")]
    #[case("a10c6b0d -2 150 180000")]
    #[case("a10c6b0d 0 150")]
    #[case("a10c6b0d 100 150 180000")]
    #[case("a10c6b0d 5000000 150 180000")]
    #[case("a10c6b0d 18446744073709551615 150 180000")]
    fn bad_track_count_is_a_parse_error(#[case] output: &str) {
        assert!(matches!(
            parse_discid_output(output),
            Err(RipError::ParseError { .. })
        ));
    }

    #[test]
    fn non_numeric_offsets_are_skipped() {
        let disc = parse_discid_output("0b02a903 2 150 junk 9000 12000").unwrap();
        assert_eq!(disc.offsets, vec![150, 9000]);
        assert_eq!(disc.tracks.len(), 2);
    }

    #[test]
    fn extra_fields_beyond_the_table_are_ignored() {
        let disc = parse_discid_output("0b02a903 1 150 9000 77777 88888").unwrap();
        assert_eq!(disc.offsets, vec![150, 9000]);
    }

    #[test]
    fn descending_offsets_are_rejected() {
        assert!(parse_discid_output("0b02a903 2 9000 150 12000").is_err());
    }

    #[rstest]
    #[case(1)]
    #[case(9)]
    #[case(12)]
    #[case(99)]
    fn tracks_are_numbered_and_padded(#[case] count: usize) {
        let disc = DiscDescriptor::new("x", count, vec![]);
        assert_eq!(disc.tracks.len(), count);
        for (i, track) in disc.tracks.iter().enumerate() {
            assert_eq!(track.number, i + 1);
            assert_eq!(track.title, format!("Track {:02}", i + 1));
        }
    }

    #[test]
    fn demo_disc_has_durations() {
        let disc = DiscDescriptor::demo();
        assert_eq!(disc, {
            let mut parsed = parse_discid_output(SAMPLE).unwrap();
            parsed.tracks.iter_mut().for_each(|t| t.duration = Some("3:45".into()));
            parsed
        });
    }

    #[test]
    fn set_artist_updates_placeholder_tracks() {
        let mut disc = DiscDescriptor::new("x", 2, vec![]);
        disc.tracks[1].artist = "Guest".into();

        disc.set_artist("Pink Floyd");

        assert_eq!(disc.artist, "Pink Floyd");
        assert_eq!(disc.tracks[0].artist, "Pink Floyd");
        assert_eq!(disc.tracks[1].artist, "Guest");
    }
}
