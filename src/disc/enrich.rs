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

//! Best-effort artist and album lookup.
//!
//! Rather than speaking a metadata protocol itself, enrichment asks tools
//! that already do: abcde's CDDB lookup first, then CD-Text via `cd-info`,
//! then `cddb_tool`. The first source that yields an artist or album wins.
//! Nothing here ever fails the caller.

use std::{collections::BTreeMap, fmt, sync::Arc, sync::LazyLock, time::Duration};

use regex::Regex;
use tracing::{debug, info, warn};

use super::DiscDescriptor;
use crate::{
    backend::{ExecutionBackend, Invocation},
    config::AppConfig,
    error::RipError,
    tools::{self, Tool},
};

const CDDB_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

static BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{4,}\s*(.+?)\s+/\s+(.+?)\s*-{4,}$").unwrap());
static ARTIST_ALBUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Artist:\s*(.+?)\s+Album:\s*(.+)$").unwrap());
static TRACK_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TTITLE(\d+)=(.*)$").unwrap());
static CD_TEXT_TRACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CD-TEXT for Track\s+(\d+):").unwrap());
static CDDB_MATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\d{3}\s+)?\S+\s+[0-9a-fA-F]{8}\s+)?(.+?)\s+/\s+(.+)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetadataSource {
    Abcde,
    CdText,
    CddbTool,
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abcde => "abcde",
            Self::CdText => "CD-Text",
            Self::CddbTool => "cddb_tool",
        })
    }
}

/// Fields recovered from a lookup. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DiscMetadata {
    pub(crate) artist: String,
    pub(crate) album: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    /// Titles keyed by 1-based track number.
    pub(crate) track_titles: BTreeMap<usize, String>,
}

impl DiscMetadata {
    fn is_useful(&self) -> bool {
        !self.artist.is_empty() || !self.album.is_empty()
    }

    fn apply(self, disc: &mut DiscDescriptor) {
        if !self.artist.is_empty() {
            disc.set_artist(&self.artist);
        }
        if !self.album.is_empty() {
            disc.album = self.album;
        }
        if !self.year.is_empty() {
            disc.year = self.year;
        }
        if !self.genre.is_empty() {
            disc.genre = self.genre;
        }
        for (number, title) in self.track_titles {
            if let Some(track) = number.checked_sub(1).and_then(|i| disc.tracks.get_mut(i)) {
                track.title = title;
            }
        }
    }
}

type Lookup = fn(&Enricher, &DiscDescriptor) -> Result<DiscMetadata, RipError>;

#[derive(Debug, Clone)]
pub(crate) struct Enricher {
    backend: Arc<dyn ExecutionBackend>,
    device: String,
    lookup_timeout: Duration,
}

impl Enricher {
    pub(crate) fn new(cfg: &AppConfig, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            backend,
            device: cfg.drives.cd_drive.trim().to_string(),
            lookup_timeout: Duration::from_secs(cfg.cd_ripping.lookup_timeout_secs),
        }
    }

    /// Tries each source in turn, updating `disc` from the first that
    /// answers. Returns the source used.
    pub(crate) fn enrich(&self, disc: &mut DiscDescriptor) -> Option<MetadataSource> {
        let lookups: [(MetadataSource, Lookup); 3] = [
            (MetadataSource::Abcde, Self::lookup_abcde),
            (MetadataSource::CdText, Self::lookup_cd_text),
            (MetadataSource::CddbTool, Self::lookup_cddb_tool),
        ];

        for (source, lookup) in lookups {
            match lookup(self, disc) {
                Ok(metadata) => {
                    info!(%source, artist = %metadata.artist, album = %metadata.album, "metadata found");
                    metadata.apply(disc);
                    return Some(source);
                }
                Err(RipError::ToolUnavailable { tool }) => debug!(%tool, "lookup tool not installed"),
                Err(e) => warn!(%source, error = %e, "metadata lookup failed"),
            }
        }

        None
    }

    fn lookup_abcde(&self, _disc: &DiscDescriptor) -> Result<DiscMetadata, RipError> {
        let scratch = tempfile::Builder::new()
            .prefix("ripui-lookup-")
            .tempdir()
            .map_err(|e| RipError::subprocess("abcde", e.to_string()))?;

        let invocation = Invocation::new(Tool::Abcde)
            .args(["-N", "-d", self.device.as_str(), "-a", "cddb", "-o", "flac", "-v"])
            .device(&self.device)
            .current_dir(scratch.path());

        let text = self.run(&invocation, self.lookup_timeout)?;
        parse_abcde_output(&text).ok_or_else(|| RipError::parse("abcde", "no artist or album in output"))
    }

    fn lookup_cd_text(&self, _disc: &DiscDescriptor) -> Result<DiscMetadata, RipError> {
        let invocation = Invocation::new(Tool::CdInfo)
            .args(["--no-header", "--no-disc-mode", self.device.as_str()])
            .device(&self.device);

        let text = self.run(&invocation, self.lookup_timeout)?;
        parse_cd_info_output(&text).ok_or_else(|| RipError::parse("cd-info", "disc carries no CD-Text"))
    }

    fn lookup_cddb_tool(&self, disc: &DiscDescriptor) -> Result<DiscMetadata, RipError> {
        let invocation = Invocation::new(Tool::CddbTool).args(["query", disc.cddb_id.as_str()]);

        let text = self.run(&invocation, CDDB_TOOL_TIMEOUT)?;
        parse_cddb_tool_output(&text).ok_or_else(|| RipError::parse("cddb_tool", "no match"))
    }

    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<String, RipError> {
        let tool = invocation.tool.binary_name();
        let cmd = self.backend.command(invocation)?;

        let output = tools::output_with_timeout(cmd, timeout)
            .map_err(|e| RipError::subprocess(tool, e.to_string()))?;
        let text = tools::combined_output(&output);

        if !output.status.success() {
            return Err(RipError::subprocess(tool, format!("exited with {}", output.status)));
        }

        Ok(text)
    }
}

/// Reads abcde's verbose CDDB output.
///
/// CDDB records may split a value over several lines with the same key;
/// those are joined before use.
pub(crate) fn parse_abcde_output(output: &str) -> Option<DiscMetadata> {
    let mut metadata = DiscMetadata::default();
    let mut dtitle = String::new();
    let mut fallback = None;

    // Only leading whitespace is dropped: a split value may end in a space.
    for line in output.lines().map(str::trim_start) {
        if let Some((_, value)) = line.split_once("DTITLE=") {
            dtitle.push_str(value);
        } else if let Some((_, value)) = line.split_once("DYEAR=") {
            metadata.year = value.trim().to_string();
        } else if let Some((_, value)) = line.split_once("DGENRE=") {
            metadata.genre = value.trim().to_string();
        } else if let Some(caps) = TRACK_TITLE.captures(line) {
            if let Some(number) = caps[1].parse::<usize>().ok().and_then(|i| i.checked_add(1)) {
                metadata
                    .track_titles
                    .entry(number)
                    .or_default()
                    .push_str(&caps[2]);
            }
        } else if fallback.is_none() {
            let line = line.trim_end();
            fallback = BANNER
                .captures(line)
                .or_else(|| ARTIST_ALBUM.captures(line))
                .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()));
        }
    }

    if let Some((artist, album)) = dtitle.split_once(" / ") {
        metadata.artist = artist.trim().to_string();
        metadata.album = album.trim().to_string();
    } else if let Some((artist, album)) = fallback {
        metadata.artist = artist;
        metadata.album = album;
    }

    metadata.track_titles.retain(|_, title| {
        *title = title.trim().to_string();
        !title.is_empty()
    });

    metadata.is_useful().then_some(metadata)
}

/// Reads the CD-Text blocks printed by `cd-info`.
///
/// ```text
/// CD-TEXT for Disc:
///     TITLE: The Wall
///     PERFORMER: Pink Floyd
/// CD-TEXT for Track  1:
///     TITLE: In the Flesh?
/// ```
pub(crate) fn parse_cd_info_output(output: &str) -> Option<DiscMetadata> {
    enum Block {
        Other,
        Disc,
        Track(usize),
    }

    let mut metadata = DiscMetadata::default();
    let mut block = Block::Other;

    for line in output.lines().map(str::trim) {
        if line.starts_with("CD-TEXT for Disc") {
            block = Block::Disc;
            continue;
        }
        if let Some(caps) = CD_TEXT_TRACK.captures(line) {
            block = caps[1].parse().map_or(Block::Other, Block::Track);
            continue;
        }
        if line.starts_with("CD-TEXT") || line.starts_with("__") {
            block = Block::Other;
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }

        match (&block, key.trim()) {
            (Block::Disc, "TITLE") => metadata.album = value,
            (Block::Disc, "PERFORMER") => metadata.artist = value,
            (Block::Disc, "GENRE") => metadata.genre = value,
            (Block::Track(n), "TITLE") => {
                metadata.track_titles.insert(*n, value);
            }
            _ => {}
        }
    }

    metadata.is_useful().then_some(metadata)
}

/// Reads the first `artist / album` match from a `cddb_tool query` reply.
pub(crate) fn parse_cddb_tool_output(output: &str) -> Option<DiscMetadata> {
    output.lines().map(str::trim).find_map(|line| {
        // Status lines such as "211 Found inexact matches" carry no title.
        let caps = CDDB_MATCH.captures(line)?;
        Some(DiscMetadata {
            artist: caps[1].trim().to_string(),
            album: caps[2].trim().to_string(),
            ..DiscMetadata::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::NativeBackend, tools::testing::fake_tool};
    use rstest::rstest;
    use std::path::Path;

    const ABCDE_SAMPLE: &str = "\
Grabbing entire CD - tracks: 01 02 03
Retrieving 1 CDDB match...done.
---- Pink Floyd / The Wall ----
1: In the Flesh?
2: The Thin Ice
#
DISCID=a10c6b0d
DTITLE=Pink Floyd / The Wall
DYEAR=1979
DGENRE=Rock
TTITLE0=In the Flesh?
TTITLE1=The Thin Ice
TTITLE2=Another Brick in the Wall, 
TTITLE2=Part 1
";

    const CD_INFO_SAMPLE: &str = "\
CD-ROM Track List (1 - 3)
  #: MSF       LSN    Type   Green? Copy?
  1: 00:02:00  000000 audio  false  no
CD-TEXT for Disc:
\tTITLE: Wish You Were Here
\tPERFORMER: Pink Floyd
\tGENRE: 
CD-TEXT for Track  1:
\tTITLE: Shine On You Crazy Diamond
\tPERFORMER: Pink Floyd
CD-TEXT for Track  2:
\tTITLE: Welcome to the Machine
__________________________________
";

    #[test]
    fn abcde_dtitle_splits_artist_and_album() {
        let metadata = parse_abcde_output("DTITLE=Pink Floyd / The Wall").unwrap();
        assert_eq!(metadata.artist, "Pink Floyd");
        assert_eq!(metadata.album, "The Wall");
    }

    #[test]
    fn abcde_full_record() {
        let metadata = parse_abcde_output(ABCDE_SAMPLE).unwrap();

        assert_eq!(metadata.artist, "Pink Floyd");
        assert_eq!(metadata.album, "The Wall");
        assert_eq!(metadata.year, "1979");
        assert_eq!(metadata.genre, "Rock");
        assert_eq!(metadata.track_titles[&1], "In the Flesh?");
        assert_eq!(metadata.track_titles[&3], "Another Brick in the Wall, Part 1");
    }

    #[rstest]
    #[case("---- Kraftwerk / Computer World ----", "Kraftwerk", "Computer World")]
    #[case("Found match. Artist: Bjork Album: Homogenic", "Bjork", "Homogenic")]
    fn abcde_fallback_patterns(#[case] output: &str, #[case] artist: &str, #[case] album: &str) {
        let metadata = parse_abcde_output(output).unwrap();
        assert_eq!(metadata.artist, artist);
        assert_eq!(metadata.album, album);
    }

    #[test]
    fn abcde_track_index_at_the_integer_limit_is_skipped() {
        let output = "DTITLE=Pink Floyd / The Wall\nTTITLE18446744073709551615=x\nTTITLE0=In the Flesh?\n";
        let metadata = parse_abcde_output(output).unwrap();

        assert_eq!(metadata.track_titles.len(), 1);
        assert_eq!(metadata.track_titles[&1], "In the Flesh?");
    }

    #[test]
    fn abcde_without_matches_yields_nothing() {
        assert_eq!(parse_abcde_output("No CDDB match.\nDTITLE=\n"), None);
    }

    #[test]
    fn cd_text_disc_and_track_blocks() {
        let metadata = parse_cd_info_output(CD_INFO_SAMPLE).unwrap();

        assert_eq!(metadata.album, "Wish You Were Here");
        assert_eq!(metadata.artist, "Pink Floyd");
        assert_eq!(metadata.genre, "");
        assert_eq!(metadata.track_titles.len(), 2);
        assert_eq!(metadata.track_titles[&2], "Welcome to the Machine");
    }

    #[test]
    fn cd_info_without_cd_text_yields_nothing() {
        assert_eq!(parse_cd_info_output("CD-ROM Track List (1 - 3)\n  1: 00:02:00\n"), None);
    }

    #[rstest]
    #[case("200 rock a10c6b0d Pink Floyd / The Wall", "Pink Floyd", "The Wall")]
    #[case("211 Found inexact matches\nmisc 0b02a903 Air / Moon Safari\n.", "Air", "Moon Safari")]
    #[case("Portishead / Dummy", "Portishead", "Dummy")]
    fn cddb_tool_matches(#[case] output: &str, #[case] artist: &str, #[case] album: &str) {
        let metadata = parse_cddb_tool_output(output).unwrap();
        assert_eq!(metadata.artist, artist);
        assert_eq!(metadata.album, album);
    }

    #[test]
    fn cddb_tool_no_match() {
        assert_eq!(parse_cddb_tool_output("202 No match found\n"), None);
    }

    fn enricher(tools: crate::config::ToolsConfig) -> Enricher {
        let mut cfg = AppConfig::default();
        cfg.drives.cd_drive = "/dev/sr0".into();
        cfg.cd_ripping.lookup_timeout_secs = 5;
        cfg.tools = tools;
        Enricher::new(&cfg, Arc::new(NativeBackend::new(&cfg.tools)))
    }

    fn path(p: &Path) -> String {
        p.to_string_lossy().into_owned()
    }

    #[test]
    fn abcde_lookup_updates_the_disc() {
        let dir = tempfile::tempdir().unwrap();
        let abcde = fake_tool(dir.path(), "abcde", "echo 'DTITLE=Pink Floyd / The Wall'");

        let enricher = enricher(crate::config::ToolsConfig {
            abcde_path: path(&abcde),
            ..Default::default()
        });
        let mut disc = DiscDescriptor::new("a10c6b0d", 2, vec![]);

        assert_eq!(enricher.enrich(&mut disc), Some(MetadataSource::Abcde));
        assert_eq!(disc.artist, "Pink Floyd");
        assert_eq!(disc.album, "The Wall");
        assert_eq!(disc.tracks[0].artist, "Pink Floyd");
    }

    #[test]
    fn falls_through_to_cddb_tool() {
        let dir = tempfile::tempdir().unwrap();
        let abcde = fake_tool(dir.path(), "abcde", "echo 'No match'");
        let cd_info = fake_tool(dir.path(), "cd-info", "exit 1");
        let cddb = fake_tool(
            dir.path(),
            "cddb_tool",
            "[ \"$2\" = a10c6b0d ] || exit 1\necho '200 rock a10c6b0d Air / Moon Safari'",
        );

        let enricher = enricher(crate::config::ToolsConfig {
            abcde_path: path(&abcde),
            cd_info_path: path(&cd_info),
            cddb_tool_path: path(&cddb),
            ..Default::default()
        });
        let mut disc = DiscDescriptor::new("a10c6b0d", 2, vec![]);

        assert_eq!(enricher.enrich(&mut disc), Some(MetadataSource::CddbTool));
        assert_eq!(disc.album, "Moon Safari");
    }

    #[test]
    fn no_tools_leaves_placeholders() {
        let missing = "/nonexistent/tool".to_string();
        let enricher = enricher(crate::config::ToolsConfig {
            abcde_path: missing.clone(),
            cd_info_path: missing.clone(),
            cddb_tool_path: missing,
            ..Default::default()
        });
        let mut disc = DiscDescriptor::new("a10c6b0d", 2, vec![]);
        let before = disc.clone();

        assert_eq!(enricher.enrich(&mut disc), None);
        assert_eq!(disc, before);
    }
}
