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

//! Optical drive discovery.
//!
//! Detection probes a fixed list of conventional device nodes, then merges in
//! any `sr*` entries from the block-device registry. Everything here is best
//! effort: unreadable metadata becomes a placeholder, and a host with no
//! optical drives simply yields an empty list.

use std::{
    collections::HashSet,
    fs::{self, File},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::debug;

const UNKNOWN_DRIVE: &str = "Unknown Drive";
const UNKNOWN_MEDIA: &str = "Unknown";

/// Conventional optical device names, relative to the device root.
const CANDIDATE_NAMES: &[&str] = &["sr0", "sr1", "sr2", "sr3", "cdrom", "dvd", "cdrw"];

static SCSI_OPTICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^sr\d+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DriveInfo {
    pub(crate) device: String,
    pub(crate) model: String,
    pub(crate) read_only: bool,
    pub(crate) media_type: String,
}

/// A detected drive and whether it currently holds a disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DriveStatus {
    pub(crate) info: DriveInfo,
    pub(crate) has_media: bool,
}

impl DriveStatus {
    pub(crate) fn probe(info: DriveInfo) -> Self {
        let has_media = has_media(&info.device);
        Self { info, has_media }
    }
}

/// Host locations consulted during detection.
#[derive(Debug, Clone)]
pub(crate) struct DriveLocator {
    dev_root: PathBuf,
    sys_block: PathBuf,
    cdrom_info: PathBuf,
}

impl Default for DriveLocator {
    fn default() -> Self {
        Self {
            dev_root: PathBuf::from("/dev"),
            sys_block: PathBuf::from("/sys/block"),
            cdrom_info: PathBuf::from("/proc/sys/dev/cdrom/info"),
        }
    }
}

impl DriveLocator {
    #[cfg(test)]
    fn with_roots(dev_root: &Path, sys_block: &Path, cdrom_info: &Path) -> Self {
        Self {
            dev_root: dev_root.to_path_buf(),
            sys_block: sys_block.to_path_buf(),
            cdrom_info: cdrom_info.to_path_buf(),
        }
    }

    /// Lists every optical drive found on the host, de-duplicated by path.
    pub(crate) fn detect_drives(&self) -> Vec<DriveInfo> {
        let mut seen = HashSet::new();
        let capabilities = fs::read_to_string(&self.cdrom_info).ok();

        let probed = CANDIDATE_NAMES
            .iter()
            .map(|name| self.dev_root.join(name))
            .filter(|path| path.metadata().is_ok_and(|m| !m.is_dir()));

        let registered = self.registered_devices();

        let drives: Vec<DriveInfo> = probed
            .chain(registered)
            .filter(|path| seen.insert(path.clone()))
            .map(|path| self.describe(&path, capabilities.as_deref()))
            .collect();

        debug!(count = drives.len(), "drive detection finished");
        drives
    }

    /// `sr*` entries from the block registry, mapped to device nodes.
    fn registered_devices(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.sys_block) else {
            return vec![];
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| SCSI_OPTICAL.is_match(name))
            .collect();
        names.sort();

        names.into_iter().map(|n| self.dev_root.join(n)).collect()
    }

    fn describe(&self, path: &Path, capabilities: Option<&str>) -> DriveInfo {
        let name = kernel_name(path);

        DriveInfo {
            device: path.to_string_lossy().into_owned(),
            model: self.model(&name),
            read_only: self.read_only(&name),
            media_type: media_type(&name, capabilities),
        }
    }

    fn model(&self, name: &str) -> String {
        let device_dir = self.sys_block.join(name).join("device");
        let vendor = read_trimmed(&device_dir.join("vendor"));
        let model = read_trimmed(&device_dir.join("model"));

        match (vendor, model) {
            (Some(vendor), Some(model)) => format!("{vendor} {model}"),
            (None, Some(model)) => model,
            (Some(vendor), None) => vendor,
            (None, None) => UNKNOWN_DRIVE.to_string(),
        }
    }

    fn read_only(&self, name: &str) -> bool {
        read_trimmed(&self.sys_block.join(name).join("ro")).is_some_and(|ro| ro == "1")
    }
}

/// Reports whether the device node can be opened, a cheap media check.
pub(crate) fn has_media(device: &str) -> bool {
    File::open(device).is_ok()
}

/// The kernel name behind a device node, following symlinks such as
/// `/dev/cdrom -> sr0`.
fn kernel_name(path: &Path) -> String {
    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_trimmed(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Infers a coarse media label from the kernel's cdrom capability table,
/// falling back to a device-name guess.
fn media_type(name: &str, capabilities: Option<&str>) -> String {
    if let Some(label) = capabilities.and_then(|text| label_from_capabilities(name, text)) {
        return label.to_string();
    }

    if name.starts_with("sr") {
        "CD/DVD".to_string()
    } else {
        UNKNOWN_MEDIA.to_string()
    }
}

/// The capability table is column oriented, one column per drive:
///
/// ```text
/// drive name:     sr1     sr0
/// Can read DVD:   0       1
/// ```
fn label_from_capabilities(name: &str, text: &str) -> Option<&'static str> {
    let mut column = None;
    let mut reads_dvd = None;
    let mut mentions_bd = false;

    for line in text.lines() {
        let Some((key, values)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<&str> = values.split_whitespace().collect();

        match key.trim() {
            "drive name" => column = values.iter().position(|v| *v == name),
            "Can read DVD" => reads_dvd = column.and_then(|c| values.get(c)).map(|v| *v == "1"),
            key if key.contains("BD") => {
                mentions_bd |= column.and_then(|c| values.get(c)).is_some_and(|v| *v == "1");
            }
            _ => {}
        }
    }

    column?;

    Some(match (mentions_bd, reads_dvd) {
        (true, _) => "Blu-ray/DVD/CD",
        (false, Some(true)) => "DVD/CD",
        (false, _) => "CD",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CAPABILITIES: &str = "CD-ROM information, Id: cdrom.c 3.20 2003/12/17

drive name:\t\tsr1\tsr0
drive speed:\t\t24\t48
Can read multisession:\t1\t1
Can read DVD:\t\t0\t1
Can write DVD-R:\t0\t1
";

    struct FakeHost {
        _dir: tempfile::TempDir,
        dev: PathBuf,
        sys: PathBuf,
        info: PathBuf,
    }

    impl FakeHost {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let dev = dir.path().join("dev");
            let sys = dir.path().join("sys/block");
            let info = dir.path().join("cdrom_info");
            fs::create_dir_all(&dev).unwrap();
            fs::create_dir_all(&sys).unwrap();
            Self { _dir: dir, dev, sys, info }
        }

        fn add_drive(&self, name: &str, vendor: Option<&str>, model: Option<&str>, ro: &str) {
            fs::write(self.dev.join(name), "").unwrap();
            let device = self.sys.join(name).join("device");
            fs::create_dir_all(&device).unwrap();
            if let Some(vendor) = vendor {
                fs::write(device.join("vendor"), format!("{vendor}\n")).unwrap();
            }
            if let Some(model) = model {
                fs::write(device.join("model"), format!("{model}   \n")).unwrap();
            }
            fs::write(self.sys.join(name).join("ro"), format!("{ro}\n")).unwrap();
        }

        fn locator(&self) -> DriveLocator {
            DriveLocator::with_roots(&self.dev, &self.sys, &self.info)
        }
    }

    #[test]
    fn empty_host_yields_no_drives() {
        let host = FakeHost::new();
        assert!(host.locator().detect_drives().is_empty());
    }

    #[test]
    fn missing_roots_yield_no_drives() {
        let locator = DriveLocator::with_roots(
            Path::new("/nonexistent/dev"),
            Path::new("/nonexistent/sys"),
            Path::new("/nonexistent/info"),
        );
        assert!(locator.detect_drives().is_empty());
    }

    #[test]
    fn reads_model_read_only_and_capabilities() {
        let host = FakeHost::new();
        host.add_drive("sr0", Some("HL-DT-ST"), Some("BD-RE  WH16NS40"), "1");
        host.add_drive("sr1", None, None, "0");
        fs::write(&host.info, CAPABILITIES).unwrap();

        let drives = host.locator().detect_drives();

        assert_eq!(drives.len(), 2);
        assert_eq!(drives[0].device, host.dev.join("sr0").to_string_lossy());
        assert_eq!(drives[0].model, "HL-DT-ST BD-RE  WH16NS40");
        assert!(drives[0].read_only);
        assert_eq!(drives[0].media_type, "DVD/CD");

        assert_eq!(drives[1].model, UNKNOWN_DRIVE);
        assert!(!drives[1].read_only);
        assert_eq!(drives[1].media_type, "CD");
    }

    #[test]
    fn registry_entries_are_merged_without_duplicates() {
        let host = FakeHost::new();
        host.add_drive("sr0", None, Some("DVD-ROM"), "0");
        // Registered but outside the fixed probe list.
        host.add_drive("sr7", None, None, "0");
        // Not an optical device.
        fs::create_dir_all(host.sys.join("sda")).unwrap();

        let devices: Vec<String> = host
            .locator()
            .detect_drives()
            .into_iter()
            .map(|d| d.device)
            .collect();

        assert_eq!(
            devices,
            vec![
                host.dev.join("sr0").to_string_lossy().into_owned(),
                host.dev.join("sr7").to_string_lossy().into_owned(),
            ]
        );
    }

    #[test]
    fn symlinked_names_use_target_metadata() {
        let host = FakeHost::new();
        host.add_drive("sr0", Some("ASUS"), None, "0");
        std::os::unix::fs::symlink(host.dev.join("sr0"), host.dev.join("cdrom")).unwrap();

        let drives = host.locator().detect_drives();
        let cdrom = drives.iter().find(|d| d.device.ends_with("cdrom")).unwrap();

        assert_eq!(cdrom.model, "ASUS");
        assert_eq!(cdrom.media_type, "CD/DVD");
    }

    #[test]
    fn directories_are_not_drives() {
        let host = FakeHost::new();
        fs::create_dir_all(host.dev.join("sr0")).unwrap();
        assert!(host.locator().detect_drives().is_empty());
    }

    #[test]
    fn bluray_capability_is_preferred() {
        let text = "drive name:\tsr0\nCan read DVD:\t1\nCan read BD:\t1\n";
        assert_eq!(label_from_capabilities("sr0", text), Some("Blu-ray/DVD/CD"));
        assert_eq!(label_from_capabilities("sr5", text), None);
    }

    #[test]
    fn media_type_falls_back_to_name() {
        assert_eq!(media_type("sr2", None), "CD/DVD");
        assert_eq!(media_type("hdc", None), UNKNOWN_MEDIA);
    }

    #[test]
    fn has_media_requires_an_openable_node() {
        assert!(!has_media("/nonexistent/sr0"));
    }
}
