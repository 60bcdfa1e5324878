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

//! Unicode symbols for the TUI.
//!
//! These are selected for compatibility with most modern terminal emulators
//! and fonts.

pub(crate) const ICON_DISC: &str = "\u{1F4BF}";
pub(crate) const ICON_MEDIA: &str = "\u{25CF}";
pub(crate) const ICON_NO_MEDIA: &str = "\u{25CB}";
pub(crate) const ICON_SELECTED: &str = "\u{25B6}";

pub(crate) const ICON_OK: &str = "\u{2714}";
pub(crate) const ICON_ERROR: &str = "\u{2718}";
pub(crate) const ICON_INFO: &str = "\u{2139}";
