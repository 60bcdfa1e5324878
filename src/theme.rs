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

//! Visual styling and color configuration for the TUI.
//!
//! This module defines the application's color palettes and provides
//! utilities for converting colors between Ratatui's internal representation
//! and the hexadecimal strings used for terminal emulator styling.

use ratatui::style::Color;

use crate::config::ThemeName;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Theme {
    pub(crate) background_colour: Color,
    pub(crate) accent_colour: Color,
    pub(crate) border_colour: Color,
    pub(crate) gauge_track_colour: Color,
    pub(crate) text_colour: Color,
    pub(crate) muted_colour: Color,
    pub(crate) selection_colour: Color,

    pub(crate) success_colour: Color,
    pub(crate) warning_colour: Color,
    pub(crate) error_colour: Color,
}

impl Default for Theme {
    // Returns the standard application theme.
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub(crate) const fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default_theme(),
            ThemeName::HighContrast => Self::high_contrast_theme(),
        }
    }

    // Constructs the default theme.
    pub(crate) const fn default_theme() -> Self {
        Self {
            background_colour: Color::Rgb(40, 20, 50),
            accent_colour: Color::Rgb(250, 189, 47),
            border_colour: Color::Rgb(102, 102, 102),
            gauge_track_colour: Color::Rgb(50, 30, 60),
            text_colour: Color::Rgb(255, 255, 255),
            muted_colour: Color::Rgb(162, 161, 166),
            selection_colour: Color::Rgb(179, 157, 219),

            success_colour: Color::Rgb(152, 195, 121),
            warning_colour: Color::Rgb(255, 215, 0),
            error_colour: Color::Rgb(224, 108, 117),
        }
    }

    pub(crate) const fn high_contrast_theme() -> Self {
        Self {
            background_colour: Color::Rgb(0, 0, 0),
            accent_colour: Color::Rgb(255, 255, 0),
            border_colour: Color::Rgb(255, 255, 255),
            gauge_track_colour: Color::Rgb(64, 64, 64),
            text_colour: Color::Rgb(255, 255, 255),
            muted_colour: Color::Rgb(200, 200, 200),
            selection_colour: Color::Rgb(0, 255, 255),

            success_colour: Color::Rgb(0, 255, 0),
            warning_colour: Color::Rgb(255, 165, 0),
            error_colour: Color::Rgb(255, 64, 64),
        }
    }

    /// Converts a [`ratatui::style::Color`] into a CSS-style hexadecimal
    /// string.
    ///
    /// This is primarily used to set the terminal emulator's background color
    /// via escape sequences. Only [`Color::Rgb`] has a hex form, anything else
    /// gives `None` and the terminal background is left alone.
    pub(crate) fn to_hex(colour: Color) -> Option<String> {
        match colour {
            Color::Rgb(r, g, b) => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_colours_have_a_hex_form() {
        assert_eq!(Theme::to_hex(Color::Rgb(40, 20, 50)).as_deref(), Some("#281432"));
        assert_eq!(Theme::to_hex(Color::Reset), None);
    }

    #[test]
    fn theme_follows_configured_name() {
        assert_eq!(Theme::from_name(ThemeName::Default), Theme::default());
        assert_eq!(
            Theme::from_name(ThemeName::HighContrast).background_colour,
            Color::Rgb(0, 0, 0)
        );
    }
}
