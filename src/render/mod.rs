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

//! User interface rendering logic.
//!
//! This module handles the translation of the [`App`] state into visual
//! widgets using the `ratatui` framework. It is responsible for layout
//! management, widget styling, and terminal frame composition.
//!
//! # Rendering Pipeline
//!
//! The primary entry point is the [`draw`] function, which is called after
//! every event to provide a reactive user interface. Each screen has its own
//! sub-module; the header and the status bar are shared.

mod cd;
mod icons;
mod progress;
mod settings;
mod status;
mod video;
mod welcome;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::{App, Screen};

/// Renders the user interface to the terminal frame.
///
/// The screen is split into a one-line header, the body of the active
/// screen, a key hint line and the status bar.
pub(crate) fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background_colour)),
        area,
    );

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, outer[0], app);

    match app.screen {
        Screen::Welcome => welcome::draw_welcome(f, outer[1], app),
        Screen::CdRip => cd::draw_cd(f, outer[1], app),
        Screen::VideoTitles => video::draw_video(f, outer[1], app),
        Screen::Settings => settings::draw_settings(f, outer[1], app),
    }

    status::draw_hints(f, outer[2], app);
    status::draw_status(f, outer[3], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let screen = match app.screen {
        Screen::Welcome => "Home",
        Screen::CdRip => "CD Ripping",
        Screen::VideoTitles => "Video Titles",
        Screen::Settings => "Settings",
    };

    let drive = if app.config.drives.cd_drive.is_empty() {
        "no drive".to_string()
    } else {
        app.config.drives.cd_drive.clone()
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ripui ", icons::ICON_DISC),
            Style::default()
                .fg(app.theme.accent_colour)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("\u{2502} {screen} "), Style::default().fg(app.theme.text_colour)),
        Span::styled(format!("\u{2502} {drive}"), Style::default().fg(app.theme.muted_colour)),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

/// A rectangle of `width` by `height` centred in `area`, clipped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
