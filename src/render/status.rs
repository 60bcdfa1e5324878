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

//! Key hints and the status bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    App, Screen, StatusKind,
    render::icons::{ICON_ERROR, ICON_INFO, ICON_OK},
    settings::SettingsMode,
    util::format::spinner_frame,
};

fn hints(app: &App) -> &'static [(&'static str, &'static str)] {
    match app.screen {
        Screen::Welcome => &[
            ("c", "rip CD"),
            ("v", "video titles"),
            ("s", "settings"),
            ("r", "detect drives"),
            ("q", "quit"),
        ],
        Screen::CdRip if app.rip_in_progress() => &[("x", "cancel rip")],
        Screen::CdRip => &[("Enter", "start rip"), ("r", "read disc"), ("q", "back")],
        Screen::VideoTitles if app.confirm_title.is_some() => &[("y", "rip title"), ("n", "cancel")],
        Screen::VideoTitles if app.rip_in_progress() => &[("x", "cancel rip")],
        Screen::VideoTitles => &[
            ("\u{2191}\u{2193}", "select"),
            ("Enter", "rip title"),
            ("r", "rescan"),
            ("q", "back"),
        ],
        Screen::Settings if app.settings.is_editing() => &[("Enter", "save"), ("Esc", "discard")],
        Screen::Settings => match app.settings.mode {
            SettingsMode::DrivePicker => &[
                ("\u{2191}\u{2193}", "select"),
                ("Enter", "use drive"),
                ("r", "refresh"),
                ("q", "back"),
            ],
            _ => &[("\u{2191}\u{2193}", "select"), ("Enter", "open"), ("q", "back")],
        },
    }
}

pub(crate) fn draw_hints(f: &mut Frame, area: Rect, app: &App) {
    let spans: Vec<Span> = hints(app)
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(
                    format!(" {key} "),
                    Style::default()
                        .fg(app.theme.background_colour)
                        .bg(app.theme.accent_colour),
                ),
                Span::styled(
                    format!(" {action}  "),
                    Style::default().fg(app.theme.muted_colour),
                ),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub(crate) fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (icon, colour) = match app.status_kind {
        StatusKind::Info => (ICON_INFO, app.theme.text_colour),
        StatusKind::Busy => (spinner_frame(app.tick), app.theme.accent_colour),
        StatusKind::Success => (ICON_OK, app.theme.success_colour),
        StatusKind::Error => (ICON_ERROR, app.theme.error_colour),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {icon} "),
            Style::default().fg(colour).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.status.as_str(), Style::default().fg(colour)),
    ]);

    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(app.theme.gauge_track_colour)),
        area,
    );
}
