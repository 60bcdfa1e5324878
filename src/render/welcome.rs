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

//! The welcome screen.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{
    App, config,
    render::icons::{ICON_MEDIA, ICON_NO_MEDIA},
    util::format::spinner_frame,
};

pub(crate) fn draw_welcome(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::uniform(1));

    let bold = Style::default()
        .fg(app.theme.accent_colour)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(app.theme.muted_colour);
    let text = Style::default().fg(app.theme.text_colour);

    let mut lines = vec![
        Line::from(Span::styled("Disc Ripper", bold)),
        Line::from(Span::styled(
            "Rip audio CDs to tagged files, or pick a title from a video disc.",
            muted,
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("Music  ", muted),
            Span::styled(app.config.paths.music.display().to_string(), text),
        ]),
        Line::from(vec![
            Span::styled("Movies ", muted),
            Span::styled(app.config.paths.movies.display().to_string(), text),
        ]),
        Line::from(vec![
            Span::styled("Format ", muted),
            Span::styled(app.config.cd_ripping.output_format.to_string(), text),
            Span::styled("   Backend ", muted),
            Span::styled(app.config.execution.preferred_backend.to_string(), text),
        ]),
        Line::from(vec![
            Span::styled("Config ", muted),
            Span::styled(
                config::config_path()
                    .map_or_else(|| "(unavailable)".to_string(), |p| p.display().to_string()),
                text,
            ),
        ]),
        Line::default(),
        Line::from(Span::styled("Drives", bold)),
    ];

    if app.drives.is_empty() {
        let message = if app.busy {
            format!("{} Detecting drives...", spinner_frame(app.tick))
        } else {
            "None detected. Press r to look again.".to_string()
        };
        lines.push(Line::from(Span::styled(message, muted)));
    }

    for drive in &app.drives {
        let (icon, media) = if drive.has_media {
            (ICON_MEDIA, "disc present")
        } else {
            (ICON_NO_MEDIA, "empty")
        };
        let mut spans = vec![
            Span::styled(format!("{icon} "), text),
            Span::styled(format!("{:<12}", drive.info.device), text),
            Span::styled(format!("{}  {media}", drive.info.model), muted),
        ];
        if drive.info.device == app.config.drives.cd_drive {
            spans.push(Span::styled("  (selected)", bold));
        }
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}
