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

//! The CD ripping screen: what is known about the disc, then progress.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{
    App,
    disc::DiscDescriptor,
    render::{icons::ICON_SELECTED, progress::draw_progress},
    theme::Theme,
    util::format::spinner_frame,
};

pub(crate) fn draw_cd(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let block = Block::default()
        .title(" Disc ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let lines = match &app.disc {
        Some(disc) => disc_lines(disc, app),
        None if app.busy => vec![Line::from(Span::styled(
            format!("{} Reading disc...", spinner_frame(app.tick)),
            Style::default().fg(app.theme.accent_colour),
        ))],
        None => vec![Line::from(Span::styled(
            "No disc identified. Insert an audio CD and press r.",
            Style::default().fg(app.theme.muted_colour),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    draw_progress(f, chunks[1], app);
}

fn field<'a>(label: &'a str, value: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(theme.muted_colour)),
        Span::styled(
            value,
            Style::default()
                .fg(theme.accent_colour)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn disc_lines<'a>(disc: &'a DiscDescriptor, app: &App) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let mut lines = vec![
        field("Artist", &disc.artist, theme),
        field("Album", &disc.album, theme),
    ];
    if !disc.year.is_empty() {
        lines.push(field("Year", &disc.year, theme));
    }
    if !disc.genre.is_empty() {
        lines.push(field("Genre", &disc.genre, theme));
    }
    lines.push(field("Disc ID", &disc.disc_id, theme));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<10}", "Metadata"), Style::default().fg(theme.muted_colour)),
        Span::styled(
            disc.metadata_source
                .map_or_else(|| "none found".to_string(), |s| s.to_string()),
            Style::default().fg(theme.text_colour),
        ),
    ]));
    lines.push(Line::default());

    let current = app
        .progress
        .as_ref()
        .filter(|_| app.active_rip.is_some())
        .map(|p| p.current_track);

    for track in &disc.tracks {
        let playing = current == Some(track.number);
        let marker = if playing { ICON_SELECTED } else { " " };
        let style = if playing {
            Style::default()
                .fg(theme.accent_colour)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_colour)
        };

        let mut spans = vec![
            Span::styled(format!("{marker} {:>2}. ", track.number), style),
            Span::styled(track.title.as_str(), style),
        ];
        if let Some(duration) = &track.duration {
            spans.push(Span::styled(
                format!("  {duration}"),
                Style::default().fg(theme.muted_colour),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines
}
