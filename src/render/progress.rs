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

//! The progress panel shared by the CD and video screens.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{App, ripper::RipState, util::format};

pub(crate) fn draw_progress(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let Some(event) = &app.progress else {
        let idle = match app.rip_state {
            RipState::Starting => "Starting...",
            _ => "Not ripping",
        };
        f.render_widget(
            Paragraph::new(idle).style(Style::default().fg(app.theme.muted_colour)),
            rows[0],
        );
        return;
    };

    let mut spans = vec![Span::styled(
        format::format_track_position(event.current_track, event.total_tracks),
        Style::default()
            .fg(app.theme.accent_colour)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(name) = &event.track_name {
        spans.push(Span::styled(
            format!("  {name}"),
            Style::default().fg(app.theme.text_colour),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    let gauge_colour = if event.error.is_some() {
        app.theme.error_colour
    } else {
        app.theme.accent_colour
    };
    let gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(gauge_colour)
                .bg(app.theme.gauge_track_colour),
        )
        .ratio(format::percent_ratio(event.progress))
        .label(format!("{}%", event.progress))
        .use_unicode(true);
    f.render_widget(gauge, rows[1]);

    f.render_widget(
        Paragraph::new(event.status.as_str()).style(Style::default().fg(app.theme.muted_colour)),
        rows[2],
    );
}
