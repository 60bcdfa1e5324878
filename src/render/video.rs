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

//! The video title screen: the scanned title list, the rip confirmation and
//! progress.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::{
    App,
    render::{centered, icons::ICON_SELECTED, progress::draw_progress},
    util::format::{format_gb, spinner_frame},
    video::{TitleInfo, TitleLabel},
};

pub(crate) fn draw_video(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let block = Block::default()
        .title(" Titles ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    if app.titles.is_empty() {
        let message = if app.busy {
            Span::styled(
                format!("{} Scanning disc titles...", spinner_frame(app.tick)),
                Style::default().fg(app.theme.accent_colour),
            )
        } else {
            Span::styled(
                "No titles found. Insert a video disc and press r.",
                Style::default().fg(app.theme.muted_colour),
            )
        };
        f.render_widget(Paragraph::new(Line::from(message)).block(block), chunks[0]);
    } else {
        let items: Vec<ListItem> = app.titles.iter().map(|t| title_item(t, app)).collect();
        let list = List::new(items)
            .block(block)
            .highlight_symbol(ICON_SELECTED)
            .highlight_style(
                Style::default()
                    .fg(app.theme.selection_colour)
                    .add_modifier(Modifier::BOLD),
            );
        let mut state = ListState::default().with_selected(Some(app.title_index));
        f.render_stateful_widget(list, chunks[0], &mut state);
    }

    draw_progress(f, chunks[1], app);

    if let Some(title) = app.confirm_title.and_then(|i| app.titles.get(i)) {
        draw_confirm(f, area, title, app);
    }
}

fn title_item<'a>(title: &'a TitleInfo, app: &App) -> ListItem<'a> {
    let label_colour = match title.label {
        TitleLabel::LikelyMainFeature => app.theme.success_colour,
        TitleLabel::PossibleMainFeature => app.theme.warning_colour,
        TitleLabel::LikelyExtra => app.theme.muted_colour,
    };

    ListItem::new(Line::from(vec![
        Span::styled(
            format!(" {:<28}", title.display_name()),
            Style::default().fg(app.theme.text_colour),
        ),
        Span::styled(
            format!("{:>9}", title.duration.as_deref().unwrap_or("?")),
            Style::default().fg(app.theme.muted_colour),
        ),
        Span::styled(
            format!("{:>10}  ", format_gb(title.size_gb)),
            Style::default().fg(app.theme.muted_colour),
        ),
        Span::styled(title.label.to_string(), Style::default().fg(label_colour)),
    ]))
}

fn draw_confirm(f: &mut Frame, area: Rect, title: &TitleInfo, app: &App) {
    let popup = centered(area, 54, 7);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent_colour))
        .style(Style::default().bg(app.theme.background_colour))
        .padding(Padding::uniform(1));

    let text = vec![
        Line::from(format!("Rip {}?", title.display_name())),
        Line::from(Span::styled(
            "y to start, n to go back",
            Style::default().fg(app.theme.muted_colour),
        )),
    ];

    f.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}
