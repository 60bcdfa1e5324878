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

//! Settings screens: section menu, drive picker and section editors.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};

use crate::{
    App,
    render::icons::{ICON_MEDIA, ICON_NO_MEDIA, ICON_SELECTED},
    settings::{FieldKind, Section, SettingsMode, SettingsView},
    util::format::spinner_frame,
};

pub(crate) fn draw_settings(f: &mut Frame, area: Rect, app: &App) {
    match app.settings.mode {
        SettingsMode::Menu => draw_menu(f, area, app),
        SettingsMode::DrivePicker => draw_drive_picker(f, area, app),
        SettingsMode::Editor(section) => draw_editor(f, area, app, section),
    }
}

fn panel<'a>(title: &'a str, app: &App) -> Block<'a> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1))
}

fn selectable<'a>(items: Vec<ListItem<'a>>, block: Block<'a>, app: &App) -> List<'a> {
    List::new(items)
        .block(block)
        .highlight_symbol(ICON_SELECTED)
        .highlight_style(
            Style::default()
                .fg(app.theme.selection_colour)
                .add_modifier(Modifier::BOLD),
        )
}

fn draw_menu(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = SettingsView::menu_items()
        .into_iter()
        .map(|label| ListItem::new(format!(" {label}")))
        .collect();

    let mut state = ListState::default().with_selected(Some(app.settings.menu_index));
    f.render_stateful_widget(
        selectable(items, panel("Settings", app), app),
        area,
        &mut state,
    );
}

fn draw_drive_picker(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Select Drive", app);

    if app.drives.is_empty() {
        let message = if app.busy {
            format!("{} Detecting drives...", spinner_frame(app.tick))
        } else {
            "No optical drives found. Press r to look again.".to_string()
        };
        f.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(app.theme.muted_colour))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .drives
        .iter()
        .map(|drive| {
            let (icon, media, colour) = if drive.has_media {
                (ICON_MEDIA, "disc present", app.theme.success_colour)
            } else {
                (ICON_NO_MEDIA, "empty", app.theme.muted_colour)
            };
            let current = if drive.info.device == app.config.drives.cd_drive {
                " (current)"
            } else {
                ""
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<12}", drive.info.device),
                    Style::default().fg(app.theme.text_colour),
                ),
                Span::styled(
                    format!("{:<32}", drive.info.model),
                    Style::default().fg(app.theme.muted_colour),
                ),
                Span::styled(
                    format!("{:<8}", drive.info.media_type),
                    Style::default().fg(app.theme.muted_colour),
                ),
                Span::styled(
                    if drive.info.read_only { "reader  " } else { "writer  " },
                    Style::default().fg(app.theme.muted_colour),
                ),
                Span::styled(format!("{icon} {media}"), Style::default().fg(colour)),
                Span::styled(current, Style::default().fg(app.theme.accent_colour)),
            ]))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.settings.drive_index));
    f.render_stateful_widget(selectable(items, block, app), area, &mut state);
}

fn draw_editor(f: &mut Frame, area: Rect, app: &App, section: Section) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = section
        .fields()
        .iter()
        .map(|field| {
            let value = field.value(&app.config);
            let value = match field.kind {
                FieldKind::Text if value.is_empty() => "(not set)".to_string(),
                FieldKind::Toggle | FieldKind::Choice => format!("\u{25C2} {value} \u{25B8}"),
                _ => value,
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<24}", field.label),
                    Style::default().fg(app.theme.text_colour),
                ),
                Span::styled(value, Style::default().fg(app.theme.accent_colour)),
            ]))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.settings.field_index));
    f.render_stateful_widget(
        selectable(items, panel(section.title(), app), app),
        chunks[0],
        &mut state,
    );

    let hint_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_colour));

    match (&app.settings.editing, app.settings.selected_field()) {
        (Some(input), Some(field)) => {
            let block = hint_block.title(format!(" {} ", field.key));
            let inner = block.inner(chunks[1]);
            f.render_widget(
                Paragraph::new(input.value())
                    .style(Style::default().fg(app.theme.text_colour))
                    .block(block),
                chunks[1],
            );
            f.set_cursor_position(Position::new(
                inner.x + input.cursor() as u16,
                inner.y,
            ));
        }
        (_, Some(field)) => {
            let hint = match field.kind {
                FieldKind::Toggle | FieldKind::Choice => "Enter to change",
                FieldKind::Text | FieldKind::Number => "Enter to edit",
            };
            f.render_widget(
                Paragraph::new(format!(" {}: {hint}", field.key))
                    .style(Style::default().fg(app.theme.muted_colour))
                    .block(hint_block),
                chunks[1],
            );
        }
        (_, None) => f.render_widget(hint_block, chunks[1]),
    }
}
