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

//! Settings screens: the section menu, the drive picker and the per-section
//! editors.
//!
//! Key handling here never touches the application directly. It reports what
//! should happen as a [`SettingsAction`] and the caller saves, refreshes or
//! navigates accordingly.

mod fields;

pub(crate) use fields::{Field, FieldKind, Section};

use crossterm::event::{Event, KeyCode, KeyEvent};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{config::AppConfig, drives::DriveStatus};

/// First entry of the settings menu.
pub(crate) const DRIVE_PICKER_LABEL: &str = "Select Drive";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SettingsMode {
    Menu,
    DrivePicker,
    Editor(Section),
}

#[derive(Debug, PartialEq)]
pub(crate) enum SettingsAction {
    None,
    Back,
    RefreshDrives,
    Apply(Box<AppConfig>, String),
    Invalid(String),
}

pub(crate) struct SettingsView {
    pub(crate) mode: SettingsMode,
    pub(crate) menu_index: usize,
    pub(crate) field_index: usize,
    pub(crate) drive_index: usize,
    /// Text being typed for the selected field.
    pub(crate) editing: Option<Input>,
}

impl SettingsView {
    pub(crate) fn new() -> Self {
        Self {
            mode: SettingsMode::Menu,
            menu_index: 0,
            field_index: 0,
            drive_index: 0,
            editing: None,
        }
    }

    /// Menu entries: the drive picker, then one per section.
    pub(crate) fn menu_items() -> Vec<&'static str> {
        std::iter::once(DRIVE_PICKER_LABEL)
            .chain(Section::ALL.iter().map(|s| s.title()))
            .collect()
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub(crate) fn selected_field(&self) -> Option<&'static Field> {
        match self.mode {
            SettingsMode::Editor(section) => section.fields().get(self.field_index),
            _ => None,
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        key: KeyEvent,
        cfg: &AppConfig,
        drives: &[DriveStatus],
    ) -> SettingsAction {
        if self.editing.is_some() {
            return self.handle_input_key(key, cfg);
        }

        match self.mode {
            SettingsMode::Menu => self.handle_menu_key(key),
            SettingsMode::DrivePicker => self.handle_picker_key(key, cfg, drives),
            SettingsMode::Editor(section) => self.handle_editor_key(key, cfg, section),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> SettingsAction {
        let count = Self::menu_items().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => SettingsAction::Back,
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = (self.menu_index + 1) % count;
                SettingsAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = (self.menu_index + count - 1) % count;
                SettingsAction::None
            }
            KeyCode::Enter if self.menu_index == 0 => {
                self.mode = SettingsMode::DrivePicker;
                self.drive_index = 0;
                SettingsAction::RefreshDrives
            }
            KeyCode::Enter => {
                self.mode = SettingsMode::Editor(Section::ALL[self.menu_index - 1]);
                self.field_index = 0;
                SettingsAction::None
            }
            _ => SettingsAction::None,
        }
    }

    fn handle_picker_key(
        &mut self,
        key: KeyEvent,
        cfg: &AppConfig,
        drives: &[DriveStatus],
    ) -> SettingsAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.mode = SettingsMode::Menu;
                SettingsAction::None
            }
            KeyCode::Char('r') => SettingsAction::RefreshDrives,
            KeyCode::Down | KeyCode::Char('j') if !drives.is_empty() => {
                self.drive_index = (self.drive_index + 1) % drives.len();
                SettingsAction::None
            }
            KeyCode::Up | KeyCode::Char('k') if !drives.is_empty() => {
                self.drive_index = (self.drive_index + drives.len() - 1) % drives.len();
                SettingsAction::None
            }
            KeyCode::Enter => match drives.get(self.drive_index) {
                Some(drive) => {
                    let mut updated = cfg.clone();
                    updated.drives.cd_drive = drive.info.device.clone();
                    updated.drives.available =
                        drives.iter().map(|d| d.info.device.clone()).collect();
                    self.mode = SettingsMode::Menu;
                    SettingsAction::Apply(
                        Box::new(updated),
                        format!("Drive set to {}", drive.info.device),
                    )
                }
                None => SettingsAction::Invalid("No drive selected".into()),
            },
            _ => SettingsAction::None,
        }
    }

    fn handle_editor_key(
        &mut self,
        key: KeyEvent,
        cfg: &AppConfig,
        section: Section,
    ) -> SettingsAction {
        let fields = section.fields();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.mode = SettingsMode::Menu;
                SettingsAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.field_index = (self.field_index + 1) % fields.len();
                SettingsAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.field_index = (self.field_index + fields.len() - 1) % fields.len();
                SettingsAction::None
            }
            KeyCode::Enter => {
                let Some(field) = fields.get(self.field_index) else {
                    return SettingsAction::None;
                };
                match field.next_value(cfg) {
                    Some(next) => commit(field, cfg, &next),
                    None => {
                        self.editing = Some(Input::new(field.value(cfg)));
                        SettingsAction::None
                    }
                }
            }
            _ => SettingsAction::None,
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, cfg: &AppConfig) -> SettingsAction {
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                SettingsAction::None
            }
            KeyCode::Enter => {
                let Some(input) = self.editing.take() else {
                    return SettingsAction::None;
                };
                match self.selected_field() {
                    Some(field) => commit(field, cfg, input.value()),
                    None => SettingsAction::None,
                }
            }
            _ => {
                if let Some(input) = self.editing.as_mut() {
                    input.handle_event(&Event::Key(key));
                }
                SettingsAction::None
            }
        }
    }
}

fn commit(field: &Field, cfg: &AppConfig, value: &str) -> SettingsAction {
    match field.apply(cfg, value) {
        Ok(updated) => {
            let message = format!("{} set to {}", field.label, field.value(&updated));
            SettingsAction::Apply(Box::new(updated), message)
        }
        Err(e) => SettingsAction::Invalid(e.to_string()),
    }
}
