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

//! Background task worker.
//!
//! Everything that blocks on a subprocess or the filesystem (drive
//! detection, disc identification, title scanning, starting rips) runs here,
//! off the UI thread. Results come back as [`AppEvent`]s.

mod handlers;
use handlers::*;

use std::{
    sync::{
        Arc,
        mpsc::{Receiver, Sender},
    },
    thread,
};

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    backend::{self, ExecutionBackend},
    config::AppConfig,
    disc::DiscDescriptor,
    events::AppEvent,
    video::TitleInfo,
};

#[derive(Debug)]
pub(crate) enum AppTask {
    UpdateConfig(Box<AppConfig>),

    DetectDrives,
    IdentifyDisc,
    ScanTitles,

    StartCdRip(DiscDescriptor),
    StartTitleRip(TitleInfo),
}

pub(crate) fn spawn_task_worker(
    config: &AppConfig,
    task_rx: Receiver<AppTask>,
    event_tx: Sender<AppEvent>,
) {
    let config = config.clone();

    thread::spawn(move || {
        let mut ctx = TaskContext {
            backend: backend::from_config(&config),
            config,
            event_tx,
        };

        while let Ok(task) = task_rx.recv() {
            debug!(?task, "running task");
            if let Err(e) = handle_task(task, &mut ctx) {
                warn!("task failed: {e:#}");
                let _ = ctx.event_tx.send(AppEvent::Error(e.to_string()));
            }
        }
    });
}

pub(crate) struct TaskContext {
    config: AppConfig,
    backend: Arc<dyn ExecutionBackend>,
    event_tx: Sender<AppEvent>,
}

fn handle_task(task: AppTask, ctx: &mut TaskContext) -> Result<()> {
    match task {
        AppTask::UpdateConfig(config) => update_config(ctx, *config),

        AppTask::DetectDrives => detect_drives(ctx),
        AppTask::IdentifyDisc => identify_disc(ctx),
        AppTask::ScanTitles => scan_titles(ctx),

        AppTask::StartCdRip(disc) => start_cd_rip(ctx, disc),
        AppTask::StartTitleRip(title) => start_title_rip(ctx, title),
    }
}
