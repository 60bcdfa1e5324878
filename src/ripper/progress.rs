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

//! The channel carrying rip progress from a session to its consumer.
//!
//! The channel is bounded and sends block, so a slow consumer stalls the
//! output readers rather than losing events. Once a terminal event has been
//! sent the sink closes and later events are dropped.

use std::sync::{
    Arc, Mutex,
    mpsc::{self, Receiver, SyncSender},
};

use tracing::debug;

use crate::error::RipError;

const CHANNEL_CAPACITY: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProgressEvent {
    pub(crate) current_track: usize,
    pub(crate) total_tracks: usize,
    pub(crate) track_name: Option<String>,
    /// Overall percentage, 0 to 100.
    pub(crate) progress: u8,
    pub(crate) status: String,
    pub(crate) error: Option<RipError>,
}

impl ProgressEvent {
    pub(crate) fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Completion or any error ends the stream.
    pub(crate) fn is_terminal(&self) -> bool {
        self.progress >= 100 || self.error.is_some()
    }
}

#[derive(Debug)]
struct SinkState {
    tx: Option<SyncSender<ProgressEvent>>,
    last_progress: u8,
    current_track: usize,
    total_tracks: usize,
}

impl SinkState {
    fn send(&mut self, event: ProgressEvent) {
        let terminal = event.is_terminal();
        self.current_track = event.current_track;
        self.total_tracks = event.total_tracks;

        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            debug!("progress consumer has gone away");
            self.tx = None;
        }

        if terminal {
            self.tx = None;
        }
    }
}

/// Producer half of the progress channel, shared by a session's threads.
#[derive(Debug, Clone)]
pub(crate) struct ProgressSink {
    state: Arc<Mutex<SinkState>>,
}

pub(crate) fn progress_channel() -> (ProgressSink, Receiver<ProgressEvent>) {
    let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);
    let sink = ProgressSink {
        state: Arc::new(Mutex::new(SinkState {
            tx: Some(tx),
            last_progress: 0,
            current_track: 0,
            total_tracks: 0,
        })),
    };
    (sink, rx)
}

impl ProgressSink {
    /// Sends an in-flight update. The percentage never goes backwards and
    /// stays below 100, which only [`complete`](Self::complete) reports.
    pub(crate) fn emit(&self, mut event: ProgressEvent) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.tx.is_none() {
            return;
        }

        event.progress = event.progress.min(99).max(state.last_progress);
        state.last_progress = event.progress;
        state.send(event);
    }

    /// Ends the stream with `error`, keeping the last position reached.
    pub(crate) fn fail(&self, error: RipError, status: impl Into<String>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.tx.is_none() {
            return;
        }

        let event = ProgressEvent {
            current_track: state.current_track,
            total_tracks: state.total_tracks,
            track_name: None,
            progress: state.last_progress,
            status: status.into(),
            error: Some(error),
        };
        state.send(event);
    }

    /// Ends the stream at 100%.
    pub(crate) fn complete(&self, status: impl Into<String>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.tx.is_none() {
            return;
        }

        let event = ProgressEvent {
            current_track: state.total_tracks,
            total_tracks: state.total_tracks,
            track_name: None,
            progress: 100,
            status: status.into(),
            error: None,
        };
        state.last_progress = 100;
        state.send(event);
    }

    #[cfg(test)]
    pub(crate) fn last_progress(&self) -> u8 {
        self.state.lock().map(|s| s.last_progress).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(progress: u8) -> ProgressEvent {
        ProgressEvent {
            current_track: 1,
            total_tracks: 4,
            progress,
            ..ProgressEvent::default()
        }
    }

    #[test]
    fn percentages_never_go_backwards() {
        let (sink, rx) = progress_channel();

        sink.emit(at(40));
        sink.emit(at(25));
        sink.emit(at(60));
        drop(sink);

        let seen: Vec<u8> = rx.iter().map(|e| e.progress).collect();
        assert_eq!(seen, vec![40, 40, 60]);
    }

    #[test]
    fn only_completion_reaches_one_hundred() {
        let (sink, rx) = progress_channel();

        sink.emit(at(100));
        sink.complete("done");

        let events: Vec<ProgressEvent> = rx.iter().collect();
        assert_eq!(events[0].progress, 99);
        assert!(!events[0].is_terminal());
        assert_eq!(events[1].progress, 100);
        assert_eq!(events[1].current_track, 4);
        assert!(events[1].is_terminal());
    }

    #[test]
    fn stream_closes_after_a_terminal_event() {
        let (sink, rx) = progress_channel();

        sink.emit(at(30));
        sink.fail(RipError::Cancelled, "Ripping cancelled");
        sink.emit(at(80));
        sink.complete("too late");

        let events: Vec<ProgressEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].error, Some(RipError::Cancelled));
        assert_eq!(events[1].progress, 30);
        assert_eq!(sink.last_progress(), 30);
    }

    #[test]
    fn dropped_consumer_does_not_block() {
        let (sink, rx) = progress_channel();
        drop(rx);

        for p in 0..(CHANNEL_CAPACITY as u8 * 3) {
            sink.emit(at(p));
        }
        sink.complete("done");
    }
}
