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

//! Error taxonomy for disc detection and ripping.
//!
//! Every variant carries plain strings so an error can be cloned into a
//! [`ProgressEvent`](crate::ripper::ProgressEvent) and compared in tests.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RipError {
    /// A required external binary could not be located.
    #[error("{tool} not found in PATH and not configured")]
    ToolUnavailable { tool: String },

    /// The identification tool failed, or reported no media or no access.
    #[error("{0}")]
    DetectionFailed(String),

    /// Tool output did not have the expected shape.
    #[error("invalid {tool} output: {reason}")]
    ParseError { tool: String, reason: String },

    #[error("failed to create output directory {}: {reason}", path.display())]
    OutputDirectoryError { path: PathBuf, reason: String },

    /// A ripping subprocess exited non-zero or reported an error line.
    #[error("{tool} failed: {detail}")]
    SubprocessError { tool: String, detail: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl RipError {
    pub(crate) fn tool_unavailable(tool: impl Into<String>) -> Self {
        Self::ToolUnavailable { tool: tool.into() }
    }

    pub(crate) fn parse(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn subprocess(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SubprocessError {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}
