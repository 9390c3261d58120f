/*
 *  error.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Core error types for the calendar rendering pipeline
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use thiserror::Error;

use crate::display::error::DisplayError;
use crate::github::SourceError;

/// Failures of a single pipeline operation (normalize, track, paint).
///
/// Neither variant is fatal to the process; the refresh loop drops the
/// current cycle and keeps the previous frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Required input absent, empty or structurally incomplete
    #[error("data error: {0}")]
    Data(String),

    /// Malformed color encoding
    #[error("format error: {0}")]
    Format(String),
}

/// Everything that can abort one refresh cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("calendar fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("display error: {0}")]
    Display(#[from] DisplayError),
}
