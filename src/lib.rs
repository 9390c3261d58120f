/*
 *  lib.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Contribution calendar monitor for small RGB LED matrices
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

pub mod alert;
pub mod app;
pub mod calendar;
pub mod config;
pub mod display;
pub mod error;
pub mod github;
pub mod input;
pub mod pacer;
pub mod tracker;

pub use app::{ContribMatrix, CycleReport};
pub use calendar::{normalize, ActivityDay, PixelGrid, RunningStats};
pub use error::{CycleError, MatrixError};
pub use github::{CalendarSource, GithubClient, SourceError};
pub use tracker::ActivityTracker;
