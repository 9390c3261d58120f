/*
 *  calendar.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Contribution calendar model and the weeks -> pixel grid normalizer
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

use serde::Deserialize;

use crate::error::MatrixError;

// GraphQL wire format:
// data.user.contributionsCollection.contributionCalendar.weeks[].contributionDays[]

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    pub user: Option<UserData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

/// The raw activity record: weeks oldest -> newest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContributionCalendar {
    pub weeks: Vec<RawWeek>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWeek {
    pub contribution_days: Vec<RawDay>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDay {
    pub color: String,
    pub contribution_count: u32,
    pub date: String,
}

impl GraphQlResponse {
    /// The calendar, if the response carried one.
    /// `None` when `data` or `user` is null (unknown login, bad token).
    pub fn calendar(&self) -> Option<&ContributionCalendar> {
        self.data
            .as_ref()
            .and_then(|d| d.user.as_ref())
            .map(|u| &u.contributions_collection.contribution_calendar)
    }
}

/// One calendar cell, ready to paint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDay {
    pub date: String,
    pub count: u32,
    pub color_hex: String,
}

impl ActivityDay {
    pub fn new(date: impl Into<String>, count: u32, color_hex: impl Into<String>) -> Self {
        Self { date: date.into(), count, color_hex: color_hex.into() }
    }
}

/// Columns of days, one column per week, both oldest -> newest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelGrid {
    columns: Vec<Vec<ActivityDay>>,
}

impl PixelGrid {
    pub fn from_columns(columns: Vec<Vec<ActivityDay>>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Vec<ActivityDay>] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of cells across all weeks
    pub fn day_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Most recent cell: last day of the last week
    pub fn latest_day(&self) -> Option<&ActivityDay> {
        self.columns.last().and_then(|week| week.last())
    }

    /// Every cell with its (column, row-within-week) position, in paint order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &ActivityDay)> {
        self.columns.iter().enumerate().flat_map(|(column, week)| {
            week.iter().enumerate().map(move |(row, day)| (column, row, day))
        })
    }
}

/// Min/max counts seen during one normalization pass
///
/// Recomputed on every refresh, so these are the extremes of the latest
/// calendar only, not all-time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningStats {
    pub max_count: u32,
    pub min_count: u32,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self { max_count: 0, min_count: u32::MAX }
    }
}

impl RunningStats {
    pub fn observe(&mut self, count: u32) {
        self.max_count = self.max_count.max(count);
        self.min_count = self.min_count.min(count);
    }

    /// False until at least one day was observed (min still at +inf)
    pub fn has_observations(&self) -> bool {
        self.min_count != u32::MAX || self.max_count != 0
    }
}

/// Convert the raw calendar into a pixel grid, keeping week and day order.
///
/// `None` means no successful fetch has produced a calendar yet.
pub fn normalize(calendar: Option<&ContributionCalendar>) -> Result<(PixelGrid, RunningStats), MatrixError> {
    let calendar = calendar
        .ok_or_else(|| MatrixError::Data("calendar is not loaded".to_string()))?;

    let mut stats = RunningStats::default();
    let columns: Vec<Vec<ActivityDay>> = calendar
        .weeks
        .iter()
        .map(|week| {
            week.contribution_days
                .iter()
                .map(|day| {
                    stats.observe(day.contribution_count);
                    ActivityDay::new(day.date.clone(), day.contribution_count, day.color.clone())
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Ok((PixelGrid::from_columns(columns), stats))
}
