/*
 *  tracker.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Activity tracker - raises "new activity" once per increase of today's count
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

use crate::calendar::PixelGrid;
use crate::error::MatrixError;

/// Today's count as seen by one refresh, before it is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub count: u32,
    pub increased: bool,
}

/// Remembers the most recent day's count between refresh cycles
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivityTracker {
    last_known_today_count: Option<u32>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the grid's latest day against the stored count and store the
    /// new one. True only when a previous count exists and the new one is
    /// strictly greater. On error the stored count is left alone.
    pub fn check_for_change(&mut self, grid: &PixelGrid) -> Result<bool, MatrixError> {
        let seen = self.peek(grid)?;
        self.record(seen);
        Ok(seen.increased)
    }

    /// The comparison half of [`check_for_change`](Self::check_for_change),
    /// without storing anything
    pub fn peek(&self, grid: &PixelGrid) -> Result<Observation, MatrixError> {
        let today = grid
            .latest_day()
            .ok_or_else(|| MatrixError::Data("grid has no latest day".to_string()))?;

        Ok(Observation {
            count: today.count,
            increased: matches!(self.last_known_today_count, Some(prev) if today.count > prev),
        })
    }

    pub fn record(&mut self, seen: Observation) {
        if seen.increased {
            log::info!(
                "new activity today: {} -> {}",
                self.last_known_today_count.unwrap_or_default(),
                seen.count
            );
        }
        self.last_known_today_count = Some(seen.count);
    }

    pub fn last_known(&self) -> Option<u32> {
        self.last_known_today_count
    }

    pub fn reset(&mut self) {
        self.last_known_today_count = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ActivityDay;

    fn grid_with_today(count: u32) -> PixelGrid {
        PixelGrid::from_columns(vec![
            vec![ActivityDay::new("2026-10-04", 9, "216e39")],
            vec![
                ActivityDay::new("2026-10-11", 0, "ebedf0"),
                ActivityDay::new("2026-10-12", count, "40c463"),
            ],
        ])
    }

    #[test]
    fn test_first_observation_is_not_new() {
        let mut tracker = ActivityTracker::new();
        assert!(!tracker.check_for_change(&grid_with_today(5)).unwrap());
        assert_eq!(tracker.last_known(), Some(5));
    }

    #[test]
    fn test_increase_fires_exactly_once() {
        let mut tracker = ActivityTracker::new();
        tracker.check_for_change(&grid_with_today(1)).unwrap();

        assert!(tracker.check_for_change(&grid_with_today(3)).unwrap());
        assert!(!tracker.check_for_change(&grid_with_today(3)).unwrap());
        assert_eq!(tracker.last_known(), Some(3));
    }

    #[test]
    fn test_decrease_is_stored_silently() {
        let mut tracker = ActivityTracker::new();
        tracker.check_for_change(&grid_with_today(4)).unwrap();

        // day rolled over
        assert!(!tracker.check_for_change(&grid_with_today(0)).unwrap());
        assert_eq!(tracker.last_known(), Some(0));
        assert!(tracker.check_for_change(&grid_with_today(1)).unwrap());
    }

    #[test]
    fn test_empty_grid_leaves_state_unchanged() {
        let mut tracker = ActivityTracker::new();
        tracker.check_for_change(&grid_with_today(2)).unwrap();

        let empty = PixelGrid::default();
        assert!(matches!(tracker.check_for_change(&empty), Err(MatrixError::Data(_))));

        let empty_last_week = PixelGrid::from_columns(vec![
            vec![ActivityDay::new("2026-10-04", 7, "216e39")],
            vec![],
        ]);
        assert!(tracker.check_for_change(&empty_last_week).is_err());
        assert_eq!(tracker.last_known(), Some(2));
    }

    #[test]
    fn test_peek_stores_nothing() {
        let mut tracker = ActivityTracker::new();
        tracker.check_for_change(&grid_with_today(1)).unwrap();

        let seen = tracker.peek(&grid_with_today(3)).unwrap();
        assert_eq!(seen, Observation { count: 3, increased: true });
        assert_eq!(tracker.last_known(), Some(1));
        // still new until recorded
        assert!(tracker.peek(&grid_with_today(3)).unwrap().increased);

        tracker.record(seen);
        assert_eq!(tracker.last_known(), Some(3));
        assert!(!tracker.peek(&grid_with_today(3)).unwrap().increased);
    }

    #[test]
    fn test_reset_forgets_count() {
        let mut tracker = ActivityTracker::new();
        tracker.check_for_change(&grid_with_today(2)).unwrap();
        tracker.reset();
        assert_eq!(tracker.last_known(), None);
        assert!(!tracker.check_for_change(&grid_with_today(8)).unwrap());
    }
}
