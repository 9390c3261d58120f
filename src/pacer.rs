/*
 *  pacer.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Refresh schedule - startup cycle then whole-second aligned ticks
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
use std::time::Duration;
use tokio::time::Instant;

/// Why a refresh cycle is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    /// Whole seconds since the loop started
    Tick(u64),
}

pub struct RefreshSchedule {
    started: Instant,
    interval_secs: u64,
    last_tick: Option<u64>,
    startup_pending: bool,
}

// ticks land on exact multiples of the interval, counted in whole seconds
// from loop start; a second polled many times still fires once and a
// multiple that was never polled (long alert, slow fetch) is skipped
impl RefreshSchedule {
    pub fn new(interval: Duration, started: Instant) -> Self {
        Self {
            started,
            interval_secs: interval.as_secs().max(1),
            last_tick: None,
            startup_pending: true,
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Returns the trigger if a cycle is due at `now`; consumes it.
    #[inline]
    pub fn poll(&mut self, now: Instant) -> Option<Trigger> {
        if self.startup_pending {
            self.startup_pending = false;
            return Some(Trigger::Startup);
        }

        let elapsed = now.saturating_duration_since(self.started).as_secs();
        if elapsed != 0 && elapsed % self.interval_secs == 0 && self.last_tick != Some(elapsed) {
            self.last_tick = Some(elapsed);
            return Some(Trigger::Tick(elapsed));
        }
        None
    }

    /// Time until the next aligned tick, for sleeping instead of spinning
    pub fn until_next_tick(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.started);
        let next = (elapsed.as_secs() / self.interval_secs + 1) * self.interval_secs;
        Duration::from_secs(next).saturating_sub(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_startup_fires_first() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(30), start);
        assert_eq!(schedule.poll(start), Some(Trigger::Startup));
        assert_eq!(schedule.poll(start), None);
        assert_eq!(schedule.poll(at(start, 999)), None);
    }

    #[test]
    fn test_tick_fires_once_per_multiple() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(30), start);
        schedule.poll(start);

        assert_eq!(schedule.poll(at(start, 29_990)), None);
        assert_eq!(schedule.poll(at(start, 30_000)), Some(Trigger::Tick(30)));
        // same second, polled again
        assert_eq!(schedule.poll(at(start, 30_010)), None);
        assert_eq!(schedule.poll(at(start, 30_990)), None);
        assert_eq!(schedule.poll(at(start, 31_000)), None);
        assert_eq!(schedule.poll(at(start, 60_500)), Some(Trigger::Tick(60)));
    }

    #[test]
    fn test_missed_ticks_are_skipped() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(30), start);
        schedule.poll(start);

        // nothing polled during second 30
        assert_eq!(schedule.poll(at(start, 31_000)), None);
        assert_eq!(schedule.poll(at(start, 59_000)), None);
        assert_eq!(schedule.poll(at(start, 60_000)), Some(Trigger::Tick(60)));
    }

    #[test]
    fn test_until_next_tick() {
        let start = Instant::now();
        let schedule = RefreshSchedule::new(Duration::from_secs(30), start);
        assert_eq!(schedule.until_next_tick(at(start, 10_000)), Duration::from_secs(20));
        assert_eq!(schedule.until_next_tick(at(start, 30_000)), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let start = Instant::now();
        let schedule = RefreshSchedule::new(Duration::ZERO, start);
        assert_eq!(schedule.interval_secs(), 1);
    }
}
