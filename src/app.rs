/*
 *  app.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  The matrix controller - fetch, normalize, paint, track, alert, and the
 *  cooperative refresh/input loop that drives them
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

use log::{debug, error, info, warn};
use std::future::Future;
use tokio::time::{sleep, Instant};

use crate::alert::AlertPresenter;
use crate::calendar::{normalize, PixelGrid, RunningStats};
use crate::config::Settings;
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::mode_controller::{ModeController, RenderMode};
use crate::display::painter::{Frame, Painter};
use crate::display::traits::MatrixDriver;
use crate::error::CycleError;
use crate::github::CalendarSource;
use crate::input::{InputEvent, InputPoller, InputSource};
use crate::pacer::{RefreshSchedule, Trigger};
use crate::tracker::{ActivityTracker, Observation};

/// Outcome of one successful refresh cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub days: usize,
    pub stats: RunningStats,
    pub today: Option<u32>,
    pub new_activity: bool,
    pub alert_blinks: u32,
}

/// A fetched and composed cycle, not yet on the matrix
struct PendingCycle {
    grid: PixelGrid,
    stats: RunningStats,
    frame: Frame,
    today: Observation,
}

/// Owns every piece of mutable state: the canvas, the driver, the buttons,
/// the current grid and the activity history. One task drives it; nothing
/// here is shared or locked.
pub struct ContribMatrix<S: CalendarSource> {
    settings: Settings,
    source: S,
    driver: Box<dyn MatrixDriver>,
    input: Box<dyn InputSource>,
    canvas: FrameBuffer,
    painter: Painter,
    modes: ModeController,
    tracker: ActivityTracker,
    alert: AlertPresenter,
    poller: InputPoller,
    grid: Option<PixelGrid>,
    stats: RunningStats,
    brightness: f32,
    volume: f32,
}

impl<S: CalendarSource> ContribMatrix<S> {
    /// Initialise the driver and apply the configured levels
    pub fn new(
        settings: Settings,
        source: S,
        mut driver: Box<dyn MatrixDriver>,
        input: Box<dyn InputSource>,
    ) -> Result<Self, DisplayError> {
        driver.init()?;
        let (width, height) = driver.dimensions();
        let painter = Painter::from_settings(&settings.render);
        let canvas = FrameBuffer::new(width, height, painter.background());

        let caps = driver.capabilities().clone();
        let brightness = settings.controls.brightness;
        if caps.supports_brightness {
            driver.set_brightness(brightness)?;
        }
        let volume = settings.controls.volume;
        if caps.supports_volume {
            driver.set_volume(volume)?;
        }

        info!("matrix {}x{}, refresh every {}s", width, height, settings.refresh_interval.as_secs());

        Ok(Self {
            alert: AlertPresenter::new(&settings.alert, painter.background()),
            poller: InputPoller::new(settings.controls.refresh_gesture),
            settings,
            source,
            driver,
            input,
            canvas,
            painter,
            modes: ModeController::new(),
            tracker: ActivityTracker::new(),
            grid: None,
            stats: RunningStats::default(),
            brightness,
            volume,
        })
    }

    /// One full cycle: fetch, normalize, compose, track, present, alert.
    pub async fn refresh(&mut self) -> Result<CycleReport, CycleError> {
        let mode = self.modes.current_mode().clone();
        let baseline = self.tracker.clone();
        let pending = self.prepare(&mode, &baseline).await?;
        self.commit(pending, false).await
    }

    /// Everything that can fail before the matrix changes: fetch, normalize,
    /// compose in `mode`, and compare today's count against `baseline`.
    async fn prepare(&mut self, mode: &RenderMode, baseline: &ActivityTracker) -> Result<PendingCycle, CycleError> {
        let response = self.source.fetch().await?;
        let (grid, stats) = normalize(response.calendar())?;
        let frame = self.painter.compose(&grid, mode)?;
        let today = baseline.peek(&grid)?;
        Ok(PendingCycle { grid, stats, frame, today })
    }

    /// Show a prepared cycle and, once the matrix accepted it, adopt its
    /// state. A rejected frame leaves canvas, grid and tracker as they were.
    async fn commit(&mut self, pending: PendingCycle, reset_first: bool) -> Result<CycleReport, CycleError> {
        let PendingCycle { grid, stats, frame, today } = pending;

        let mut next = self.canvas.clone();
        self.painter.draw(&frame, &mut next);
        self.driver.present(&next)?;
        self.canvas = next;

        if reset_first {
            self.reset();
        }
        self.tracker.record(today);
        let report = CycleReport {
            days: grid.day_count(),
            stats,
            today: Some(today.count),
            new_activity: today.increased,
            alert_blinks: 0,
        };
        self.grid = Some(grid);
        self.stats = stats;

        if !today.increased {
            return Ok(report);
        }

        let alert_blinks = self.alert.present(&mut self.canvas, self.driver.as_mut()).await?;
        // the banner ends on a blank frame, put the calendar back
        self.painter.draw(&frame, &mut self.canvas);
        self.driver.present(&self.canvas)?;
        Ok(CycleReport { alert_blinks, ..report })
    }

    /// Fetch and show a fresh calendar in flat color, then drop the old
    /// state. Nothing is reset when the fetch or the present fails.
    pub async fn manual_refresh(&mut self) -> Result<CycleReport, CycleError> {
        let baseline = if self.settings.keep_activity_on_reset {
            self.tracker.clone()
        } else {
            ActivityTracker::new()
        };
        let pending = self.prepare(&RenderMode::FlatColor, &baseline).await?;
        self.commit(pending, true).await
    }

    /// Switch render mode; an unchanged mode draws nothing.
    /// Returns true when the mode changed.
    pub fn set_mode(&mut self, mode: RenderMode) -> Result<bool, CycleError> {
        if !self.modes.set_mode(mode) {
            return Ok(false);
        }
        self.redraw()?;
        Ok(true)
    }

    /// Full redraw of the current grid in the current mode
    fn redraw(&mut self) -> Result<(), CycleError> {
        let Some(grid) = self.grid.as_ref() else {
            debug!("no grid loaded yet, nothing to redraw");
            return Ok(());
        };
        self.painter.paint(grid, self.modes.current_mode(), &mut self.canvas)?;
        self.driver.present(&self.canvas)?;
        Ok(())
    }

    /// Drop the loaded grid and stats and go back to flat color.
    /// Activity history goes too unless configured to survive a reset.
    pub fn reset(&mut self) {
        info!("resetting matrix state");
        self.grid = None;
        self.stats = RunningStats::default();
        self.modes.reset();
        if !self.settings.keep_activity_on_reset {
            self.tracker.reset();
        }
    }

    pub async fn handle_event(&mut self, event: InputEvent) -> Result<(), CycleError> {
        match event {
            InputEvent::SelectFlatColor => {
                self.set_mode(RenderMode::FlatColor)?;
            }
            InputEvent::SelectGradientB => {
                let stops = self.settings.render.gradient_b.clone();
                self.set_mode(RenderMode::gradient(stops)?)?;
            }
            InputEvent::SelectGradientC => {
                let stops = self.settings.render.gradient_c.clone();
                self.set_mode(RenderMode::gradient(stops)?)?;
            }
            InputEvent::ManualRefresh => {
                info!("manual refresh requested");
                let report = self.manual_refresh().await?;
                self.log_cycle("manual", &report);
            }
            InputEvent::BrightnessUp => self.adjust_brightness(self.settings.controls.brightness_step)?,
            InputEvent::BrightnessDown => self.adjust_brightness(-self.settings.controls.brightness_step)?,
            InputEvent::VolumeUp => self.adjust_volume(self.settings.controls.volume_step)?,
            InputEvent::VolumeDown => self.adjust_volume(-self.settings.controls.volume_step)?,
        }
        Ok(())
    }

    fn adjust_brightness(&mut self, delta: f32) -> Result<(), DisplayError> {
        if !self.driver.capabilities().supports_brightness {
            debug!("matrix has fixed brightness, ignored");
            return Ok(());
        }
        let level = (self.brightness + delta).clamp(0.0, 1.0);
        self.driver.set_brightness(level)?;
        self.brightness = level;
        debug!("brightness {:.2}", level);
        Ok(())
    }

    fn adjust_volume(&mut self, delta: f32) -> Result<(), DisplayError> {
        if !self.driver.capabilities().supports_volume {
            debug!("matrix has no speaker, volume ignored");
            return Ok(());
        }
        let level = (self.volume + delta).clamp(0.0, 1.0);
        self.driver.set_volume(level)?;
        self.volume = level;
        debug!("volume {:.1}", level);
        Ok(())
    }

    /// One loop iteration: a due cycle first, then every pending button.
    /// Errors are logged and swallowed so the loop keeps running.
    pub async fn step(&mut self, schedule: &mut RefreshSchedule) {
        if let Some(trigger) = schedule.poll(Instant::now()) {
            let label = match trigger {
                Trigger::Startup => "startup".to_string(),
                Trigger::Tick(secs) => format!("tick {}s", secs),
            };
            match self.refresh().await {
                Ok(report) => self.log_cycle(&label, &report),
                Err(e) => error!("{} refresh failed, keeping previous frame: {}", label, e),
            }
        }

        let events = self.poller.poll(self.input.as_mut(), Instant::now());
        for event in events {
            if let Err(e) = self.handle_event(event).await {
                warn!("{:?} failed: {}", event, e);
            }
        }
    }

    /// Drive the loop until `shutdown` resolves
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) {
        let poll_interval = self.settings.poll_interval;
        let mut schedule = RefreshSchedule::new(self.settings.refresh_interval, Instant::now());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("refresh loop stopped");
                    break;
                }
                _ = async {
                    self.step(&mut schedule).await;
                    // wake on the tick boundary rather than up to a poll late
                    let idle = poll_interval.min(schedule.until_next_tick(Instant::now()));
                    sleep(idle).await;
                } => {}
            }
        }
    }

    fn log_cycle(&self, label: &str, report: &CycleReport) {
        info!(
            "{} refresh: {} days, today {:?}{}",
            label,
            report.days,
            report.today,
            if report.new_activity { ", new activity" } else { "" }
        );
        if report.stats.has_observations() {
            debug!("counts min {} max {}", report.stats.min_count, report.stats.max_count);
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn grid(&self) -> Option<&PixelGrid> {
        self.grid.as_ref()
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    pub fn mode(&self) -> &RenderMode {
        self.modes.current_mode()
    }

    pub fn tracker(&self) -> &ActivityTracker {
        &self.tracker
    }

    pub fn canvas(&self) -> &FrameBuffer {
        &self.canvas
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}
