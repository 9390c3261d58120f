/*
 *  alert.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  New activity alert - blinking banner held for a fixed window
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

use embedded_graphics::{
    mono_font::{ascii::FONT_5X7, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::config::AlertSettings;
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::MatrixDriver;

/// Top-left of the banner text
const MESSAGE_ORIGIN: Point = Point::new(2, 2);

pub struct AlertPresenter {
    message: String,
    color: Rgb888,
    background: Rgb888,
    window: Duration,
    blink_on: Duration,
    blink_off: Duration,
}

impl AlertPresenter {
    pub fn new(settings: &AlertSettings, background: Rgb888) -> Self {
        Self {
            message: settings.message.clone(),
            color: settings.color,
            background,
            window: settings.window,
            blink_on: settings.blink_on,
            blink_off: settings.blink_off,
        }
    }

    /// Blink the banner until the window has elapsed.
    ///
    /// Owns the matrix for the whole window; the caller polls nothing
    /// meanwhile. Elapsed time is compared in whole seconds, so with the
    /// default 10s window and 1s/1s blink the banner shows six times.
    /// Returns the number of blinks.
    pub async fn present(&self, canvas: &mut FrameBuffer, driver: &mut dyn MatrixDriver) -> Result<u32, DisplayError> {
        log::info!("alert: '{}' for {}s", self.message, self.window.as_secs());

        let started = Instant::now();
        let mut blinks = 0u32;
        loop {
            self.draw_banner(canvas);
            driver.present(canvas)?;
            sleep(self.blink_on).await;

            canvas.clear_color(self.background);
            driver.present(canvas)?;
            sleep(self.blink_off).await;

            blinks += 1;
            if started.elapsed().as_secs() > self.window.as_secs() {
                break;
            }
            // a zero-length blink would never let time pass
            if self.blink_on.is_zero() && self.blink_off.is_zero() {
                log::warn!("alert blink period is zero, stopping after one blink");
                break;
            }
        }

        log::debug!("alert done after {} blinks", blinks);
        Ok(blinks)
    }

    fn draw_banner(&self, canvas: &mut FrameBuffer) {
        canvas.clear_color(self.background);
        let style = MonoTextStyle::new(&FONT_5X7, self.color);
        Text::with_baseline(&self.message, MESSAGE_ORIGIN, style, Baseline::Top)
            .draw(canvas)
            .ok();
    }
}
