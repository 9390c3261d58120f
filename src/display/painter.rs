/*
 *  display/painter.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Calendar painters - flat color and gradient sweeps with luminance dimming
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::calendar::PixelGrid;
use crate::config::RenderSettings;
use crate::display::color::{brightness_factor, dim, hex_to_rgb, interpolate, is_sentinel};
use crate::display::framebuffer::FrameBuffer;
use crate::display::mode_controller::RenderMode;
use crate::error::MatrixError;

/// Rows left blank above the calendar
pub const ROW_INSET: i32 = 2;

/// A fully composed calendar frame, not yet on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    background: Rgb888,
    pixels: Vec<Pixel<Rgb888>>,
}

impl Frame {
    pub fn pixels(&self) -> &[Pixel<Rgb888>] {
        &self.pixels
    }

    /// Color composed for a canvas position, if a calendar day lands there
    pub fn color_at(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.pixels
            .iter()
            .find(|Pixel(p, _)| p.x == x && p.y == y)
            .map(|Pixel(_, c)| *c)
    }
}

/// Turns a pixel grid into matrix pixels for a render mode
#[derive(Debug, Clone)]
pub struct Painter {
    background: Rgb888,
    flat_color: Rgb888,
    total_gradient_steps: u32,
}

impl Painter {
    pub fn new(background: Rgb888, flat_color: Rgb888, total_gradient_steps: u32) -> Self {
        Self { background, flat_color, total_gradient_steps }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(settings.background, settings.flat_activity, settings.total_gradient_steps)
    }

    pub fn background(&self) -> Rgb888 {
        self.background
    }

    /// Compute every pixel for `grid` without touching any canvas.
    ///
    /// Fails on the first malformed cell color, leaving nothing half drawn.
    pub fn compose(&self, grid: &PixelGrid, mode: &RenderMode) -> Result<Frame, MatrixError> {
        let pixels = match mode {
            RenderMode::FlatColor => self.compose_flat(grid)?,
            RenderMode::Gradient(stops) => self.compose_gradient(grid, stops)?,
        };
        Ok(Frame { background: self.background, pixels })
    }

    /// Full redraw: clear to background, then every composed day.
    /// Positions without a day (ragged weeks) stay background.
    pub fn draw(&self, frame: &Frame, canvas: &mut FrameBuffer) {
        canvas.clear_color(frame.background);
        canvas.draw_iter(frame.pixels.iter().copied()).ok();
    }

    /// compose + draw
    pub fn paint(&self, grid: &PixelGrid, mode: &RenderMode, canvas: &mut FrameBuffer) -> Result<(), MatrixError> {
        let frame = self.compose(grid, mode)?;
        self.draw(&frame, canvas);
        Ok(())
    }

    fn compose_flat(&self, grid: &PixelGrid) -> Result<Vec<Pixel<Rgb888>>, MatrixError> {
        grid.cells()
            .map(|(column, row, day)| {
                let base = hex_to_rgb(&day.color_hex)?;
                Ok(Pixel(position(column, row), self.shade(base, self.flat_color)))
            })
            .collect()
    }

    fn compose_gradient(&self, grid: &PixelGrid, stops: &[Rgb888]) -> Result<Vec<Pixel<Rgb888>>, MatrixError> {
        if stops.len() < 2 {
            return Err(MatrixError::Data(format!(
                "gradient needs at least 2 stops, got {}",
                stops.len()
            )));
        }

        // fixed budget tied to a year of weekly columns, not the real grid size
        let transitions = (stops.len() - 1) as u32;
        let steps_per_transition = (self.total_gradient_steps / transitions).max(1);

        // the sweep counter starts at 1 and advances once per painted day
        grid.cells()
            .zip(1u32..)
            .map(|((column, row, day), step)| {
                let base = hex_to_rgb(&day.color_hex)?;
                let swept = gradient_color(stops, step, steps_per_transition);
                Ok(Pixel(position(column, row), self.shade(base, swept)))
            })
            .collect()
    }

    /// Dim `color` by the cell's own brightness, or mask the sentinel
    fn shade(&self, base: Rgb888, color: Rgb888) -> Rgb888 {
        if is_sentinel(base) {
            self.background
        } else {
            dim(color, brightness_factor(base))
        }
    }
}

/// Color of the sweep at `step`
pub fn gradient_color(stops: &[Rgb888], step: u32, steps_per_transition: u32) -> Rgb888 {
    let last = stops.len() - 1;
    let index = ((step / steps_per_transition) as usize).min(last);
    let next = (index + 1).min(last);
    let sub_factor = (step % steps_per_transition) as f64 / steps_per_transition as f64;
    interpolate(stops[index], stops[next], sub_factor)
}

#[inline]
fn position(column: usize, row: usize) -> Point {
    Point::new(column as i32, ROW_INSET + row as i32)
}
