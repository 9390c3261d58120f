/*
 *  display/drivers/emulator.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Matrix emulator driver for desktop testing
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{check_level, MatrixCapabilities, MatrixDriver};

/// Shared emulator state (for window access)
#[derive(Debug)]
pub struct EmulatorState {
    /// Last presented frame, row-major
    pub buffer: Vec<Rgb888>,

    /// Matrix dimensions
    pub width: u32,
    pub height: u32,

    /// Global brightness (0.0 - 1.0), applied by the window
    pub brightness: f32,

    /// Speaker volume (0.0 - 1.0), shown in the title only
    pub volume: f32,

    /// Frame counter
    pub frame_count: u64,
}

impl EmulatorState {
    /// RGBA for one matrix pixel after brightness
    pub fn rgba(&self, index: usize) -> Option<[u8; 4]> {
        self.buffer.get(index).map(|c| {
            let scale = |v: u8| (v as f32 * self.brightness) as u8;
            [scale(c.r()), scale(c.g()), scale(c.b()), 255]
        })
    }
}

/// Emulator matrix driver
///
/// Presents frames into a shared state that [`EmulatorWindow`] renders in a
/// desktop window, so the whole loop runs without a Galactic Unicorn.
///
/// [`EmulatorWindow`]: crate::display::emulator_window::EmulatorWindow
pub struct EmulatorDriver {
    capabilities: MatrixCapabilities,
    state: Arc<Mutex<EmulatorState>>,
}

impl EmulatorDriver {
    pub fn new(width: u32, height: u32) -> Self {
        let state = Arc::new(Mutex::new(EmulatorState {
            buffer: vec![Rgb888::BLACK; (width * height) as usize],
            width,
            height,
            brightness: 1.0,
            volume: 0.0,
            frame_count: 0,
        }));

        Self {
            capabilities: MatrixCapabilities::galactic(width, height),
            state,
        }
    }

    /// Get shared state for window rendering
    pub fn state(&self) -> Arc<Mutex<EmulatorState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, EmulatorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MatrixDriver for EmulatorDriver {
    fn capabilities(&self) -> &MatrixCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // Nothing to initialize for emulator
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let mut state = self.lock();
        if frame.as_slice().len() != state.buffer.len() {
            return Err(DisplayError::BufferSizeMismatch {
                expected: state.buffer.len(),
                actual: frame.as_slice().len(),
            });
        }
        state.buffer.copy_from_slice(frame.as_slice());
        state.frame_count += 1;
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        self.lock().brightness = check_level(level)?;
        Ok(())
    }

    fn set_volume(&mut self, level: f32) -> Result<(), DisplayError> {
        self.lock().volume = check_level(level)?;
        Ok(())
    }
}
