/*
 *  display/traits.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Core trait definitions for matrix driver abstraction
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

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;

/// Matrix capabilities and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCapabilities {
    /// Matrix width in pixels (one column per calendar week)
    pub width: u32,

    /// Matrix height in pixels
    pub height: u32,

    /// Whether the matrix supports global brightness control
    pub supports_brightness: bool,

    /// Whether the board has a speaker with volume control
    pub supports_volume: bool,
}

impl MatrixCapabilities {
    /// Galactic Unicorn geometry, 53 x 11 with brightness and a speaker
    pub fn galactic(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            supports_brightness: true,
            supports_volume: true,
        }
    }
}

/// Minimal hardware abstraction - all matrix drivers must implement this trait
///
/// Drawing happens on a [`FrameBuffer`] owned by the caller; a driver only
/// has to push a finished frame to the panel.
pub trait MatrixDriver: Send {
    /// Returns the capabilities of this matrix
    fn capabilities(&self) -> &MatrixCapabilities;

    /// Returns the matrix dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the matrix hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a complete frame to the panel
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;

    /// Set global brightness (0.0 - 1.0)
    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError>;

    /// Set speaker volume (0.0 - 1.0)
    ///
    /// Returns an error if the board has no speaker.
    fn set_volume(&mut self, _level: f32) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }
}

/// Reject levels outside the unit range
pub(crate) fn check_level(level: f32) -> Result<f32, DisplayError> {
    if (0.0..=1.0).contains(&level) {
        Ok(level)
    } else {
        Err(DisplayError::InvalidLevel(level))
    }
}
