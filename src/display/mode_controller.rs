/*
 *  display/mode_controller.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Render mode controller - flat color or multi-stop gradient, switched
 *  explicitly by the buttons
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

use crate::error::MatrixError;

/// How calendar cells are colored
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Every active cell uses the flat activity color, dimmed per cell
    #[default]
    FlatColor,

    /// Colors sweep across the whole grid through the ordered stops
    Gradient(Vec<Rgb888>),
}

impl RenderMode {
    /// Build a gradient mode; at least two stops are required
    pub fn gradient(stops: Vec<Rgb888>) -> Result<Self, MatrixError> {
        if stops.len() < 2 {
            return Err(MatrixError::Data(format!(
                "gradient needs at least 2 stops, got {}",
                stops.len()
            )));
        }
        Ok(RenderMode::Gradient(stops))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::FlatColor => "flat",
            RenderMode::Gradient(_) => "gradient",
        }
    }
}

/// Holds the active render mode
pub struct ModeController {
    current_mode: RenderMode,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    /// Create a new controller in flat color mode
    pub fn new() -> Self {
        Self {
            current_mode: RenderMode::FlatColor,
        }
    }

    /// Get current render mode
    pub fn current_mode(&self) -> &RenderMode {
        &self.current_mode
    }

    /// Switch mode. Returns true if the mode changed and the grid needs a
    /// full redraw; an identical mode (same tag, same stops) is a no-op.
    pub fn set_mode(&mut self, mode: RenderMode) -> bool {
        if mode == self.current_mode {
            log::debug!("Render mode unchanged: {:?}", mode);
            return false;
        }

        log::info!("Render mode changed: {} -> {}", self.current_mode.name(), mode.name());
        self.current_mode = mode;
        true
    }

    /// Back to the initial flat color mode
    pub fn reset(&mut self) {
        self.current_mode = RenderMode::FlatColor;
    }
}
