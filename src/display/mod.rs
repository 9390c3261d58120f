/*
 *  display/mod.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Display subsystem - color math, painters, render modes and drivers
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod color;

// Pixel painters and the render mode state machine
pub mod painter;
pub mod mode_controller;

// Display drivers
pub mod drivers;

// Emulator window (only with emulator feature)
#[cfg(feature = "emulator")]
pub mod emulator_window;

// Re-exports for convenience
pub use traits::{MatrixDriver, MatrixCapabilities};
pub use error::DisplayError;
pub use framebuffer::{FrameBuffer, VarFrameBuf};
pub use painter::{Frame, Painter, ROW_INSET};
pub use mode_controller::{ModeController, RenderMode};
pub use drivers::mock::MockDriver;
