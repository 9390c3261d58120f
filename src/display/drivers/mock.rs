/*
 *  display/drivers/mock.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Recording matrix driver - headless runs and tests
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
use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{check_level, MatrixCapabilities, MatrixDriver};

/// Mock matrix driver
///
/// Stands in for the panel when there is no hardware: headless runs, unit
/// and integration tests. Every operation is recorded in a shared state the
/// caller can keep a handle to after the driver has been boxed away.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: MatrixCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

/// Recorded driver activity (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of frames accepted by present()
    pub present_count: usize,

    /// Pixels of the most recently presented frame, row-major
    pub last_frame: Vec<Rgb888>,

    /// Last brightness value set
    pub last_brightness: Option<f32>,

    /// Last volume value set
    pub last_volume: Option<f32>,

    /// Simulate failures (for error testing)
    pub simulate_present_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_capabilities(MatrixCapabilities::galactic(width, height))
    }

    /// A mock of some other panel, e.g. one without a speaker
    pub fn with_capabilities(capabilities: MatrixCapabilities) -> Self {
        Self {
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Handle to the recorded state, still valid once the driver is boxed
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Pixel of the last presented frame
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.capabilities.width || y >= self.capabilities.height {
            return None;
        }
        let idx = (y * self.capabilities.width + x) as usize;
        self.lock().last_frame.get(idx).copied()
    }

    // a poisoned lock only means a test panicked mid-inspection
    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MatrixDriver for MockDriver {
    fn capabilities(&self) -> &MatrixCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }
        state.init_count += 1;
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let expected = (self.capabilities.width * self.capabilities.height) as usize;
        if frame.as_slice().len() != expected {
            return Err(DisplayError::BufferSizeMismatch {
                expected,
                actual: frame.as_slice().len(),
            });
        }

        let mut state = self.lock();
        if state.simulate_present_failure {
            return Err(DisplayError::Other("Simulated present failure".to_string()));
        }

        state.present_count += 1;
        state.last_frame.clear();
        state.last_frame.extend_from_slice(frame.as_slice());
        log::trace!("mock present #{}", state.present_count);
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        let level = check_level(level)?;
        self.lock().last_brightness = Some(level);
        Ok(())
    }

    fn set_volume(&mut self, level: f32) -> Result<(), DisplayError> {
        let level = check_level(level)?;
        self.lock().last_volume = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new(53, 11);
        assert_eq!(driver.dimensions(), (53, 11));
        assert!(driver.capabilities().supports_volume);
        assert_eq!(driver.get_pixel(0, 0), None);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new(53, 11);
        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);

        driver.init().unwrap();
        assert_eq!(state.lock().unwrap().init_count, 1);

        state.lock().unwrap().simulate_init_failure = true;
        assert!(matches!(driver.init(), Err(DisplayError::InitializationFailed(_))));
    }

    #[test]
    fn test_mock_driver_present_records_frame() {
        let mut driver = MockDriver::new(53, 11);
        let mut frame = FrameBuffer::new(53, 11, Rgb888::BLACK);
        frame.draw_iter([Pixel(Point::new(52, 10), Rgb888::GREEN)]).ok();

        driver.present(&frame).unwrap();

        assert_eq!(driver.state().lock().unwrap().present_count, 1);
        assert_eq!(driver.get_pixel(52, 10), Some(Rgb888::GREEN));
        assert_eq!(driver.get_pixel(0, 0), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_mock_driver_frame_size_mismatch() {
        let mut driver = MockDriver::new(53, 11);
        let frame = FrameBuffer::new(32, 32, Rgb888::BLACK);
        assert_eq!(
            driver.present(&frame),
            Err(DisplayError::BufferSizeMismatch { expected: 583, actual: 1024 })
        );
        assert_eq!(driver.state().lock().unwrap().present_count, 0);
    }

    #[test]
    fn test_mock_driver_levels() {
        let mut driver = MockDriver::new(53, 11);
        driver.set_brightness(0.25).unwrap();
        driver.set_volume(1.0).unwrap();
        assert!(driver.set_brightness(1.5).is_err());

        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.last_brightness, Some(0.25));
        assert_eq!(state.last_volume, Some(1.0));
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new(4, 4);
        let frame = FrameBuffer::new(4, 4, Rgb888::BLACK);

        driver.state().lock().unwrap().simulate_present_failure = true;
        assert!(driver.present(&frame).is_err());

        driver.state().lock().unwrap().simulate_present_failure = false;
        assert!(driver.present(&frame).is_ok());
    }
}
