/*
 *  display/emulator_window.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Emulator window management
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

use pixels::{Pixels, SurfaceTexture};
use winit::{
    dpi::PhysicalSize,
    event::{Event, VirtualKeyCode},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};
use winit_input_helper::WinitInputHelper;

use crate::display::drivers::emulator::EmulatorState;
use crate::input::{Button, LatchedInput};
use std::sync::{Arc, Mutex};

/// Emulator window configuration
#[derive(Debug, Clone)]
pub struct EmulatorWindowConfig {
    /// Pixel scale factor (matrix pixel -> screen pixels)
    pub scale: u32,

    /// Background color [R, G, B, A]
    pub bg_color: [u8; 4],
}

impl Default for EmulatorWindowConfig {
    fn default() -> Self {
        Self {
            scale: 16,
            bg_color: [20, 20, 20, 255],
        }
    }
}

// keyboard -> board switch
const KEY_MAP: [(VirtualKeyCode, Button); 10] = [
    (VirtualKeyCode::A, Button::A),
    (VirtualKeyCode::B, Button::B),
    (VirtualKeyCode::C, Button::C),
    (VirtualKeyCode::D, Button::D),
    (VirtualKeyCode::Up, Button::BrightnessUp),
    (VirtualKeyCode::Down, Button::BrightnessDown),
    (VirtualKeyCode::Equals, Button::VolumeUp),
    (VirtualKeyCode::NumpadAdd, Button::VolumeUp),
    (VirtualKeyCode::Minus, Button::VolumeDown),
    (VirtualKeyCode::NumpadSubtract, Button::VolumeDown),
];

/// Emulator window manager
pub struct EmulatorWindow {
    state: Arc<Mutex<EmulatorState>>,
    buttons: LatchedInput,
    config: EmulatorWindowConfig,
}

impl EmulatorWindow {
    /// Create a new emulator window; key presses are latched into `buttons`
    pub fn new(state: Arc<Mutex<EmulatorState>>, buttons: LatchedInput, config: EmulatorWindowConfig) -> Self {
        Self { state, buttons, config }
    }

    /// Run the emulator window event loop (never returns on success)
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let (width, height) = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            (state.width, state.height)
        };

        let event_loop = EventLoop::new();
        let mut input = WinitInputHelper::new();

        // Use PhysicalSize to avoid Wayland DPI scaling issues
        let window = WindowBuilder::new()
            .with_title("ContribMon Emulator")
            .with_inner_size(PhysicalSize::new(width * self.config.scale, height * self.config.scale))
            .with_resizable(false)
            .build(&event_loop)?;

        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        let mut pixels = Pixels::new(width, height, surface_texture)?;

        println!("═══════════════════════════════════════════════════");
        println!("  ContribMon Matrix Emulator ({}x{})", width, height);
        println!("═══════════════════════════════════════════════════");
        println!("    A / B / C  - Flat color / gradient B / gradient C");
        println!("    D then C   - Manual refresh");
        println!("    Up / Down  - Brightness");
        println!("    + / -      - Volume");
        println!("    ESC / Q    - Quit");
        println!("═══════════════════════════════════════════════════");

        let mut last_frame = 0u64;
        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::Poll;

            if let Event::RedrawRequested(_) = event {
                self.render(pixels.frame_mut());

                if let Err(err) = pixels.render() {
                    log::error!("pixels.render() failed: {}", err);
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if state.frame_count != last_frame {
                    last_frame = state.frame_count;
                    window.set_title(&format!(
                        "ContribMon Emulator - brightness {:.2} volume {:.1}",
                        state.brightness, state.volume
                    ));
                }
            }

            if input.update(&event) {
                if input.key_pressed(VirtualKeyCode::Escape)
                    || input.key_pressed(VirtualKeyCode::Q)
                    || input.close_requested()
                {
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                for (key, button) in KEY_MAP {
                    if input.key_pressed(key) {
                        self.buttons.latch(button);
                    }
                }
            }

            window.request_redraw();
        });
    }

    fn render(&self, frame: &mut [u8]) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for (i, pixel) in frame.chunks_exact_mut(4).enumerate() {
            let rgba = state.rgba(i).unwrap_or(self.config.bg_color);
            pixel.copy_from_slice(&rgba);
        }
    }
}
