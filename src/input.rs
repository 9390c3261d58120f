/*
 *  input.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Matrix buttons - sources, latching and the event poller
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

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Physical buttons on the matrix board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    C,
    D,
    BrightnessUp,
    BrightnessDown,
    VolumeUp,
    VolumeDown,
}

impl Button {
    /// Poll order, matching the board's switch order
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::C,
        Button::D,
        Button::BrightnessUp,
        Button::BrightnessDown,
        Button::VolumeUp,
        Button::VolumeDown,
    ];
}

/// Anything that can report button presses
pub trait InputSource: Send {
    /// True if `button` was pressed since the last query for it
    fn is_pressed(&mut self, button: Button) -> bool;
}

/// No buttons at all (headless)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_pressed(&mut self, _button: Button) -> bool {
        false
    }
}

/// Presses latched from another thread (emulator keyboard, tests) and
/// consumed on read
#[derive(Debug, Default, Clone)]
pub struct LatchedInput {
    pressed: Arc<Mutex<HashSet<Button>>>,
}

impl LatchedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press; it stays latched until polled
    pub fn latch(&self, button: Button) {
        log::debug!("button latched: {:?}", button);
        self.lock().insert(button);
    }

    /// Another handle onto the same latch
    pub fn handle(&self) -> LatchedInput {
        self.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Button>> {
        self.pressed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl InputSource for LatchedInput {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.lock().remove(&button)
    }
}

/// What the loop should do in response to the buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    SelectFlatColor,
    SelectGradientB,
    SelectGradientC,
    ManualRefresh,
    BrightnessUp,
    BrightnessDown,
    VolumeUp,
    VolumeDown,
}

/// Turns raw presses into events.
///
/// D arms the refresh gesture; a C press while armed is a manual refresh
/// instead of a mode change. D and C in the same poll count as the gesture.
#[derive(Debug)]
pub struct InputPoller {
    gesture_window: Duration,
    gesture_deadline: Option<Instant>,
}

impl InputPoller {
    pub fn new(gesture_window: Duration) -> Self {
        Self { gesture_window, gesture_deadline: None }
    }

    /// Query every button once and return the events in board order
    pub fn poll(&mut self, source: &mut dyn InputSource, now: Instant) -> Vec<InputEvent> {
        let pressed: Vec<Button> = Button::ALL
            .into_iter()
            .filter(|&b| source.is_pressed(b))
            .collect();

        if self.gesture_deadline.is_some_and(|deadline| now > deadline) {
            self.gesture_deadline = None;
        }

        let d_pressed = pressed.contains(&Button::D);
        let mut events = Vec::with_capacity(pressed.len());
        for button in pressed {
            let event = match button {
                Button::A => InputEvent::SelectFlatColor,
                Button::B => InputEvent::SelectGradientB,
                Button::C if d_pressed || self.gesture_deadline.is_some() => {
                    self.gesture_deadline = None;
                    InputEvent::ManualRefresh
                }
                Button::C => InputEvent::SelectGradientC,
                Button::D => {
                    // a C in this same poll has already consumed the gesture
                    if !events.contains(&InputEvent::ManualRefresh) {
                        self.gesture_deadline = Some(now + self.gesture_window);
                    }
                    continue;
                }
                Button::BrightnessUp => InputEvent::BrightnessUp,
                Button::BrightnessDown => InputEvent::BrightnessDown,
                Button::VolumeUp => InputEvent::VolumeUp,
                Button::VolumeDown => InputEvent::VolumeDown,
            };
            log::debug!("input event: {:?}", event);
            events.push(event);
        }
        events
    }

    /// True while a D press is waiting for its C
    pub fn gesture_armed(&self) -> bool {
        self.gesture_deadline.is_some()
    }
}
