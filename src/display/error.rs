/*
 *  display/error.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Error type for matrix driver operations
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

use std::fmt;
use std::error::Error;

/// Unified error type for all matrix driver operations
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayError {
    /// Hardware (or window) initialization failed
    InitializationFailed(String),

    /// Unsupported operation for this matrix
    UnsupportedOperation,

    /// Presented frame does not match the matrix geometry
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Level outside 0.0..=1.0 for brightness or volume
    InvalidLevel(f32),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::InitializationFailed(msg) =>
                write!(f, "Matrix initialization failed: {}", msg),
            DisplayError::UnsupportedOperation =>
                write!(f, "Operation not supported by this matrix"),
            DisplayError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Frame size mismatch: expected {} pixels, got {}", expected, actual),
            DisplayError::InvalidLevel(level) =>
                write!(f, "Invalid level {} (must be within 0.0..=1.0)", level),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {}
