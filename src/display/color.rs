/*
 *  display/color.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 *
 *  Color math - hex decoding, luminance, dimming and stop interpolation
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

use crate::error::MatrixError;

/// GitHub's "no contributions" cell color, always painted as background
pub const SENTINEL_NO_ACTIVITY: Rgb888 = Rgb888::new(235, 237, 240);

/// Luminance weights. The green weight is 0.715, not the Rec. 709 0.7152,
/// and must stay that way to reproduce existing frames.
const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.715;
const LUMA_B: f64 = 0.0722;

/// Decode `rrggbb` (optionally `#rrggbb`) into a color
pub fn hex_to_rgb(hex: &str) -> Result<Rgb888, MatrixError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MatrixError::Format(format!("invalid hex color '{}'", hex)));
    }

    let channel = |at: usize| {
        u8::from_str_radix(&digits[at..at + 2], 16)
            .map_err(|e| MatrixError::Format(format!("invalid hex color '{}': {}", hex, e)))
    };

    Ok(Rgb888::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a color back to lowercase `rrggbb`
pub fn rgb_to_hex(color: Rgb888) -> String {
    format!("{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Perceived brightness, 0.0 (black) to ~255.0 (white)
pub fn luminance(color: Rgb888) -> f64 {
    LUMA_R * color.r() as f64 + LUMA_G * color.g() as f64 + LUMA_B * color.b() as f64
}

/// Scale every channel by `factor`, truncating toward zero
pub fn dim(color: Rgb888, factor: f64) -> Rgb888 {
    Rgb888::new(
        scale_channel(color.r(), factor),
        scale_channel(color.g(), factor),
        scale_channel(color.b(), factor),
    )
}

/// Linear blend from `from` (factor 0.0) toward `to` (factor 1.0), truncating toward zero
pub fn interpolate(from: Rgb888, to: Rgb888, factor: f64) -> Rgb888 {
    Rgb888::new(
        lerp_channel(from.r(), to.r(), factor),
        lerp_channel(from.g(), to.g(), factor),
        lerp_channel(from.b(), to.b(), factor),
    )
}

/// Dimming factor for a calendar cell: the brighter the source color, the
/// dimmer the painted pixel. The sentinel lands near zero and is masked anyway.
pub fn brightness_factor(color: Rgb888) -> f64 {
    1.0 - luminance(color) / 255.0
}

/// True for the source's "zero activity" marker (exact match only)
#[inline]
pub fn is_sentinel(color: Rgb888) -> bool {
    color == SENTINEL_NO_ACTIVITY
}

// `as u8` truncates toward zero and saturates into 0..=255
#[inline]
fn scale_channel(value: u8, factor: f64) -> u8 {
    (value as f64 * factor) as u8
}

#[inline]
fn lerp_channel(from: u8, to: u8, factor: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * factor) as u8
}
