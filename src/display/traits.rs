/*
 *  display/traits.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for the face's display surface
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
use crate::display::error::DisplayError;

/// Physical outline of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenShape {
    /// Square or rectangular panels
    #[default]
    Rectangular,

    /// Circular panels, text needs more inset
    Round,
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

}

impl DisplayCapabilities {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// Drivers buffer a frame in memory (they are also the `DrawTarget` the face
/// paints into) and push it out on `flush`.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Prepare the display for rendering
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push the buffered frame to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Clear the display to black
    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// A driver the face can paint into directly.
///
/// Blanket-implemented for every driver that is also an `Rgb888` draw target.
pub trait FaceSurface: DisplayDriver + DrawTarget<Color = Rgb888> + OriginDimensions {}

impl<T> FaceSurface for T where T: DisplayDriver + DrawTarget<Color = Rgb888> + OriginDimensions {}
