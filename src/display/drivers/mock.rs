/*
 *  display/drivers/mock.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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
use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

use std::sync::{Arc, Mutex};

/// Mock display driver for testing
///
/// Keeps the frame in memory and records every driver call so tests can
/// check what the face did.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Framebuffer for drawing operations
    framebuffer: VarFrameBuf<Rgb888>,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times flush() was called
    pub flush_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
}

impl MockDriver {
    pub fn new(capabilities: DisplayCapabilities) -> Self {
        let framebuffer = VarFrameBuf::new(capabilities.width, capabilities.height, Rgb888::BLACK);
        Self {
            framebuffer,
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Self {
        Self::new(DisplayCapabilities::new(width, height))
    }

    /// Get pixel at position for testing
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        self.framebuffer.pixel(Point::new(x as i32, y as i32))
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Count pixels of exactly `color`
    pub fn count_pixels(&self, color: Rgb888) -> usize {
        self.framebuffer.as_slice().iter().filter(|&&p| p == color).count()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockDriverState) -> R) -> Result<R, DisplayError> {
        self.state
            .lock()
            .map(|mut s| f(&mut s))
            .map_err(|_| DisplayError::Other("mock state poisoned".to_string()))
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.with_state(|s| {
            s.init_count += 1;
            s.is_initialized = true;
        })
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let failed = self.with_state(|s| {
            if s.simulate_flush_failure {
                true
            } else {
                s.flush_count += 1;
                false
            }
        })?;
        if failed {
            return Err(DisplayError::Other("Simulated flush failure".to_string()));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.with_state(|s| s.clear_count += 1)?;
        self.framebuffer.clear_color(Rgb888::BLACK);
        self.flush()
    }
}

impl DrawTarget for MockDriver {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear(color)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.framebuffer.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.fill_solid(area, color)
    }
}

impl OriginDimensions for MockDriver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new_with_size(320, 320);
        assert_eq!(driver.dimensions(), (320, 320));
        assert_eq!(driver.count_pixels(Rgb888::BLACK), 320 * 320);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(32, 32);
        let state = driver.state();
        assert!(!state.lock().unwrap().is_initialized);
        driver.init().unwrap();
        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_driver_drawing_and_clear() {
        let mut driver = MockDriver::new_with_size(32, 32);
        Line::new(Point::new(0, 0), Point::new(10, 10))
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::WHITE, 1))
            .draw(&mut driver)
            .unwrap();
        assert_eq!(driver.get_pixel(0, 0), Some(Rgb888::WHITE));
        assert!(driver.count_pixels(Rgb888::WHITE) > 0);

        // Clear using DisplayDriver trait (to disambiguate from DrawTarget::clear)
        DisplayDriver::clear(&mut driver).unwrap();
        assert_eq!(driver.count_pixels(Rgb888::WHITE), 0);
        let state = driver.state();
        assert_eq!(state.lock().unwrap().clear_count, 1);
        assert_eq!(state.lock().unwrap().flush_count, 1);
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new_with_size(16, 16);
        driver.state().lock().unwrap().simulate_flush_failure = true;
        assert!(driver.flush().is_err());
        driver.state().lock().unwrap().simulate_flush_failure = false;
        assert!(driver.flush().is_ok());
    }
}
