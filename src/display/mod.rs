/*
 *  display/mod.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - drivers, colours, layout and face components
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
pub mod color;

// Display drivers
pub mod drivers;

// Layout for round and rectangular screens
pub mod layout;

// UI components
pub mod components;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, DisplayDriver, FaceSurface, ScreenShape};
pub use error::DisplayError;
pub use color::{Paints, Theme};
pub use layout::{FaceDimensions, FaceLayout};
pub use components::{ClockDisplay, ClockFrame, WeatherDisplay, WeatherFrame};
