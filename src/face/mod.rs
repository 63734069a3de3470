/*
 *  face/mod.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watch face: engine, redraw timer and host event loop
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

pub mod engine;
pub mod host;
pub mod timer;

use thiserror::Error;

use crate::display::error::DisplayError;

pub use engine::{Broadcast, FaceOptions, FaceProperties, RenderState, WatchFaceEngine, WindowInsets};
pub use host::{spawn_time_ticker, spawn_time_zone_watch, PlatformEvent};
pub use timer::{delay_to_next_tick, UpdateTimer};

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("display error: {0}")]
    Display(#[from] DisplayError),
}
