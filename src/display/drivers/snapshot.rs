/*
 *  display/drivers/snapshot.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless driver that writes every flushed frame to a PPM file
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
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

/// Headless panel: each flush overwrites `path` with the current frame.
///
/// The frame is written to a sibling temp file first and renamed into
/// place, so a viewer never sees a half-written image.
#[derive(Debug)]
pub struct SnapshotDriver {
    framebuffer: VarFrameBuf<Rgb888>,
    capabilities: DisplayCapabilities,
    path: PathBuf,
    frames: u64,
}

impl SnapshotDriver {
    pub fn new(capabilities: DisplayCapabilities, path: impl Into<PathBuf>) -> Self {
        Self {
            framebuffer: VarFrameBuf::new(capabilities.width, capabilities.height, Rgb888::BLACK),
            capabilities,
            path: path.into(),
            frames: 0,
        }
    }
}

impl DisplayDriver for SnapshotDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        info!("Snapshot display {}x{} -> {}",
            self.capabilities.width, self.capabilities.height, self.path.display());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let tmp = self.path.with_extension("ppm.tmp");
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            self.framebuffer.write_ppm(&mut out)?;
            out.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.frames += 1;
        debug!("snapshot frame {} written", self.frames);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.clear_color(Rgb888::BLACK);
        self.flush()
    }
}

impl DrawTarget for SnapshotDriver {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
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

impl OriginDimensions for SnapshotDriver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_writes_ppm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames/face.ppm");
        let mut driver = SnapshotDriver::new(DisplayCapabilities::new(4, 2), &path);
        driver.init().unwrap();
        driver.fill_solid(&Rectangle::new(Point::zero(), Size::new(1, 1)), Rgb888::RED).unwrap();
        driver.flush().unwrap();
        driver.flush().unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n4 2\n255\n"));
        assert_eq!(bytes.len(), 11 + 4 * 2 * 3);
        assert_eq!(&bytes[11..14], &[255, 0, 0]);
        assert!(!path.with_extension("ppm.tmp").exists());
    }
}
