//! Module for rasterising small SVG images to straight-alpha RGBA pixels.
//!
//! This module uses `usvg` (through `resvg`'s re-export) for parsing and
//! `resvg` for rendering into a `tiny_skia::Pixmap`. The face blends the
//! result over its own background, so the output keeps its alpha channel.

use resvg::{
    render,
    usvg::{
        Options as ResvgUsvgOptions,
        ShapeRendering,
        Transform,
        Tree as ResvgTree,
    }
};

use tiny_skia::Pixmap;
use log::debug;
use std::error::Error;
use std::fmt;

/// Custom error type for SVG rendering operations.
#[derive(Debug)]
pub enum SvgImageError {
    /// Error parsing the SVG data.
    SvgParseError(String),
    /// Error creating a pixmap for rendering.
    PixmapCreationError(String),
    /// The SVG has no usable intrinsic size.
    EmptyImage,
}

impl fmt::Display for SvgImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgImageError::SvgParseError(msg) => write!(f, "SVG parse error: {}", msg),
            SvgImageError::PixmapCreationError(msg) => write!(f, "Pixmap creation error: {}", msg),
            SvgImageError::EmptyImage => write!(f, "SVG has zero width or height."),
        }
    }
}

impl Error for SvgImageError {}

/// Rasterised image, row-major, straight (not premultiplied) alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl RgbaImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Renders SVG data scaled to a fixed target size.
#[derive(Debug)]
pub struct SvgImageRenderer {
    tree: ResvgTree,
    target_width: u32,
    target_height: u32,
}

impl SvgImageRenderer {
    /// Parse `svg_data`; with `anti_alias` off, shapes are rendered with
    /// crisp edges so every pixel is either fully covered or empty.
    pub fn new(svg_data: &str, target_width: u32, target_height: u32, anti_alias: bool) -> Result<Self, SvgImageError> {
        let mut usvg_options = ResvgUsvgOptions::default();
        usvg_options.shape_rendering = if anti_alias {
            ShapeRendering::GeometricPrecision
        } else {
            ShapeRendering::CrispEdges
        };
        let tree = ResvgTree::from_str(svg_data, &usvg_options)
            .map_err(|e| SvgImageError::SvgParseError(format!("Failed to parse SVG: {:?}", e)))?;
        Ok(SvgImageRenderer {
            tree,
            target_width,
            target_height,
        })
    }

    pub fn render_rgba(&self) -> Result<RgbaImage, SvgImageError> {
        let mut pixmap = Pixmap::new(self.target_width, self.target_height)
            .ok_or_else(|| SvgImageError::PixmapCreationError(
                format!("{}x{}", self.target_width, self.target_height)))?;

        let svg_size = self.tree.size();
        if svg_size.width() <= 0.0 || svg_size.height() <= 0.0 {
            return Err(SvgImageError::EmptyImage);
        }
        let scale_x = self.target_width as f32 / svg_size.width();
        let scale_y = self.target_height as f32 / svg_size.height();
        let transform = Transform::from_scale(scale_x, scale_y);

        render(&self.tree, transform, &mut pixmap.as_mut());

        let pixels = pixmap
            .pixels()
            .iter()
            .map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        debug!("SVG rendered to {}x{} RGBA.", self.target_width, self.target_height);
        Ok(RgbaImage {
            width: self.target_width,
            height: self.target_height,
            pixels,
        })
    }
}
