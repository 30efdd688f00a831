//! Normalized bounding boxes and their conversion to pixel rectangles.
//!
//! OCR engines report geometry as fractions of the page size with the
//! origin at the top-left corner. Masking needs whole pixels inside the
//! raster, so every box goes through [`rectify`] first. A rejected box
//! only drops that one region; callers keep going with the rest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis-aligned box in normalized page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &NormalizedBox) -> NormalizedBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        NormalizedBox {
            left,
            top,
            width: self.right().max(other.right()) - left,
            height: self.bottom().max(other.bottom()) - top,
        }
    }

    fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Rectangle in pixel coordinates, guaranteed to lie inside the raster it
/// was rectified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Why a box could not be turned into a pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RectifyError {
    #[error("no geometry")]
    Missing,
    #[error("geometry has non-finite components")]
    Incomplete,
    #[error("width rounds to {0} pixels")]
    EmptyWidth(i64),
    #[error("height rounds to {0} pixels")]
    EmptyHeight(i64),
    #[error("origin ({x}, {y}) lies before the raster")]
    NegativeOrigin { x: i64, y: i64 },
    #[error("region ends at ({right}, {bottom}) outside a {width}x{height} raster")]
    OutOfBounds {
        right: i64,
        bottom: i64,
        width: u32,
        height: u32,
    },
}

/// Convert a normalized box into pixels for a `image_width` x
/// `image_height` raster.
///
/// Every coordinate is floored. Boxes that are absent, degenerate, or
/// reach outside the raster are rejected rather than clamped.
pub fn rectify(
    bbox: Option<&NormalizedBox>,
    image_width: u32,
    image_height: u32,
) -> Result<PixelRect, RectifyError> {
    let bbox = bbox.ok_or(RectifyError::Missing)?;
    if !bbox.is_finite() {
        return Err(RectifyError::Incomplete);
    }

    let iw = f64::from(image_width);
    let ih = f64::from(image_height);
    let x = (bbox.left * iw).floor() as i64;
    let y = (bbox.top * ih).floor() as i64;
    let w = (bbox.width * iw).floor() as i64;
    let h = (bbox.height * ih).floor() as i64;

    if w <= 0 {
        return Err(RectifyError::EmptyWidth(w));
    }
    if h <= 0 {
        return Err(RectifyError::EmptyHeight(h));
    }
    if x < 0 || y < 0 {
        return Err(RectifyError::NegativeOrigin { x, y });
    }
    let right = x.saturating_add(w);
    let bottom = y.saturating_add(h);
    if right > i64::from(image_width) || bottom > i64::from(image_height) {
        return Err(RectifyError::OutOfBounds {
            right,
            bottom,
            width: image_width,
            height: image_height,
        });
    }

    // All four values are now within 0..=u32::MAX.
    Ok(PixelRect {
        x: x as u32,
        y: y as u32,
        width: w as u32,
        height: h as u32,
    })
}
