//! Region masking on decoded images.

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::field::PiiField;
use crate::geometry::{PixelRect, RectifyError, rectify};

/// Sigma OpenCV derives for a 51x51 Gaussian kernel.
pub const BLUR_SIGMA: f32 = 8.0;

const FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// How a detected region is obscured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Opaque black fill.
    #[default]
    Rectangle,
    /// Gaussian blur of the region.
    Blur,
}

impl MaskMode {
    /// Lenient parse: `"blur"` selects blurring, anything else a filled
    /// rectangle.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("blur") {
            MaskMode::Blur
        } else {
            MaskMode::Rectangle
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaskMode::Rectangle => "rectangle",
            MaskMode::Blur => "blur",
        }
    }
}

impl FromStr for MaskMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MaskMode::from_name(s))
    }
}

impl fmt::Display for MaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field whose geometry could not be masked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedField {
    pub index: usize,
    pub value: String,
    pub reason: String,
}

/// Outcome of one masking run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaskReport {
    pub masked: Vec<PixelRect>,
    pub skipped: Vec<SkippedField>,
}

impl MaskReport {
    pub fn masked_count(&self) -> usize {
        self.masked.len()
    }
}

/// Rectify every field against `image` and obscure the valid regions.
///
/// Fields with unusable geometry are recorded in the report and do not
/// stop the remaining ones.
pub fn mask_fields(image: &mut RgbaImage, fields: &[PiiField], mode: MaskMode) -> MaskReport {
    let (width, height) = image.dimensions();
    let mut report = MaskReport::default();

    for (index, field) in fields.iter().enumerate() {
        match rectify(field.geometry.as_ref(), width, height) {
            Ok(rect) => {
                apply(image, rect, mode);
                report.masked.push(rect);
            }
            Err(reason) => {
                log_skip(index, field, reason);
                report.skipped.push(SkippedField {
                    index,
                    value: field.value.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    info!(
        masked = report.masked.len(),
        skipped = report.skipped.len(),
        %mode,
        "masked PII regions"
    );
    report
}

fn log_skip(index: usize, field: &PiiField, reason: RectifyError) {
    match reason {
        RectifyError::Missing => debug!(index, category = %field.category, "field has no geometry"),
        _ => warn!(index, category = %field.category, %reason, "invalid geometry, skipping field"),
    }
}

/// Obscure one rectangle that is known to lie inside `image`.
pub fn apply(image: &mut RgbaImage, rect: PixelRect, mode: MaskMode) {
    match mode {
        MaskMode::Rectangle => {
            let region = Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height);
            draw_filled_rect_mut(image, region, FILL);
        }
        MaskMode::Blur => {
            let roi = imageops::crop_imm(&*image, rect.x, rect.y, rect.width, rect.height).to_image();
            let blurred = gaussian_blur_f32(&roi, BLUR_SIGMA);
            imageops::replace(image, &blurred, i64::from(rect.x), i64::from(rect.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_defaults_to_rectangle() {
        assert_eq!(MaskMode::from_name("blur"), MaskMode::Blur);
        assert_eq!(MaskMode::from_name(" BLUR "), MaskMode::Blur);
        assert_eq!(MaskMode::from_name("rectangle"), MaskMode::Rectangle);
        assert_eq!(MaskMode::from_name("pixelate"), MaskMode::Rectangle);
        assert_eq!("".parse::<MaskMode>().unwrap(), MaskMode::Rectangle);
    }
}
