//! Label rendering for contact-sheet blocks.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;

const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
pub const DEFAULT_FONT_SIZE: f32 = 20.0;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("font file not readable: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("not a usable TrueType/OpenType font: {0}")]
    Invalid(String),
    #[error("font size must be positive, got {0}")]
    InvalidSize(f32),
}

/// Draws single lines of text onto a block.
pub trait LabelPainter {
    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw_line(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str);
}

/// Renders labels in black with a TrueType/OpenType font.
pub struct FontPainter {
    font: FontVec,
    scale: PxScale,
}

impl FontPainter {
    /// Load a font file and render at `size` pixels.
    pub fn load(path: &Path, size: f32) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let painter = Self::from_bytes(bytes, size)
            .map_err(|e| match e {
                FontError::Invalid(_) => FontError::Invalid(path.display().to_string()),
                other => other,
            })?;

        tracing::debug!(path = %path.display(), size, "loaded label font");
        Ok(painter)
    }

    pub fn from_bytes(bytes: Vec<u8>, size: f32) -> Result<Self, FontError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(FontError::InvalidSize(size));
        }
        let font = FontVec::try_from_vec(bytes).map_err(|e| FontError::Invalid(e.to_string()))?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }
}

impl LabelPainter for FontPainter {
    fn draw_line(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str) {
        imageproc::drawing::draw_text_mut(canvas, LABEL_COLOR, x, y, self.scale, &self.font, text);
    }
}
