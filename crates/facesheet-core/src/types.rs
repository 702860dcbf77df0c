use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Integer pixel rectangle, always inside the image it was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Round the box to whole pixels and clamp it to an `image_width` × `image_height` frame.
    ///
    /// Returns `None` when nothing of the box lies inside the frame.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> Option<PixelRect> {
        if !(self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()) {
            return None;
        }

        let x0 = self.x.round().clamp(0.0, image_width as f32) as u32;
        let y0 = self.y.round().clamp(0.0, image_height as f32) as u32;
        let x1 = (self.x + self.width).round().clamp(0.0, image_width as f32) as u32;
        let y1 = (self.y + self.height).round().clamp(0.0, image_height as f32) as u32;

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// One decoded entry of an input archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub image: DynamicImage,
}

/// An archive entry after text recognition.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Archive entry name; unique within one archive.
    pub source_name: String,
    pub image: DynamicImage,
    pub recognized_text: String,
}

impl ImageRecord {
    /// Exact, case-sensitive substring test against the recognized text.
    pub fn mentions(&self, name: &str) -> bool {
        self.recognized_text.contains(name)
    }
}

/// Serializable view of a record's OCR output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub source_name: String,
    pub text: String,
}

impl From<&ImageRecord> for RecognizedText {
    fn from(record: &ImageRecord) -> Self {
        Self {
            source_name: record.source_name.clone(),
            text: record.recognized_text.clone(),
        }
    }
}

/// A face crop no larger than the cap it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    image: RgbImage,
}

impl Thumbnail {
    /// Wrap `image`, shrinking it to exactly `cap` × `cap` if either side exceeds `cap`.
    ///
    /// Images already within the cap are kept as they are (never upscaled).
    pub fn fit(image: RgbImage, cap: u32) -> Self {
        if image.width() > cap || image.height() > cap {
            let image = image::imageops::resize(
                &image,
                cap,
                cap,
                image::imageops::FilterType::CatmullRom,
            );
            return Self { image };
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Result of searching one record for a name.
#[derive(Debug, Clone)]
pub struct RecordMatch {
    pub source_name: String,
    /// Whether the record's text contains the search name.
    pub matched: bool,
    /// Face crops in detection order; always empty for unmatched records.
    pub thumbnails: Vec<Thumbnail>,
}

/// Counts reported after a search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub records: usize,
    pub matched: usize,
    pub faces: usize,
}

impl SearchSummary {
    pub fn from_matches(matches: &[RecordMatch]) -> Self {
        matches.iter().fold(
            Self {
                records: matches.len(),
                ..Self::default()
            },
            |mut acc, m| {
                if m.matched {
                    acc.matched += 1;
                    acc.faces += m.thumbnails.len();
                }
                acc
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn bbox(x: f32, y: f32, w: f32, h: f32) -> BoundingBox {
        BoundingBox { x, y, width: w, height: h, confidence: 1.0 }
    }

    #[test]
    fn test_pixel_rect_inside() {
        let rect = bbox(10.0, 20.0, 30.0, 40.0).to_pixel_rect(100, 100).unwrap();
        assert_eq!(rect, PixelRect { x: 10, y: 20, width: 30, height: 40 });
    }

    #[test]
    fn test_pixel_rect_clamped_at_edges() {
        let rect = bbox(-5.0, 90.0, 20.0, 20.0).to_pixel_rect(100, 100).unwrap();
        assert_eq!(rect, PixelRect { x: 0, y: 90, width: 15, height: 10 });
    }

    #[test]
    fn test_pixel_rect_outside_is_none() {
        assert!(bbox(150.0, 10.0, 20.0, 20.0).to_pixel_rect(100, 100).is_none());
        assert!(bbox(10.0, 10.0, 0.0, 20.0).to_pixel_rect(100, 100).is_none());
        assert!(bbox(f32::NAN, 10.0, 5.0, 5.0).to_pixel_rect(100, 100).is_none());
    }

    #[test]
    fn test_thumbnail_never_upscales() {
        let thumb = Thumbnail::fit(RgbImage::new(40, 70), 100);
        assert_eq!((thumb.width(), thumb.height()), (40, 70));
    }

    #[test]
    fn test_thumbnail_downscales_to_square_cap() {
        let thumb = Thumbnail::fit(RgbImage::from_pixel(250, 120, Rgb([9, 9, 9])), 100);
        assert_eq!((thumb.width(), thumb.height()), (100, 100));

        // One oversized side is enough to trigger the square resize.
        let thumb = Thumbnail::fit(RgbImage::new(30, 101), 100);
        assert_eq!((thumb.width(), thumb.height()), (100, 100));
    }

    #[test]
    fn test_mentions_is_case_sensitive() {
        let record = ImageRecord {
            source_name: "a.png".into(),
            image: DynamicImage::new_rgb8(1, 1),
            recognized_text: "Christopher went home".into(),
        };
        assert!(record.mentions("Chris"));
        assert!(!record.mentions("chris"));
        assert!(!record.mentions("Mark"));
    }

    #[test]
    fn test_summary_counts_only_matched_faces() {
        let matches = vec![
            RecordMatch { source_name: "a".into(), matched: true, thumbnails: vec![Thumbnail::fit(RgbImage::new(5, 5), 100); 3] },
            RecordMatch { source_name: "b".into(), matched: false, thumbnails: vec![] },
            RecordMatch { source_name: "c".into(), matched: true, thumbnails: vec![] },
        ];
        let summary = SearchSummary::from_matches(&matches);
        assert_eq!(summary, SearchSummary { records: 3, matched: 2, faces: 3 });
    }
}
