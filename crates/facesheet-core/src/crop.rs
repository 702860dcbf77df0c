use crate::types::{BoundingBox, Thumbnail};
use image::DynamicImage;

/// Cut a detected face out of `image` and bound it to `max_side`.
///
/// The box is clamped to the image first. Returns `None` when the clamped
/// box is empty.
pub fn crop_and_bounded_resize(
    image: &DynamicImage,
    face: &BoundingBox,
    max_side: u32,
) -> Option<Thumbnail> {
    let rect = face.to_pixel_rect(image.width(), image.height())?;
    let crop = image.crop_imm(rect.x, rect.y, rect.width, rect.height).to_rgb8();
    Some(Thumbnail::fit(crop, max_side))
}
