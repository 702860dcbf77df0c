//! SCRFD face locator via ONNX Runtime.
//!
//! The grayscale page is letterboxed into a 640×640 square, run through the
//! model, and the three stride heads are decoded into boxes in page
//! coordinates before non-maximum suppression.

use facesheet_core::{BoundingBox, FaceLocator};
use image::{imageops, GrayImage, Luma};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const INPUT_SIZE: u32 = 640;
const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 128.0;
const STRIDES: [usize; 3] = [8, 16, 32];
const ANCHORS_PER_CELL: usize = 2;
/// Padding value. Nearest byte to `PIXEL_MEAN`, so it normalizes to 0.5 / `PIXEL_STD`, not exactly zero.
const PAD_VALUE: u8 = 128;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0} (download det_10g.onnx from insightface)")]
    ModelNotFound(String),
    #[error("unexpected model: {0}")]
    UnexpectedModel(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Tunables for [`ScrfdLocator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
    /// Minimum face score kept after decoding.
    pub confidence_threshold: f32,
    /// IoU above which the weaker of two boxes is suppressed.
    pub nms_threshold: f32,
    /// ONNX Runtime intra-op threads.
    pub intra_threads: usize,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            nms_threshold: 0.4,
            intra_threads: 2,
        }
    }
}

/// Where the page sits inside the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
    scale: f32,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn fit(width: u32, height: u32) -> Self {
        let scale = (INPUT_SIZE as f32 / width as f32).min(INPUT_SIZE as f32 / height as f32);
        let (new_w, new_h) = scaled_size(width, height, scale);
        Self {
            scale,
            pad_x: (INPUT_SIZE - new_w) / 2,
            pad_y: (INPUT_SIZE - new_h) / 2,
        }
    }

    /// Map a point from model input space back to page space.
    fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }
}

fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let w = ((width as f32 * scale).round() as u32).clamp(1, INPUT_SIZE);
    let h = ((height as f32 * scale).round() as u32).clamp(1, INPUT_SIZE);
    (w, h)
}

/// Output tensor positions for one stride: (score, bbox, keypoints).
type HeadIndices = (usize, usize, usize);

/// SCRFD-based face locator.
pub struct ScrfdLocator {
    session: Session,
    heads: [HeadIndices; 3],
    options: DetectorOptions,
}

impl ScrfdLocator {
    /// Load the SCRFD ONNX model from `model_path`.
    pub fn load(model_path: &Path, options: DetectorOptions) -> Result<Self, DetectorError> {
        if !model_path.exists() {
            return Err(DetectorError::ModelNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(options.intra_threads)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();
        if output_names.len() < 9 {
            return Err(DetectorError::UnexpectedModel(format!(
                "SCRFD needs 9 outputs (score/bbox/kps for 3 strides), got {}",
                output_names.len()
            )));
        }

        let heads = head_indices(&output_names);
        tracing::info!(
            path = %model_path.display(),
            outputs = ?output_names,
            ?heads,
            "loaded SCRFD model"
        );

        Ok(Self { session, heads, options })
    }

    /// Detect faces, strongest first.
    pub fn detect(&mut self, page: &GrayImage) -> Result<Vec<BoundingBox>, DetectorError> {
        if page.width() == 0 || page.height() == 0 {
            return Ok(Vec::new());
        }

        let letterbox = Letterbox::fit(page.width(), page.height());
        let input = to_tensor(&letterbox_page(page, &letterbox));
        let heads = self.heads;
        let threshold = self.options.confidence_threshold;

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut candidates = Vec::new();
        for (&stride, &(score_idx, bbox_idx, _)) in STRIDES.iter().zip(heads.iter()) {
            let (_, scores) = outputs[score_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("scores, stride {stride}: {e}")))?;
            let (_, deltas) = outputs[bbox_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("boxes, stride {stride}: {e}")))?;

            candidates.extend(decode_head(scores, deltas, stride, &letterbox, threshold));
        }

        let faces = non_max_suppression(candidates, self.options.nms_threshold);
        tracing::debug!(faces = faces.len(), "SCRFD detection finished");
        Ok(faces)
    }
}

impl FaceLocator for ScrfdLocator {
    type Error = DetectorError;

    fn detect_faces(&mut self, image: &GrayImage) -> Result<Vec<BoundingBox>, DetectorError> {
        self.detect(image)
    }
}

/// Resize the page into the model's square input, centred on a neutral background.
fn letterbox_page(page: &GrayImage, letterbox: &Letterbox) -> GrayImage {
    let (new_w, new_h) = scaled_size(page.width(), page.height(), letterbox.scale);
    let resized = imageops::resize(page, new_w, new_h, imageops::FilterType::Triangle);

    let mut canvas = GrayImage::from_pixel(INPUT_SIZE, INPUT_SIZE, Luma([PAD_VALUE]));
    imageops::replace(
        &mut canvas,
        &resized,
        i64::from(letterbox.pad_x),
        i64::from(letterbox.pad_y),
    );
    canvas
}

/// NCHW float tensor; the gray channel is replicated into R, G and B.
fn to_tensor(square: &GrayImage) -> Array4<f32> {
    let (w, h) = (square.width() as usize, square.height() as usize);
    let mut tensor = Array4::<f32>::zeros((1, 3, h, w));
    for (x, y, Luma([v])) in square.enumerate_pixels() {
        let normalized = (*v as f32 - PIXEL_MEAN) / PIXEL_STD;
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = normalized;
        }
    }
    tensor
}

/// Find the score/bbox/kps tensors for each stride.
///
/// Exports either name them `score_8`, `bbox_16`, ... or use opaque numeric
/// names in the standard order: scores 8/16/32, boxes 8/16/32, keypoints 8/16/32.
fn head_indices(names: &[String]) -> [HeadIndices; 3] {
    let position = |kind: &str, stride: usize| {
        let wanted = format!("{kind}_{stride}");
        names.iter().position(|n| *n == wanted)
    };

    let named: Option<Vec<HeadIndices>> = STRIDES
        .iter()
        .map(|&s| Some((position("score", s)?, position("bbox", s)?, position("kps", s)?)))
        .collect();

    match named {
        Some(found) => [found[0], found[1], found[2]],
        None => [(0, 3, 6), (1, 4, 7), (2, 5, 8)],
    }
}

/// Decode one stride head into candidate boxes in page coordinates.
fn decode_head(
    scores: &[f32],
    deltas: &[f32],
    stride: usize,
    letterbox: &Letterbox,
    threshold: f32,
) -> Vec<BoundingBox> {
    let cells_x = INPUT_SIZE as usize / stride;
    let cells_y = INPUT_SIZE as usize / stride;
    let anchors = cells_x * cells_y * ANCHORS_PER_CELL;
    let step = stride as f32;

    (0..anchors.min(scores.len()))
        .filter(|&i| scores[i] > threshold)
        .filter_map(|i| {
            let d = deltas.get(i * 4..i * 4 + 4)?;
            let cell = i / ANCHORS_PER_CELL;
            let cx = (cell % cells_x) as f32 * step;
            let cy = (cell / cells_x) as f32 * step;

            let (x1, y1) = letterbox.unmap(cx - d[0] * step, cy - d[1] * step);
            let (x2, y2) = letterbox.unmap(cx + d[2] * step, cy + d[3] * step);
            Some(BoundingBox {
                x: x1,
                y: y1,
                width: x2 - x1,
                height: y2 - y1,
                confidence: scores[i],
            })
        })
        .collect()
}

/// Keep the strongest boxes, dropping any that overlap a kept one by more than `iou_threshold`.
fn non_max_suppression(mut boxes: Vec<BoundingBox>, iou_threshold: f32) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<BoundingBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if kept.iter().all(|k| iou(k, &candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}

fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let overlap_w = ((a.x + a.width).min(b.x + b.width) - a.x.max(b.x)).max(0.0);
    let overlap_h = ((a.y + a.height).min(b.y + b.height) - a.y.max(b.y)).max(0.0);
    let intersection = overlap_w * overlap_h;
    let union = a.width * a.height + b.width * b.height - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
}
