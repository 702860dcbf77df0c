//! Search pipeline: extract → recognize text → match name → detect faces → crop.
//!
//! The three external collaborators sit behind traits so the pipeline can be
//! driven with real backends or with in-memory fakes. The run is sequential
//! and stops at the first collaborator error.

use crate::compose;
use crate::crop::crop_and_bounded_resize;
use crate::layout::{LayoutConfig, LayoutError};
use crate::painter::LabelPainter;
use crate::types::{ArchiveEntry, BoundingBox, ImageRecord, RecordMatch};
use image::{GrayImage, RgbImage};
use std::path::Path;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("reading archive {archive}: {source}")]
    Archive {
        archive: String,
        #[source]
        source: BoxError,
    },
    #[error("text recognition failed for {entry}: {source}")]
    Recognition {
        entry: String,
        #[source]
        source: BoxError,
    },
    #[error("face detection failed for {entry}: {source}")]
    Detection {
        entry: String,
        #[source]
        source: BoxError,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Yields the decoded images of an archive, in a stable order.
pub trait ArchiveSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn extract_entries(&self, archive: &Path) -> Result<Vec<ArchiveEntry>, Self::Error>;
}

/// Optical character recognition on a grayscale image.
pub trait TextRecognizer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn recognize_text(&self, image: &GrayImage) -> Result<String, Self::Error>;
}

/// Finds face bounding boxes in a grayscale image.
pub trait FaceLocator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn detect_faces(&mut self, image: &GrayImage) -> Result<Vec<BoundingBox>, Self::Error>;
}

/// Extract every entry of `archive` and OCR it.
pub fn recognize_archive<S, R>(
    source: &S,
    archive: &Path,
    recognizer: &R,
) -> Result<Vec<ImageRecord>, PipelineError>
where
    S: ArchiveSource,
    R: TextRecognizer,
{
    let entries = source
        .extract_entries(archive)
        .map_err(|e| PipelineError::Archive {
            archive: archive.display().to_string(),
            source: Box::new(e),
        })?;
    tracing::info!(archive = %archive.display(), entries = entries.len(), "extracted archive");

    let mut records = Vec::with_capacity(entries.len());
    for ArchiveEntry { name, image } in entries {
        tracing::info!(entry = %name, "extracting text");
        let text = recognizer
            .recognize_text(&image.to_luma8())
            .map_err(|e| PipelineError::Recognition {
                entry: name.clone(),
                source: Box::new(e),
            })?;
        tracing::debug!(entry = %name, chars = text.len(), "text recognized");

        records.push(ImageRecord {
            source_name: name,
            image,
            recognized_text: text,
        });
    }

    Ok(records)
}

/// Look for `name` in every record and crop the faces of the ones that mention it.
///
/// The locator only runs on matched records.
pub fn search_faces<L: FaceLocator>(
    records: &[ImageRecord],
    name: &str,
    locator: &mut L,
    thumbnail_cap: u32,
) -> Result<Vec<RecordMatch>, PipelineError> {
    let mut matches = Vec::with_capacity(records.len());

    for record in records {
        if !record.mentions(name) {
            matches.push(RecordMatch {
                source_name: record.source_name.clone(),
                matched: false,
                thumbnails: Vec::new(),
            });
            continue;
        }

        tracing::info!(entry = %record.source_name, name, "searching for faces");
        let faces = locator
            .detect_faces(&record.image.to_luma8())
            .map_err(|e| PipelineError::Detection {
                entry: record.source_name.clone(),
                source: Box::new(e),
            })?;

        let thumbnails: Vec<_> = faces
            .iter()
            .filter_map(|face| crop_and_bounded_resize(&record.image, face, thumbnail_cap))
            .collect();
        if thumbnails.len() < faces.len() {
            tracing::warn!(
                entry = %record.source_name,
                dropped = faces.len() - thumbnails.len(),
                "face boxes outside the image were dropped"
            );
        }
        tracing::debug!(entry = %record.source_name, faces = thumbnails.len(), "faces cropped");

        matches.push(RecordMatch {
            source_name: record.source_name.clone(),
            matched: true,
            thumbnails,
        });
    }

    Ok(matches)
}

/// Compose the contact sheet for one search.
pub fn render_sheet(
    matches: &[RecordMatch],
    layout: &LayoutConfig,
    painter: &dyn LabelPainter,
) -> Result<RgbImage, PipelineError> {
    Ok(compose::compose_sheet(matches, layout, painter)?)
}
