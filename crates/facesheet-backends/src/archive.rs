//! Zip archive extraction via the `zip` crate.

use facesheet_core::{ArchiveEntry, ArchiveSource};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 64 << 20;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("archive not found: {0}")]
    NotFound(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("entry {entry} is not a decodable image: {source}")]
    Decode {
        entry: String,
        #[source]
        source: image::ImageError,
    },
}

/// Reads every file entry of a zip archive as an image, in central-directory order.
///
/// Directory entries are skipped. Anything else that fails to decode is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveSource;

impl ZipArchiveSource {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveSource for ZipArchiveSource {
    type Error = ArchiveError;

    fn extract_entries(&self, archive: &Path) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        if !archive.exists() {
            return Err(ArchiveError::NotFound(archive.display().to_string()));
        }

        // The handle is closed when `zip` drops, on every return path.
        let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;
        tracing::debug!(archive = %archive.display(), entries = zip.len(), "opened zip archive");

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let mut file = zip.by_index(index)?;
            if file.is_dir() {
                tracing::debug!(entry = file.name(), "skipping directory entry");
                continue;
            }

            let name = file.name().to_string();
            tracing::info!(entry = %name, "extracting image");

            let mut bytes = Vec::with_capacity(prealloc_hint(file.size()));
            file.read_to_end(&mut bytes)?;
            let image = image::load_from_memory(&bytes).map_err(|source| ArchiveError::Decode {
                entry: name.clone(),
                source,
            })?;

            entries.push(ArchiveEntry { name, image });
        }

        Ok(entries)
    }
}

/// Capacity to reserve for an entry. The header's size is untrusted, so it is capped.
fn prealloc_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn write_zip(path: &Path, entries: &[(&str, Option<Vec<u8>>)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            match data {
                Some(bytes) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(bytes).unwrap();
                }
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_entries_in_archive_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.zip");
        write_zip(
            &path,
            &[
                ("b-2.png", Some(png_bytes(20, 10, [1, 2, 3]))),
                ("a-1.png", Some(png_bytes(8, 8, [4, 5, 6]))),
                ("nested/", None),
                ("nested/c-3.png", Some(png_bytes(3, 7, [7, 8, 9]))),
            ],
        );

        let entries = ZipArchiveSource::new().extract_entries(&path).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b-2.png", "a-1.png", "nested/c-3.png"]);
        assert_eq!((entries[0].image.width(), entries[0].image.height()), (20, 10));
        assert_eq!(entries[2].image.to_rgb8().get_pixel(0, 0), &Rgb([7, 8, 9]));
    }

    #[test]
    fn test_prealloc_ignores_inflated_sizes() {
        assert_eq!(prealloc_hint(4096), 4096);
        assert_eq!(prealloc_hint(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn test_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        write_zip(&path, &[]);
        assert!(ZipArchiveSource::new().extract_entries(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_archive() {
        let err = ZipArchiveSource::new()
            .extract_entries(Path::new("/nonexistent/facesheet/none.zip"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"this is not a zip file at all").unwrap();
        let err = ZipArchiveSource::new().extract_entries(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }

    #[test]
    fn test_non_image_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.zip");
        write_zip(
            &path,
            &[
                ("ok.png", Some(png_bytes(4, 4, [0, 0, 0]))),
                ("notes.txt", Some(b"hello".to_vec())),
            ],
        );
        let err = ZipArchiveSource::new().extract_entries(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::Decode { ref entry, .. } if entry == "notes.txt"));
    }
}
