use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default sheet location: `<dir>/<archive stem>-<name>.png`.
pub fn sheet_path(dir: &Path, archive: &Path, name: &str) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    dir.join(format!("{}-{}.png", file_safe(&stem), file_safe(name)))
}

/// Replace characters that are awkward in file names.
fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

/// Write the sheet, creating the parent directory if needed. The format follows the extension.
pub fn save_sheet(sheet: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    sheet
        .save(path)
        .with_context(|| format!("writing contact sheet {}", path.display()))?;
    tracing::info!(path = %path.display(), width = sheet.width(), height = sheet.height(), "sheet written");
    Ok(())
}

/// Open a written sheet in the desktop's default image viewer.
pub fn show(path: &Path) -> Result<()> {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    Command::new(program)
        .arg(path)
        .spawn()
        .with_context(|| format!("launching {program} for {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_sheet_path_naming() {
        let path = sheet_path(Path::new("output"), Path::new("input/small_img.zip"), "Chris");
        assert_eq!(path, PathBuf::from("output/small_img-Chris.png"));
    }

    #[test]
    fn test_sheet_path_sanitizes_name() {
        let path = sheet_path(Path::new("out"), Path::new("images.zip"), "Mark / Twain");
        assert_eq!(path, PathBuf::from("out/images-Mark___Twain.png"));
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/run/sheet.png");
        let sheet = RgbImage::from_pixel(510, 90, Rgb([255, 255, 255]));

        save_sheet(&sheet, &path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, sheet);
    }
}
