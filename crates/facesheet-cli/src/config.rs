use anyhow::{Context, Result};
use facesheet_backends::{DetectorOptions, TesseractOptions};
use facesheet_core::painter::DEFAULT_FONT_SIZE;
use facesheet_core::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// CLI configuration: TOML file (optional), then `FACESHEET_*` environment
/// variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for sheets when no explicit `--output` is given.
    pub output_dir: PathBuf,
    pub layout: LayoutConfig,
    pub font: FontConfig,
    pub ocr: OcrConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub path: PathBuf,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// tesseract executable.
    pub program: String,
    pub language: Option<String>,
    pub page_segmentation: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// SCRFD ONNX model (insightface `det_10g.onnx`).
    pub model_path: PathBuf,
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    pub intra_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            layout: LayoutConfig::default(),
            font: FontConfig::default(),
            ocr: OcrConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fonts/FanwoodText-Regular.ttf"),
            size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        let defaults = TesseractOptions::default();
        Self {
            program: defaults.program,
            language: defaults.language,
            page_segmentation: defaults.page_segmentation,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let defaults = DetectorOptions::default();
        Self {
            model_path: PathBuf::from("models/det_10g.onnx"),
            confidence_threshold: defaults.confidence_threshold,
            nms_threshold: defaults.nms_threshold,
            intra_threads: defaults.intra_threads,
        }
    }
}

impl Config {
    /// Load from `path`, or from `$FACESHEET_CONFIG`, or defaults; then apply
    /// environment overrides and validate the layout.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("FACESHEET_CONFIG").ok().map(PathBuf::from));

        let mut config = match &path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.layout.validate().context("invalid [layout] configuration")?;

        tracing::debug!(config_file = ?path, ?config, "configuration loaded");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply `FACESHEET_*` overrides found through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("FACESHEET_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("FACESHEET_FONT_PATH") {
            self.font.path = PathBuf::from(v);
        }
        if let Some(v) = parsed(&lookup, "FACESHEET_FONT_SIZE") {
            self.font.size = v;
        }
        if let Some(v) = lookup("FACESHEET_MODEL_PATH") {
            self.detector.model_path = PathBuf::from(v);
        }
        if let Some(v) = parsed(&lookup, "FACESHEET_DETECTOR_THRESHOLD") {
            self.detector.confidence_threshold = v;
        }
        if let Some(v) = lookup("FACESHEET_TESSERACT") {
            self.ocr.program = v;
        }
        if let Some(v) = lookup("FACESHEET_OCR_LANG") {
            self.ocr.language = Some(v).filter(|l| !l.is_empty());
        }
    }

    pub fn tesseract_options(&self) -> TesseractOptions {
        TesseractOptions {
            program: self.ocr.program.clone(),
            language: self.ocr.language.clone(),
            page_segmentation: self.ocr.page_segmentation,
        }
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            confidence_threshold: self.detector.confidence_threshold,
            nms_threshold: self.detector.nms_threshold,
            intra_threads: self.detector.intra_threads,
        }
    }
}

/// Parse an override, ignoring values that don't parse.
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.font.size, 20.0);
        assert_eq!(config.ocr.program, "tesseract");
        assert_eq!(config.ocr.language.as_deref(), Some("eng"));
        assert_eq!(config.detector.confidence_threshold, 0.5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            output_dir = "sheets"

            [layout]
            canvas_width = 640

            [detector]
            model_path = "/opt/models/scrfd.onnx"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("sheets"));
        assert_eq!(config.layout.canvas_width, 640);
        assert_eq!(config.layout.thumbnail_cap, 100);
        assert_eq!(config.detector.model_path, PathBuf::from("/opt/models/scrfd.onnx"));
        assert_eq!(config.detector.nms_threshold, 0.4);
        assert_eq!(config.font, FontConfig::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facesheet.toml");
        std::fs::write(&path, "[ocr]\nlanguage = \"deu\"\npage_segmentation = 3\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.ocr.language.as_deref(), Some("deu"));
        assert_eq!(config.tesseract_options().page_segmentation, Some(3));
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[layout]\ncolumns = \"five\"\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FACESHEET_FONT_PATH", "/fonts/a.ttf"),
            ("FACESHEET_FONT_SIZE", "not-a-number"),
            ("FACESHEET_DETECTOR_THRESHOLD", "0.7"),
            ("FACESHEET_TESSERACT", "/usr/local/bin/tesseract"),
            ("FACESHEET_OCR_LANG", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.font.path, PathBuf::from("/fonts/a.ttf"));
        assert_eq!(config.font.size, 20.0);
        assert_eq!(config.detector_options().confidence_threshold, 0.7);
        assert_eq!(config.ocr.program, "/usr/local/bin/tesseract");
        assert_eq!(config.ocr.language, None);
    }
}
