use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facesheet_backends::{ScrfdLocator, TesseractRecognizer, ZipArchiveSource};
use facesheet_core::pipeline::{self, PipelineError};
use facesheet_core::{FontPainter, LayoutError, RecognizedText, SearchSummary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::Config;

#[derive(Parser)]
#[command(name = "facesheet", about = "Find faces in archived images whose text mentions a name")]
struct Cli {
    /// TOML configuration file (default: $FACESHEET_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a contact sheet of faces for each name
    Search {
        /// Zip archive of images
        archive: PathBuf,
        /// Name to look for in the recognized text (case-sensitive); repeatable
        #[arg(short, long = "name", required = true)]
        names: Vec<String>,
        /// Output file (single name only)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,
        /// Directory for `<archive>-<name>.png` sheets
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Open each sheet in the default image viewer
        #[arg(long)]
        show: bool,
        /// Label font (TrueType/OpenType)
        #[arg(long)]
        font: Option<PathBuf>,
        /// SCRFD ONNX model
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Print the recognized text of every archive entry as JSON
    Text {
        /// Zip archive of images
        archive: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            archive,
            names,
            output,
            output_dir,
            show,
            font,
            model,
        } => {
            if output.is_some() && names.len() > 1 {
                bail!("--output takes a single --name; use --output-dir for several names");
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(font) = font {
                config.font.path = font;
            }
            if let Some(model) = model {
                config.detector.model_path = model;
            }
            run_search(&config, &archive, &names, output.as_deref(), show)
        }
        Commands::Text { archive } => run_text(&config, &archive),
    }
}

/// OCR the archive once, then build and save one sheet per name.
fn run_search(
    config: &Config,
    archive: &Path,
    names: &[String],
    output: Option<&Path>,
    show: bool,
) -> Result<()> {
    // Load everything that can fail before the slow OCR pass.
    let painter = FontPainter::load(&config.font.path, config.font.size)
        .context("loading label font (set --font or FACESHEET_FONT_PATH)")?;
    let mut locator = ScrfdLocator::load(&config.detector.model_path, config.detector_options())
        .context("loading face detector (set --model or FACESHEET_MODEL_PATH)")?;
    let recognizer = TesseractRecognizer::new(config.tesseract_options())?;

    let records = pipeline::recognize_archive(&ZipArchiveSource::new(), archive, &recognizer)?;
    // Scratch directory goes away here.
    drop(recognizer);

    for name in names {
        let matches =
            pipeline::search_faces(&records, name, &mut locator, config.layout.thumbnail_cap)?;
        let summary = SearchSummary::from_matches(&matches);

        let sheet = match pipeline::render_sheet(&matches, &config.layout, &painter) {
            Ok(sheet) => sheet,
            Err(PipelineError::Layout(LayoutError::EmptySheet)) => {
                tracing::warn!(name = %name, "no entry mentions this name; no sheet written");
                println!("{name}: 0 of {} files mention the name", summary.records);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output::sheet_path(&config.output_dir, archive, name));
        output::save_sheet(&sheet, &path)?;
        println!(
            "{name}: {} of {} files, {} faces -> {}",
            summary.matched,
            summary.records,
            summary.faces,
            path.display()
        );

        if show {
            if let Err(e) = output::show(&path) {
                tracing::warn!(error = %e, "could not open viewer");
            }
        }
    }

    Ok(())
}

/// Dump OCR output for every entry.
fn run_text(config: &Config, archive: &Path) -> Result<()> {
    let recognizer = TesseractRecognizer::new(config.tesseract_options())?;
    let records = pipeline::recognize_archive(&ZipArchiveSource::new(), archive, &recognizer)?;

    let texts: Vec<RecognizedText> = records.iter().map(RecognizedText::from).collect();
    println!("{}", serde_json::to_string_pretty(&texts)?);
    Ok(())
}
