//! Scroll Segmenter
//!
//! Command line front end: segments a scroll image into labeled letter crops.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use scroll_segmenter::binarize::binarize;
use scroll_segmenter::classify::CommandClassifier;
use scroll_segmenter::export::export_run;
use scroll_segmenter::ocr::{ensure_tesseract, TesseractDetector};
use scroll_segmenter::{log, paths, Pipeline, SegmenterConfig};

#[derive(Parser, Debug)]
#[command(name = "scroll-segmenter")]
#[command(version, about = "Letter segmentation and classification for scanned Hebrew scrolls", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Segment a scroll image into letters and export them
    Segment {
        /// Input scroll image
        image: PathBuf,

        /// Use the adaptive threshold branch for stained or uneven parchment
        #[arg(short, long)]
        varied_background: bool,

        /// Config file (default: <exe_dir>/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (default: <exe_dir>/segmentations/<timestamp>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the final labeling pass
        #[arg(long)]
        skip_classify: bool,
    },

    /// Write the binary mask only
    Binarize {
        /// Input scroll image
        image: PathBuf,

        /// Use the adaptive threshold branch for stained or uneven parchment
        #[arg(short, long)]
        varied_background: bool,

        /// Config file (default: <exe_dir>/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output PNG (default: <input_name>_mask.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Locate Tesseract and download the language data if missing
    Setup {
        /// Config file (default: <exe_dir>/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the default configuration
    InitConfig {
        /// Destination JSON file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    paths::ensure_directories()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment {
            image,
            varied_background,
            config,
            output,
            skip_classify,
        } => run_segment(&image, varied_background, config, output, skip_classify),
        Commands::Binarize {
            image,
            varied_background,
            config,
            output,
        } => run_binarize(&image, varied_background, config, output),
        Commands::Setup { config } => {
            let config = load_config(config);
            let paths = ensure_tesseract(&config.detector)?;
            println!("Tesseract: {}", paths.executable.display());
            println!("Tessdata:  {}", paths.tessdata.display());
            Ok(())
        }
        Commands::InitConfig { path } => {
            SegmenterConfig::save_default(&path)?;
            println!("Default config written to {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> SegmenterConfig {
    let path = path.unwrap_or_else(|| paths::get_exe_dir().join("config.json"));
    SegmenterConfig::load(&path)
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    if !path.is_file() {
        anyhow::bail!("Input image does not exist: {}", path.display());
    }
    image::open(path).context(format!("Failed to open image: {}", path.display()))
}

fn run_segment(
    input: &Path,
    varied_background: bool,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    skip_classify: bool,
) -> Result<()> {
    let config = load_config(config);
    let image = open_image(input)?;

    // Both collaborators are required up front, the splitter needs the oracle
    let detector = TesseractDetector::new(&config.detector)?;
    let classifier = CommandClassifier::new(&config.classifier)?;
    let pipeline = Pipeline::new(config, detector, classifier);

    log(&format!(
        "Segmenting {} ({}x{})",
        input.display(),
        image.width(),
        image.height()
    ));

    let result = if skip_classify {
        pipeline.run_unlabeled(&image, varied_background)?
    } else {
        pipeline.run(&image, varied_background)?
    };

    let output_dir = output.unwrap_or_else(paths::new_run_dir);
    let records = export_run(&output_dir, &result.mask, &result.letters)?;

    for record in &records {
        match (&record.label, record.confidence) {
            (Some(label), Some(confidence)) => println!(
                "{:>4}  x={}..{} y={}..{}  {} ({}%)",
                record.index, record.x, record.w, record.y, record.h, label, confidence
            ),
            _ => println!(
                "{:>4}  x={}..{} y={}..{}",
                record.index, record.x, record.w, record.y, record.h
            ),
        }
    }
    println!("{} letters written to {}", records.len(), output_dir.display());

    Ok(())
}

fn run_binarize(
    input: &Path,
    varied_background: bool,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config);
    let image = open_image(input)?;
    let mask = binarize(&image, varied_background, &config.binarize)?;

    let output = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "scroll".to_string());
        input.with_file_name(format!("{}_mask.png", stem))
    });

    mask.save(&output)
        .context(format!("Failed to save mask: {}", output.display()))?;
    log(&format!("Mask written to {}", output.display()));

    Ok(())
}
