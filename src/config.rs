//! Segmentation configuration loaded from a JSON file.
//!
//! Every constant of the pipeline lives here. The defaults were tuned
//! against a single Dead Sea Scroll hand at one scan resolution; a
//! different script or scale will need recalibration, most importantly
//! `splitter.min_letter_width`.
//!
//! If the config file doesn't exist or fails to parse, defaults are used.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Classes produced by the reference glyph model, in logit order.
pub const HEBREW_CLASSES: [&str; 22] = [
    "ALEF", "BET", "GIMEL", "DALET", "HE", "VAV", "ZAYIN", "HET", "TET", "YOD", "KAF", "LAMED",
    "MEM", "NUN", "SAMEKH", "AYIN", "PE", "TSADI", "QOF", "RESH", "SHIN", "TAV",
];

/// Complete segmentation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Binarizer constants
    pub binarize: BinarizeConfig,
    /// Tesseract region detector settings
    pub detector: DetectorConfig,
    /// Orchestrator and word splitter constants
    pub splitter: SplitterConfig,
    /// Classifier oracle settings
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeConfig {
    /// CLAHE clip limit (clear background branch)
    pub clahe_clip_limit: f32,
    /// CLAHE tile grid, tiles per axis (clear background branch)
    pub clahe_tile_grid: u32,
    /// Neighbourhood size for the adaptive mean threshold (varied background branch)
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean (varied background branch)
    pub adaptive_bias: i32,
    /// Median filter radius of the shared denoising step.
    /// Deliberately strong: heavy staining is removed at the cost of hairline strokes.
    pub denoise_radius: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Tesseract language pack used for box detection
    pub language: String,
    /// Explicit tesseract executable, skips discovery when set
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory, skips discovery when set
    pub tessdata_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Narrowest letter shape in the script, in pixels. Fragile to script/scale changes.
    pub min_letter_width: u32,
    /// Regions wider than this may hold more than one letter
    pub wide_region_width: u32,
    /// A wide region classified above this confidence is kept whole
    pub whole_accept_confidence: u8,
    /// Boundary search stops once a crop scores above this confidence
    pub accept_confidence: u8,
    /// Columns added per boundary search step
    pub extend_step: u32,
    /// A skeleton column with more pixels than this is a stroke-dense split candidate
    pub stroke_density_threshold: u32,
    /// Segments ending within this many columns of the right edge use the right-edge search
    pub right_edge_margin: u32,
    /// Segments starting within this many columns of column 0 use the left-edge search
    pub left_edge_margin: u32,
    /// Canny low threshold used to find the top of the ink before classification
    pub trim_edge_low: f32,
    /// Canny high threshold used to find the top of the ink before classification
    pub trim_edge_high: f32,
    /// Largest baseline rotation corrected by deskew, in degrees
    pub max_deskew_degrees: f32,
    /// Largest absolute slant corrected by unshear
    pub max_shear: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Program that evaluates the glyph model
    pub program: PathBuf,
    /// Extra arguments passed before the generated ones
    pub args: Vec<String>,
    /// Model weights handed to the program
    pub model: PathBuf,
    /// Side of the square canvas the model expects
    pub input_size: u32,
    /// Glyphs per call in the final labeling pass
    pub batch_size: usize,
    /// Class names in logit order
    pub classes: Vec<String>,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 1.0,
            clahe_tile_grid: 80,
            adaptive_block_size: 39,
            adaptive_bias: 15,
            denoise_radius: 2,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            language: "heb".to_string(),
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            min_letter_width: 12,
            wide_region_width: 30,
            whole_accept_confidence: 90,
            accept_confidence: 60,
            extend_step: 2,
            stroke_density_threshold: 5,
            right_edge_margin: 5,
            left_edge_margin: 4,
            trim_edge_low: 20.0,
            trim_edge_high: 60.0,
            max_deskew_degrees: 15.0,
            max_shear: 1.0,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("glyph-classifier"),
            args: Vec::new(),
            model: PathBuf::from("models/default.model"),
            input_size: 100,
            batch_size: 64,
            classes: HEBREW_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl BinarizeConfig {
    /// Adaptive block size forced to an odd value of at least 3.
    pub fn odd_block_size(&self) -> u32 {
        let size = self.adaptive_block_size.max(3);
        if size % 2 == 0 { size + 1 } else { size }
    }
}

impl SegmenterConfig {
    /// Load config from file, or return defaults if file doesn't exist.
    pub fn load(config_path: &Path) -> Self {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => {
                        crate::log(&format!("Loaded config from {}", config_path.display()));
                        return config;
                    }
                    Err(e) => {
                        crate::log(&format!("Failed to parse config: {}. Using defaults.", e));
                    }
                },
                Err(e) => {
                    crate::log(&format!("Failed to read config: {}. Using defaults.", e));
                }
            }
        } else {
            crate::log(&format!(
                "{} not found. Using default config.",
                config_path.display()
            ));
        }
        Self::default()
    }

    /// Save default config to file (for reference).
    pub fn save_default(config_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        fs::write(config_path, json)
            .context(format!("Failed to write config: {}", config_path.display()))?;
        Ok(())
    }
}
