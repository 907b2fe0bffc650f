use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use regex::Regex;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{ensure_tesseract, TesseractPaths};
use crate::config::DetectorConfig;
use crate::letter::RawBox;
use crate::log;
use crate::segment::RegionDetector;

/// One line of Tesseract's box file: `<glyph> <left> <bottom> <right> <top> <page>`.
/// Coordinates are measured from the bottom-left corner of the page.
const BOX_LINE_PATTERN: &str = r"^(\S+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(\d+)$";

/// Region detector backed by the Tesseract `makebox` output.
pub struct TesseractDetector {
    paths: TesseractPaths,
    language: String,
}

impl TesseractDetector {
    /// Locates Tesseract and the language pack, downloading the pack if needed.
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        let paths = ensure_tesseract(config)?;
        Ok(Self::with_paths(paths, &config.language))
    }

    pub fn with_paths(paths: TesseractPaths, language: &str) -> Self {
        Self {
            paths,
            language: language.to_string(),
        }
    }
}

impl RegionDetector for TesseractDetector {
    fn detect(&self, mask: &GrayImage) -> Result<Vec<RawBox>> {
        // Save mask to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        mask.save(temp_input.path())
            .context("Failed to write mask for Tesseract")?;

        // Tesseract appends .box to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let output = Command::new(&self.paths.executable)
            .arg(temp_input.path())
            .arg(&output_base)
            .arg("--tessdata-dir")
            .arg(&self.paths.tessdata)
            .arg("-l")
            .arg(&self.language)
            .arg("makebox")
            .output()
            .context("Failed to launch Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let box_path = format!("{}.box", output_base);
        let content = std::fs::read_to_string(&box_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;

        let _ = std::fs::remove_file(&box_path);

        parse_box_output(&content)
    }
}

/// Parses a Tesseract box file into raw boxes, in file order.
///
/// Malformed lines are logged and skipped.
pub fn parse_box_output(content: &str) -> Result<Vec<RawBox>> {
    let line_regex = Regex::new(BOX_LINE_PATTERN)?;
    let mut boxes = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(caps) = line_regex.captures(line) else {
            log(&format!(
                "Warning: Skipping malformed box line {}: {:?}",
                line_num + 1,
                line
            ));
            continue;
        };

        let coord = |i: usize| caps[i].parse::<i32>();
        match (coord(2), coord(3), coord(4), coord(5)) {
            (Ok(x), Ok(y), Ok(w), Ok(h)) => boxes.push(RawBox::new(x, y, w, h)),
            _ => log(&format!(
                "Warning: Box line {} has out-of-range coordinates",
                line_num + 1
            )),
        }
    }

    Ok(boxes)
}
