//! Writes a segmentation run to disk: the mask, one PNG per letter crop and
//! a `letters.json` index.

use anyhow::{Context, Result};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::letter::Letter;

/// One entry of `letters.json`, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterRecord {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub label: Option<String>,
    pub confidence: Option<u8>,
    /// Crop file name, relative to the run directory
    pub file: String,
}

impl LetterRecord {
    pub fn from_letter(index: usize, letter: &Letter) -> Self {
        Self {
            index,
            x: letter.x,
            y: letter.y,
            w: letter.w,
            h: letter.h,
            label: letter.label.clone(),
            confidence: letter.confidence,
            file: crop_file_name(index),
        }
    }
}

pub fn crop_file_name(index: usize) -> String {
    format!("letter_{:04}.png", index)
}

/// Exports a run into `output_dir`, creating it if needed.
pub fn export_run(output_dir: &Path, mask: &GrayImage, letters: &[Letter]) -> Result<Vec<LetterRecord>> {
    fs::create_dir_all(output_dir)
        .context(format!("Failed to create output directory: {}", output_dir.display()))?;

    let mask_path = output_dir.join("mask.png");
    mask.save(&mask_path)
        .context(format!("Failed to save mask: {}", mask_path.display()))?;

    let mut records = Vec::with_capacity(letters.len());
    for (index, letter) in letters.iter().enumerate() {
        let record = LetterRecord::from_letter(index, letter);
        let crop_path = output_dir.join(&record.file);
        letter
            .image
            .save(&crop_path)
            .context(format!("Failed to save letter crop: {}", crop_path.display()))?;
        records.push(record);
    }

    write_records(&records, &output_dir.join("letters.json"))?;

    crate::log(&format!(
        "Exported {} letters to {}",
        records.len(),
        output_dir.display()
    ));

    Ok(records)
}

/// Writes the letter index as pretty JSON.
pub fn write_records(records: &[LetterRecord], output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(records).context("Failed to serialize letters to JSON")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}
