//! Scroll Segmenter
//!
//! Locates individual handwritten Hebrew letters in a scanned scroll image
//! and labels each one with a character class and a confidence.
//!
//! The pipeline runs strictly downstream:
//! raw image → binarize → region detection → segmentation (with the
//! confidence-guided word splitter) → coordinate reconciliation →
//! classification.

pub mod binarize;
pub mod classify;
pub mod config;
pub mod export;
pub mod letter;
pub mod ocr;
pub mod paths;
pub mod pipeline;
pub mod segment;

pub use config::SegmenterConfig;
pub use letter::{Letter, RawBox};
pub use pipeline::Pipeline;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("scroll_segmenter.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
