//! Tesseract integration: the external region detector.

pub mod engine;
pub mod setup;

pub use engine::{parse_box_output, TesseractDetector};
pub use setup::{ensure_tesseract, TesseractPaths};
