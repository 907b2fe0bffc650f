//! The classifier oracle seam and the final classification pass.
//!
//! The same oracle is consulted in two ways: single-glyph calls gate the
//! word splitter's boundary search (never batched, each step needs its
//! answer), and batched calls label the final letters.

pub mod command;
pub mod pass;
pub mod tensor;

pub use command::CommandClassifier;
pub use pass::classify_letters;
pub use tensor::GlyphTensor;

use anyhow::{anyhow, Result};
use image::GrayImage;

/// A class label with a truncated 0-100 confidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub label: String,
    pub confidence: u8,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: u8) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.min(100),
        }
    }

    /// Softmax over raw model outputs, then the most probable class with its
    /// probability truncated to a whole percentage.
    pub fn from_logits(logits: &[f32], classes: &[String]) -> Result<Self> {
        if logits.is_empty() {
            return Err(anyhow!("Classifier returned no logits"));
        }
        if logits.len() != classes.len() {
            return Err(anyhow!(
                "Classifier returned {} logits for {} classes",
                logits.len(),
                classes.len()
            ));
        }

        let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exps.iter().sum();

        let (best, best_exp) = exps
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, &e)| if e > acc.1 { (i, e) } else { acc });

        let probability = best_exp / total;
        let confidence = (probability * 100.0).trunc().clamp(0.0, 100.0) as u8;

        Ok(Self::new(classes[best].clone(), confidence))
    }
}

/// The trained glyph classifier, treated as an external oracle.
pub trait GlyphClassifier {
    /// Side of the square canvas the model expects.
    fn input_size(&self) -> u32;

    /// Classifies one prepared glyph.
    fn classify(&self, glyph: &GlyphTensor) -> Result<Prediction>;

    /// Classifies a batch, one prediction per input in input order.
    fn classify_batch(&self, glyphs: &[GlyphTensor]) -> Result<Vec<Prediction>> {
        glyphs.iter().map(|g| self.classify(g)).collect()
    }
}

/// Prepares a raw crop and asks the oracle about it.
pub fn classify_image<C: GlyphClassifier + ?Sized>(classifier: &C, glyph: &GrayImage) -> Result<Prediction> {
    let tensor = GlyphTensor::from_image(glyph, classifier.input_size());
    classifier.classify(&tensor)
}
