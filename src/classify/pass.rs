use anyhow::{anyhow, Result};

use super::{GlyphClassifier, GlyphTensor};
use crate::letter::Letter;

/// Labels every letter in place, `batch_size` glyphs per oracle call.
pub fn classify_letters<C: GlyphClassifier + ?Sized>(
    letters: &mut [Letter],
    classifier: &C,
    batch_size: usize,
) -> Result<()> {
    let batch_size = batch_size.max(1);
    let size = classifier.input_size();

    for (batch_idx, chunk) in letters.chunks_mut(batch_size).enumerate() {
        let tensors: Vec<GlyphTensor> = chunk
            .iter()
            .map(|letter| GlyphTensor::from_image(&letter.image, size))
            .collect();

        let predictions = classifier.classify_batch(&tensors)?;
        if predictions.len() != chunk.len() {
            return Err(anyhow!(
                "Classifier returned {} predictions for batch {} of {} glyphs",
                predictions.len(),
                batch_idx + 1,
                chunk.len()
            ));
        }

        for (letter, prediction) in chunk.iter_mut().zip(predictions) {
            letter.add_label(prediction.label, prediction.confidence);
        }
    }

    crate::log(&format!(
        "Classified {} letters in batches of {}",
        letters.len(),
        batch_size
    ));

    Ok(())
}
