//! End-to-end segmentation pipeline.
//!
//! raw image → binarize → detect regions → orchestrate (split wide words)
//! → reconcile coordinates → classify

use anyhow::Result;
use image::{DynamicImage, GrayImage};

use crate::binarize::binarize;
use crate::classify::{classify_letters, GlyphClassifier};
use crate::config::SegmenterConfig;
use crate::letter::Letter;
use crate::segment::{extract_regions, reconcile, segment_regions, RegionDetector};

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Binary mask the letters were cut from
    pub mask: GrayImage,
    /// Letters in page coordinates
    pub letters: Vec<Letter>,
}

/// Owns the configuration and both external collaborators.
pub struct Pipeline<D, C> {
    config: SegmenterConfig,
    detector: D,
    classifier: C,
}

impl<D: RegionDetector, C: GlyphClassifier> Pipeline<D, C> {
    pub fn new(config: SegmenterConfig, detector: D, classifier: C) -> Self {
        Self {
            config,
            detector,
            classifier,
        }
    }

    /// Binarizes, segments and labels a scroll image.
    pub fn run(&self, image: &DynamicImage, varied_background: bool) -> Result<PipelineOutput> {
        let mut output = self.run_unlabeled(image, varied_background)?;
        self.classify(&mut output.letters)?;
        Ok(output)
    }

    /// Same as [`Pipeline::run`] without the final classification pass.
    pub fn run_unlabeled(&self, image: &DynamicImage, varied_background: bool) -> Result<PipelineOutput> {
        let mask = binarize(image, varied_background, &self.config.binarize)?;
        let letters = self.segment(&mask)?;
        Ok(PipelineOutput { mask, letters })
    }

    /// Cuts a binary mask into letters in page coordinates.
    ///
    /// Regions come in detector order; letters of a split word are left to right.
    /// A mask with no regions gives an empty list.
    pub fn segment(&self, mask: &GrayImage) -> Result<Vec<Letter>> {
        let regions = extract_regions(mask, &self.detector)?;
        if regions.is_empty() {
            crate::log("No regions detected");
            return Ok(Vec::new());
        }

        let outcomes = segment_regions(regions, &self.classifier, &self.config.splitter)?;
        let letters = reconcile(outcomes);
        crate::log(&format!("Segmented {} letters", letters.len()));
        Ok(letters)
    }

    /// Labels letters in place, batched.
    pub fn classify(&self, letters: &mut [Letter]) -> Result<()> {
        if letters.is_empty() {
            return Ok(());
        }
        classify_letters(letters, &self.classifier, self.config.classifier.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{GlyphTensor, Prediction};
    use crate::letter::RawBox;
    use image::{ImageBuffer, Luma};

    struct NoBoxes;

    impl RegionDetector for NoBoxes {
        fn detect(&self, _mask: &GrayImage) -> Result<Vec<RawBox>> {
            Ok(Vec::new())
        }
    }

    struct Panicky;

    impl GlyphClassifier for Panicky {
        fn input_size(&self) -> u32 {
            16
        }

        fn classify(&self, _glyph: &GlyphTensor) -> Result<Prediction> {
            panic!("oracle must not be called without regions");
        }
    }

    #[test]
    fn test_blank_image_yields_no_letters() {
        let image = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(64, 48, Luma([230])));
        let pipeline = Pipeline::new(SegmenterConfig::default(), NoBoxes, Panicky);
        let output = pipeline.run(&image, true).unwrap();
        assert!(output.letters.is_empty());
        assert_eq!(output.mask.dimensions(), (64, 48));
    }

    #[test]
    fn test_empty_image_fails() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let pipeline = Pipeline::new(SegmenterConfig::default(), NoBoxes, Panicky);
        assert!(pipeline.run(&image, false).is_err());
    }
}
