use anyhow::Result;

use super::splitter::WordSplitter;
use super::{RegionOutcome, RegionRoute};
use crate::classify::{classify_image, GlyphClassifier};
use crate::config::SplitterConfig;
use crate::letter::Letter;

/// Decides per region whether it is one glyph or a word to split.
///
/// Narrow regions are single letters. Wide ones are first shown to the
/// oracle whole, so wide single letters are not over-split; only when the
/// oracle isn't confident does the word splitter run. Letters without area
/// are dropped. Split letters keep word-relative coordinates until
/// [`super::reconcile`].
pub fn segment_regions<C: GlyphClassifier + ?Sized>(
    regions: Vec<Letter>,
    classifier: &C,
    config: &SplitterConfig,
) -> Result<Vec<RegionOutcome>> {
    let splitter = WordSplitter::new(classifier, config);
    let mut outcomes = Vec::with_capacity(regions.len());

    for region in regions {
        if !region.has_area() {
            continue;
        }
        let bounds = region.bounds();

        if region.image.width() <= config.wide_region_width {
            outcomes.push(RegionOutcome {
                region: bounds,
                route: RegionRoute::Narrow,
                letters: vec![region],
            });
            continue;
        }

        let whole = classify_image(classifier, &region.image)?;
        if whole.confidence > config.whole_accept_confidence {
            outcomes.push(RegionOutcome {
                region: bounds,
                route: RegionRoute::Whole { confidence: whole.confidence },
                letters: vec![region],
            });
            continue;
        }

        let letters: Vec<Letter> = splitter
            .split(&region)?
            .into_iter()
            .filter(Letter::has_area)
            .collect();

        crate::log(&format!(
            "Region x={}..{} ({} px, whole {}%) split into {} letters",
            bounds.x,
            bounds.w,
            region.image.width(),
            whole.confidence,
            letters.len()
        ));

        outcomes.push(RegionOutcome {
            region: bounds,
            route: RegionRoute::Split,
            letters,
        });
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{GlyphTensor, Prediction};
    use crate::letter::RawBox;
    use image::{GrayImage, ImageBuffer, Luma};
    use std::cell::Cell;

    /// Fixed confidence for every call, counting calls.
    struct CountingOracle {
        confidence: u8,
        calls: Cell<usize>,
    }

    impl CountingOracle {
        fn new(confidence: u8) -> Self {
            Self { confidence, calls: Cell::new(0) }
        }
    }

    impl GlyphClassifier for CountingOracle {
        fn input_size(&self) -> u32 {
            64
        }

        fn classify(&self, _glyph: &GlyphTensor) -> Result<Prediction> {
            self.calls.set(self.calls.get() + 1);
            Ok(Prediction::new("MEM", self.confidence))
        }
    }

    fn region(x: i32, width: u32) -> Letter {
        let image: GrayImage = ImageBuffer::from_fn(width, 30, |cx, cy| {
            Luma([if (5..25).contains(&cy) && cx > 2 && cx + 3 < width { 0 } else { 255 }])
        });
        Letter::new(image, RawBox::new(x, 10, x + width as i32, 40))
    }

    #[test]
    fn test_narrow_region_skips_oracle() {
        let oracle = CountingOracle::new(10);
        let outcomes = segment_regions(vec![region(0, 30)], &oracle, &SplitterConfig::default()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].route, RegionRoute::Narrow);
        assert_eq!(oracle.calls.get(), 0);
    }

    #[test]
    fn test_confident_wide_region_kept_whole() {
        let oracle = CountingOracle::new(91);
        let outcomes = segment_regions(vec![region(0, 60)], &oracle, &SplitterConfig::default()).unwrap();

        assert_eq!(outcomes[0].route, RegionRoute::Whole { confidence: 91 });
        assert_eq!(outcomes[0].letters.len(), 1);
        assert_eq!(oracle.calls.get(), 1);
    }

    #[test]
    fn test_unsure_wide_region_is_split() {
        // 90 is not above the whole-word threshold but clears the search one
        let oracle = CountingOracle::new(90);
        let outcomes = segment_regions(vec![region(100, 60)], &oracle, &SplitterConfig::default()).unwrap();

        assert_eq!(outcomes[0].route, RegionRoute::Split);
        assert_eq!(outcomes[0].region, RawBox::new(100, 10, 160, 40));
        assert!(!outcomes[0].letters.is_empty());
        // Word-relative until reconciled
        assert!(outcomes[0].letters.iter().all(|l| l.w <= 60));
    }

    #[test]
    fn test_empty_regions_dropped() {
        let oracle = CountingOracle::new(95);
        let empty = Letter::new(GrayImage::new(0, 0), RawBox::new(0, 0, 0, 0));
        let outcomes = segment_regions(vec![empty], &oracle, &SplitterConfig::default()).unwrap();
        assert!(outcomes.is_empty());
    }
}
