//! Letter segmentation: region extraction, the word splitter and the
//! coordinate reconciler.

pub mod orchestrator;
pub mod reconcile;
pub mod regions;
pub mod search;
pub mod skeleton;
pub mod split_points;
pub mod splitter;
pub mod straighten;

pub use orchestrator::segment_regions;
pub use reconcile::{reconcile, to_parent_frame, to_pixel_rect, to_raw_box, PixelRect};
pub use regions::extract_regions;
pub use search::{search_boundary, Regime, SearchOutcome, SearchState};
pub use split_points::find_split_points;
pub use splitter::WordSplitter;

use anyhow::Result;
use image::GrayImage;

use crate::letter::{Letter, RawBox};

/// External detector of coarse word and letter boxes on a binary mask.
///
/// Boxes use the bottom-left-origin corner convention of [`RawBox`].
pub trait RegionDetector {
    fn detect(&self, mask: &GrayImage) -> Result<Vec<RawBox>>;
}

/// How the orchestrator handled a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRoute {
    /// At most `wide_region_width` columns, kept as one letter
    Narrow,
    /// Wide, but the oracle recognized it as a single letter
    Whole { confidence: u8 },
    /// Cut by the word splitter
    Split,
}

/// One region's letters before reconciliation.
#[derive(Debug, Clone)]
pub struct RegionOutcome {
    /// Detector box of the region, page frame
    pub region: RawBox,
    pub route: RegionRoute,
    /// Page frame for `Narrow` and `Whole`, region-relative for `Split`
    pub letters: Vec<Letter>,
}
