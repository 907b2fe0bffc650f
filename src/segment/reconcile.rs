//! Coordinate frame conversions.
//!
//! Boxes and letters use the detector's bottom-left-origin corner convention
//! (see [`RawBox`]); image buffers are indexed from the top-left. All
//! conversion between the two, and from region-relative to page
//! coordinates, happens here and nowhere else.

use crate::letter::{Letter, RawBox};
use crate::segment::{RegionOutcome, RegionRoute};

/// A rectangle in top-left-origin pixel space, half-open on right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Converts a detector box into the pixel rectangle it covers in an image of
/// `width x height`, clamped to the image.
pub fn to_pixel_rect(b: RawBox, width: u32, height: u32) -> PixelRect {
    let clamp_x = |v: i32| v.clamp(0, width as i32) as u32;
    let clamp_y = |v: i32| v.clamp(0, height as i32) as u32;

    PixelRect {
        left: clamp_x(b.x),
        right: clamp_x(b.w),
        top: clamp_y(height as i32 - b.h),
        bottom: clamp_y(height as i32 - b.y),
    }
}

/// Inverse of [`to_pixel_rect`] for a rectangle inside an image `height` rows tall.
pub fn to_raw_box(rect: PixelRect, height: u32) -> RawBox {
    RawBox::new(
        rect.left as i32,
        height as i32 - rect.bottom as i32,
        rect.right as i32,
        height as i32 - rect.top as i32,
    )
}

/// Moves a region-relative letter into its parent's frame.
///
/// Splitting only happens along the horizontal axis, so `x` and `w` are
/// offset by the parent's left edge while `y` and `h` are the parent's.
pub fn to_parent_frame(mut letter: Letter, parent: RawBox) -> Letter {
    letter.x += parent.x;
    letter.w += parent.x;
    letter.y = parent.y;
    letter.h = parent.h;
    letter
}

/// Flattens region outcomes into page-frame letters.
///
/// Regions keep detector order; letters inside a split region stay in the
/// word splitter's left-to-right order.
pub fn reconcile(outcomes: Vec<RegionOutcome>) -> Vec<Letter> {
    let mut letters = Vec::new();
    for outcome in outcomes {
        let parent = outcome.region;
        match outcome.route {
            RegionRoute::Split => {
                letters.extend(outcome.letters.into_iter().map(|l| to_parent_frame(l, parent)));
            }
            RegionRoute::Narrow | RegionRoute::Whole { .. } => letters.extend(outcome.letters),
        }
    }
    letters
}
