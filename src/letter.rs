//! Letter records and the region box convention shared with the detector.

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// A box as reported by the region detector.
///
/// The frame has its origin in the bottom-left corner of the full image and
/// the four values are two corners, not an origin plus a size:
/// - `x`: distance from the left frame to the left side of the box
/// - `y`: distance from the bottom frame to the bottom of the box
/// - `w`: distance from the left frame to the right side of the box
/// - `h`: distance from the bottom frame to the top of the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl RawBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// One located glyph.
///
/// Created by the region extractor or the word splitter, labeled in place by
/// the classification pass and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Letter {
    /// Cropped glyph, ink black on white
    pub image: GrayImage,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub label: Option<String>,
    /// Truncated percentage, 0-100
    pub confidence: Option<u8>,
}

impl Letter {
    pub fn new(image: GrayImage, bounds: RawBox) -> Self {
        Self {
            image,
            x: bounds.x,
            y: bounds.y,
            w: bounds.w,
            h: bounds.h,
            label: None,
            confidence: None,
        }
    }

    pub fn bounds(&self) -> RawBox {
        RawBox::new(self.x, self.y, self.w, self.h)
    }

    pub fn add_label(&mut self, label: String, confidence: u8) {
        self.label = Some(label);
        self.confidence = Some(confidence);
    }

    /// True when the crop has positive width and height.
    pub fn has_area(&self) -> bool {
        self.image.width() > 0 && self.image.height() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_label() {
        let mut letter = Letter::new(GrayImage::new(3, 4), RawBox::new(1, 2, 4, 6));
        assert!(letter.label.is_none());
        assert!(letter.has_area());

        letter.add_label("ALEF".to_string(), 87);
        assert_eq!(letter.label.as_deref(), Some("ALEF"));
        assert_eq!(letter.confidence, Some(87));
        assert_eq!(letter.bounds(), RawBox::new(1, 2, 4, 6));
    }

    #[test]
    fn test_empty_crop_has_no_area() {
        let letter = Letter::new(GrayImage::new(0, 7), RawBox::new(0, 0, 0, 7));
        assert!(!letter.has_area());
    }
}
