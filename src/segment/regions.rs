use anyhow::Result;
use image::GrayImage;
use image::imageops::crop_imm;

use super::RegionDetector;
use super::reconcile::{to_pixel_rect, to_raw_box};
use crate::letter::{Letter, RawBox};

/// Runs the region detector on the mask and crops one letter per usable box.
///
/// Letters keep the detector's box as their coordinates.
pub fn extract_regions<D: RegionDetector + ?Sized>(mask: &GrayImage, detector: &D) -> Result<Vec<Letter>> {
    let boxes = detector.detect(mask)?;
    let total = boxes.len();

    let letters: Vec<Letter> = boxes
        .into_iter()
        .filter_map(|b| crop_box(mask, b))
        .collect();

    crate::log(&format!(
        "Region detector returned {} boxes, kept {}",
        total,
        letters.len()
    ));

    Ok(letters)
}

/// Crops a single box out of the mask, or `None` if the crop is degenerate.
///
/// The letter carries the box clipped to the mask, so its coordinates
/// describe exactly the pixels it holds.
pub fn crop_box(mask: &GrayImage, b: RawBox) -> Option<Letter> {
    let rect = to_pixel_rect(b, mask.width(), mask.height());
    let (w_box, h_box) = (rect.width(), rect.height());

    if w_box == 0 || h_box == 0 || !passes_area_ratio(w_box, h_box) {
        return None;
    }

    let crop = crop_imm(mask, rect.left, rect.top, w_box, h_box).to_image();
    Some(Letter::new(crop, to_raw_box(rect, mask.height())))
}

/// Outlier filter on crop size: both sides must exceed `100 / height`.
///
/// The units don't cancel, so this is a heuristic rather than a true area
/// ratio; it only ever rejects extreme slivers and is kept exactly as tuned.
pub fn passes_area_ratio(width: u32, height: u32) -> bool {
    let limit = 1.0 / height as f64 * 100.0;
    height as f64 > limit && width as f64 > limit
}
