//! Unshear and deskew of a word crop.
//!
//! Produces an upright ink-white silhouette whose columns line up with the
//! input crop, so the column profile can be mapped straight back onto it.
//!
//! Slant and baseline tilt are estimated separately. The slant comes from a
//! shear search that packs the ink into as few columns as possible; the tilt
//! comes from a line fitted through the bottom of the ink once strokes are
//! upright. A principal-axis rotation would confuse the two.

use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{rotate_about_center, warp, Interpolation, Projection};

use crate::binarize::{invert, otsu_binarize, threshold_above};
use crate::config::SplitterConfig;

/// Resolution of the shear search.
const SHEAR_STEP: f32 = 0.05;

/// A shear must save at least this fraction of the inked columns to be applied.
const MIN_SHEAR_GAIN: f64 = 0.1;

/// Baseline tilts below this are noise from interpolated stroke ends.
const MIN_DESKEW_DEGREES: f32 = 1.0;

/// Binary silhouette of a word crop, ink white: unsheared, deskewed and
/// re-binarized.
pub fn straighten(word: &GrayImage, config: &SplitterConfig) -> GrayImage {
    // Ink is dark in the mask: pixels at or below 127 become foreground
    let ink = invert(&threshold_above(word, 127));
    let unsheared = unshear(&ink, config.max_shear);
    let deskewed = deskew(&unsheared, config.max_deskew_degrees);
    rebinarize(&deskewed)
}

/// Foreground pixel coordinates and their mean row.
fn ink_pixels(ink: &GrayImage) -> (Vec<(f32, f32)>, f32) {
    let pixels: Vec<(f32, f32)> = ink
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 127)
        .map(|(x, y, _)| (x as f32, y as f32))
        .collect();
    let cy = if pixels.is_empty() {
        0.0
    } else {
        pixels.iter().map(|p| p.1).sum::<f32>() / pixels.len() as f32
    };
    (pixels, cy)
}

/// Number of distinct columns the ink covers after `x' = x - slant * (y - cy)`.
fn sheared_columns(pixels: &[(f32, f32)], cy: f32, slant: f32) -> usize {
    pixels
        .iter()
        .map(|&(x, y)| (x - slant * (y - cy)).round() as i64)
        .collect::<HashSet<_>>()
        .len()
}

/// Horizontal drift per row of the word's strokes, within `±max_shear`.
///
/// Picks the shear that leaves the fewest inked columns. Returns 0 unless
/// the best shear beats the unsheared crop by a clear margin, so upright
/// and horizontal strokes are left alone.
pub fn estimate_slant(ink: &GrayImage, max_shear: f32) -> f32 {
    let (pixels, cy) = ink_pixels(ink);
    if pixels.is_empty() || max_shear <= 0.0 {
        return 0.0;
    }

    let upright = sheared_columns(&pixels, cy, 0.0);
    let mut best = (upright, 0.0f32);

    let steps = (max_shear / SHEAR_STEP).round() as i32;
    for k in 1..=steps {
        let magnitude = (k as f32 * SHEAR_STEP).min(max_shear);
        for slant in [magnitude, -magnitude] {
            let columns = sheared_columns(&pixels, cy, slant);
            if columns < best.0 {
                best = (columns, slant);
            }
        }
    }

    let saved = (upright - best.0) as f64 / upright as f64;
    if saved < MIN_SHEAR_GAIN { 0.0 } else { best.1 }
}

/// Shears rows horizontally so slanted strokes become upright:
/// `x' = x - slant * (y - cy)`.
pub fn unshear(ink: &GrayImage, max_shear: f32) -> GrayImage {
    let slant = estimate_slant(ink, max_shear);
    if slant == 0.0 {
        return ink.clone();
    }

    let (_, cy) = ink_pixels(ink);
    let matrix = [1.0, -slant, slant * cy, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    match Projection::from_matrix(matrix) {
        Some(projection) => warp(ink, &projection, Interpolation::Bilinear, Luma([0])),
        None => ink.clone(),
    }
}

/// Tilt of the baseline in radians, clockwise from +x (y points down).
///
/// Least-squares line through the lowest ink pixel of every inked column.
pub fn baseline_angle(ink: &GrayImage) -> Option<f32> {
    let bottoms: Vec<(f64, f64)> = (0..ink.width())
        .filter_map(|x| {
            (0..ink.height())
                .rev()
                .find(|&y| ink.get_pixel(x, y)[0] > 127)
                .map(|y| (x as f64, y as f64))
        })
        .collect();
    if bottoms.len() < 2 {
        return None;
    }

    let n = bottoms.len() as f64;
    let mx = bottoms.iter().map(|b| b.0).sum::<f64>() / n;
    let my = bottoms.iter().map(|b| b.1).sum::<f64>() / n;
    let (mut sxx, mut sxy) = (0.0, 0.0);
    for &(x, y) in &bottoms {
        sxx += (x - mx) * (x - mx);
        sxy += (x - mx) * (y - my);
    }
    if sxx < 1e-9 {
        return None;
    }

    Some((sxy / sxx).atan() as f32)
}

/// Rotates the silhouette so its baseline is horizontal.
/// Tilts larger than `max_degrees` are not baselines and are left alone.
pub fn deskew(ink: &GrayImage, max_degrees: f32) -> GrayImage {
    let Some(angle) = baseline_angle(ink) else {
        return ink.clone();
    };

    let degrees = angle.to_degrees().abs();
    if degrees < MIN_DESKEW_DEGREES || degrees > max_degrees {
        return ink.clone();
    }

    rotate_about_center(ink, -angle, Interpolation::Bilinear, Luma([0]))
}

/// Otsu re-threshold after interpolation. Uniform images are already binary.
fn rebinarize(img: &GrayImage) -> GrayImage {
    let first = img.pixels().next().map(|p| p[0]);
    if img.pixels().all(|p| Some(p[0]) == first) {
        return threshold_above(img, 127);
    }
    otsu_binarize(img)
}
