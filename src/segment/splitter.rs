//! Word splitter: cuts a multi-letter region into letters.
//!
//! The upright skeleton's column profile proposes split points, then each
//! segment between two points is widened until the classifier oracle
//! recognizes it (see [`super::search`]).

use anyhow::Result;
use image::GrayImage;
use image::imageops::crop_imm;
use imageproc::edges::canny;

use super::search::{search_boundary, Regime};
use super::skeleton::{column_profile, skeletonize};
use super::split_points::find_split_points;
use super::straighten::straighten;
use crate::classify::{classify_image, GlyphClassifier};
use crate::config::SplitterConfig;
use crate::letter::{Letter, RawBox};

pub struct WordSplitter<'a, C: GlyphClassifier + ?Sized> {
    classifier: &'a C,
    config: &'a SplitterConfig,
}

impl<'a, C: GlyphClassifier + ?Sized> WordSplitter<'a, C> {
    pub fn new(classifier: &'a C, config: &'a SplitterConfig) -> Self {
        Self { classifier, config }
    }

    /// Splits a word into letters in left-to-right order.
    ///
    /// Letter coordinates are relative to the word: `x` and `w` are columns
    /// of the word crop, `y` and `h` are copied from the word.
    pub fn split(&self, word: &Letter) -> Result<Vec<Letter>> {
        let mut letters = self.split_right_to_left(word)?;
        letters.reverse();
        Ok(letters)
    }

    /// Splits a word into letters in reading order, rightmost first.
    /// Every letter is at least `min_letter_width` wide and `x` strictly decreases.
    pub fn split_right_to_left(&self, word: &Letter) -> Result<Vec<Letter>> {
        let cfg = self.config;
        let width = word.image.width();
        if width == 0 || word.image.height() == 0 {
            return Ok(Vec::new());
        }

        let silhouette = straighten(&word.image, cfg);
        let profile = column_profile(&skeletonize(&silhouette));
        let points = find_split_points(&profile, cfg.min_letter_width, cfg.stroke_density_threshold);
        crate::log(&format!("Word of {} px: split points {:?}", width, points));

        let mut letters: Vec<Letter> = Vec::new();
        let mut end = width;

        for &start in &points {
            if start >= end {
                continue;
            }

            let regime = Regime::for_segment(start, end, width, cfg);
            let outcome = search_boundary(regime, start, end, width, cfg, |a, b| {
                self.confidence_of(&word.image, a, b)
            })?;

            let (left, right) = outcome.range;
            crate::log(&format!(
                "Segment [{}, {}) {} search: {} after {} steps, using extension {} ({}%)",
                start, end, regime, outcome.state, outcome.steps, outcome.extend, outcome.confidence
            ));
            end = start;

            if right - left < cfg.min_letter_width {
                crate::log(&format!(
                    "Dropping segment [{}, {}): narrower than {} px",
                    left, right, cfg.min_letter_width
                ));
                continue;
            }
            if letters.last().is_some_and(|prev| left as i32 >= prev.x) {
                continue;
            }

            let crop = self.trimmed_crop(&word.image, left, right);
            if crop.width() == 0 || crop.height() == 0 {
                continue;
            }
            letters.push(Letter::new(
                crop,
                RawBox::new(left as i32, word.y, right as i32, word.h),
            ));
        }

        Ok(letters)
    }

    /// Oracle confidence for columns `[left, right)` of the word.
    fn confidence_of(&self, word: &GrayImage, left: u32, right: u32) -> Result<u8> {
        let crop = self.trimmed_crop(word, left, right);
        if crop.width() == 0 || crop.height() == 0 {
            return Ok(0);
        }
        Ok(classify_image(self.classifier, &crop)?.confidence)
    }

    fn trimmed_crop(&self, word: &GrayImage, left: u32, right: u32) -> GrayImage {
        let right = right.min(word.width());
        let left = left.min(right);
        let crop = crop_imm(word, left, 0, right - left, word.height()).to_image();
        trim_top(&crop, self.config.trim_edge_low, self.config.trim_edge_high)
    }
}

/// Drops the rows above the first edge response, so the oracle sees the
/// glyph framed from its top stroke. Crops without edges are returned as is.
pub fn trim_top(crop: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = crop.dimensions();
    if width < 3 || height < 3 {
        return crop.clone();
    }

    let edges = canny(crop, low, high);
    let top = (0..height).find(|&y| (0..width).any(|x| edges.get_pixel(x, y)[0] > 0));

    match top {
        Some(top) if top > 0 => crop_imm(crop, 0, top, width, height - top).to_image(),
        _ => crop.clone(),
    }
}
