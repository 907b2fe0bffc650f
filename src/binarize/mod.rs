//! Background-aware binarization of raw scroll images.
//!
//! Two branches, picked by the caller:
//! - clear background: CLAHE → Otsu → closing → denoise
//! - varied background: adaptive mean threshold → opening → closing → denoise
//!
//! Both produce a single-channel mask of the input's size with ink black
//! (0) and parchment white (255).

pub mod clahe;
pub mod morphology;
pub mod threshold;

pub use morphology::{close_ink, denoise, invert, open_ink};
pub use threshold::{adaptive_mean_threshold, otsu_binarize, threshold_above};

use anyhow::{anyhow, Result};
use image::{DynamicImage, GrayImage};

use crate::config::BinarizeConfig;

/// Converts a raw scroll image into a binary ink mask.
///
/// Fails only on an empty input.
pub fn binarize(
    image: &DynamicImage,
    varied_background: bool,
    config: &BinarizeConfig,
) -> Result<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(anyhow!(
            "Cannot binarize an empty image ({}x{})",
            image.width(),
            image.height()
        ));
    }

    let gray = image.to_luma8();

    let mask = if varied_background {
        crate::log(&format!(
            "Binarizing {}x{} (varied background, block {}, bias {})",
            gray.width(),
            gray.height(),
            config.odd_block_size(),
            config.adaptive_bias
        ));
        binarize_varied(&gray, config)
    } else {
        crate::log(&format!(
            "Binarizing {}x{} (clear background, clip {:.1}, grid {})",
            gray.width(),
            gray.height(),
            config.clahe_clip_limit,
            config.clahe_tile_grid
        ));
        binarize_clear(&gray, config)
    };

    Ok(denoise(&mask, config.denoise_radius))
}

fn binarize_clear(gray: &GrayImage, config: &BinarizeConfig) -> GrayImage {
    let equalized = clahe::equalize_adaptive(gray, config.clahe_clip_limit, config.clahe_tile_grid);
    let otsu = otsu_binarize(&equalized);
    close_ink(&otsu)
}

fn binarize_varied(gray: &GrayImage, config: &BinarizeConfig) -> GrayImage {
    let binary = adaptive_mean_threshold(gray, config.odd_block_size(), config.adaptive_bias);
    let opened = open_ink(&binary);
    close_ink(&opened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, RgbImage};

    /// Parchment with two dark letter-sized blocks.
    fn scroll(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            let in_band = (20..50).contains(&y);
            if in_band && ((20..40).contains(&x) || (70..100).contains(&x)) {
                Luma([40])
            } else {
                Luma([200])
            }
        })
    }

    fn assert_binary(mask: &GrayImage) {
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_clear_background_shape_and_ink() {
        // The default 80x80 grid needs full-size scans; use a coarse grid here
        let config = BinarizeConfig {
            clahe_tile_grid: 2,
            ..BinarizeConfig::default()
        };
        let img = DynamicImage::ImageLuma8(scroll(120, 70));
        let mask = binarize(&img, false, &config).unwrap();
        assert_eq!(mask.dimensions(), (120, 70));
        assert_binary(&mask);
        assert_eq!(mask.get_pixel(30, 35)[0], 0);
        assert_eq!(mask.get_pixel(5, 5)[0], 255);
    }

    #[test]
    fn test_varied_background_shape_and_ink() {
        let img = DynamicImage::ImageLuma8(scroll(120, 70));
        let mask = binarize(&img, true, &BinarizeConfig::default()).unwrap();
        assert_eq!(mask.dimensions(), (120, 70));
        assert_binary(&mask);
        assert_eq!(mask.get_pixel(5, 5)[0], 255);
        // Block edges are darker than their local mean
        assert_eq!(mask.get_pixel(22, 35)[0], 0);
    }

    #[test]
    fn test_color_input_is_grayscaled() {
        let rgb: RgbImage = ImageBuffer::from_fn(60, 40, |x, _| {
            if (20..30).contains(&x) { Rgb([30, 20, 10]) } else { Rgb([220, 210, 190]) }
        });
        let mask = binarize(&DynamicImage::ImageRgb8(rgb), false, &BinarizeConfig::default()).unwrap();
        assert_eq!(mask.dimensions(), (60, 40));
        assert_binary(&mask);
    }

    #[test]
    fn test_empty_input_fails() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(binarize(&img, false, &BinarizeConfig::default()).is_err());
        assert!(binarize(&img, true, &BinarizeConfig::default()).is_err());
    }
}
