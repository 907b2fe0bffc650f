//! Morphology on ink-black masks.
//!
//! `imageproc` treats non-zero pixels as foreground, while our masks carry ink
//! as black. Every operation inverts, works on the ink, and inverts back. The
//! structuring element is the 3x3 cross (L1 norm, radius 1), which is also
//! what a 3x3 ellipse rasterizes to.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::{close, open};

/// Swaps black and white.
pub fn invert(img: &GrayImage) -> GrayImage {
    let mut output = img.clone();
    for pixel in output.pixels_mut() {
        *pixel = Luma([255 - pixel[0]]);
    }
    output
}

/// Closing of the ink: fuses broken letter strokes.
pub fn close_ink(mask: &GrayImage) -> GrayImage {
    invert(&close(&invert(mask), Norm::L1, 1))
}

/// Opening of the ink: removes isolated specks.
pub fn open_ink(mask: &GrayImage) -> GrayImage {
    invert(&open(&invert(mask), Norm::L1, 1))
}

/// Median filter denoising. A radius of zero leaves the mask untouched.
pub fn denoise(mask: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    median_filter(mask, radius, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn white(w: u32, h: u32) -> GrayImage {
        ImageBuffer::from_pixel(w, h, Luma([255]))
    }

    #[test]
    fn test_close_bridges_one_pixel_gap() {
        let mut mask = white(20, 9);
        for y in 3..6 {
            for x in 2..18 {
                if x != 10 {
                    mask.put_pixel(x, y, Luma([0]));
                }
            }
        }
        let closed = close_ink(&mask);
        assert_eq!(closed.get_pixel(10, 4)[0], 0, "gap should be filled");
    }

    #[test]
    fn test_open_removes_isolated_speck() {
        let mut mask = white(9, 9);
        mask.put_pixel(4, 4, Luma([0]));
        let opened = open_ink(&mask);
        assert!(opened.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_denoise_removes_salt() {
        let mut mask = white(15, 15);
        mask.put_pixel(3, 3, Luma([0]));
        mask.put_pixel(10, 11, Luma([0]));
        let clean = denoise(&mask, 2);
        assert!(clean.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_denoise_keeps_thick_blob() {
        let mut mask = white(30, 30);
        for y in 5..25 {
            for x in 5..25 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let clean = denoise(&mask, 2);
        assert_eq!(clean.get_pixel(15, 15)[0], 0);
        assert_eq!(clean.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let img: GrayImage = ImageBuffer::from_fn(7, 3, |x, y| Luma([(x * 30 + y) as u8]));
        assert_eq!(invert(&invert(&img)), img);
    }
}
