use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Global Otsu threshold: pixels above the level become white (255), the rest black.
pub fn otsu_binarize(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    threshold_above(img, level)
}

/// Pixels strictly above `level` become white (255), the rest black.
pub fn threshold_above(img: &GrayImage, level: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] > level { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }
    output
}

/// Mean-C adaptive threshold.
///
/// A pixel becomes white when it is brighter than the rounded mean of its
/// `block_size x block_size` neighbourhood minus `bias`; otherwise black.
/// Near the borders the mean is taken over the in-bounds part of the block.
pub fn adaptive_mean_threshold(img: &GrayImage, block_size: u32, bias: i32) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    let integral = integral_sums(img);
    let stride = (width + 1) as usize;
    let radius = (block_size / 2) as i64;

    for (x, y, pixel) in img.enumerate_pixels() {
        let x0 = (x as i64 - radius).max(0) as usize;
        let y0 = (y as i64 - radius).max(0) as usize;
        let x1 = (x as i64 + radius + 1).min(width as i64) as usize;
        let y1 = (y as i64 + radius + 1).min(height as i64) as usize;

        let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        let mean = (sum as f64 / count).round() as i32;

        let value = if pixel[0] as i32 > mean - bias { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Summed-area table with a zero first row and column.
fn integral_sums(img: &GrayImage) -> Vec<u64> {
    let (width, height) = img.dimensions();
    let stride = (width + 1) as usize;
    let mut table = vec![0u64; stride * (height + 1) as usize];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += img.get_pixel(x as u32, y as u32)[0] as u64;
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_otsu_separates_two_levels() {
        let img: GrayImage = ImageBuffer::from_fn(20, 10, |x, _| Luma([if x < 10 { 30 } else { 220 }]));
        let out = otsu_binarize(&img);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(19, 9)[0], 255);
    }

    #[test]
    fn test_adaptive_keeps_flat_background_white() {
        let img: GrayImage = ImageBuffer::from_pixel(50, 50, Luma([120]));
        let out = adaptive_mean_threshold(&img, 39, 15);
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_adaptive_follows_uneven_illumination() {
        // Background brightens left to right; a dark stroke sits on each side.
        let img: GrayImage = ImageBuffer::from_fn(120, 40, |x, y| {
            let background = 80 + x as u8;
            if (y == 20 || y == 21) && (x == 20 || x == 100) {
                Luma([background - 60])
            } else {
                Luma([background])
            }
        });
        let out = adaptive_mean_threshold(&img, 39, 15);
        assert_eq!(out.get_pixel(20, 20)[0], 0);
        assert_eq!(out.get_pixel(100, 20)[0], 0);
        assert_eq!(out.get_pixel(60, 5)[0], 255);
    }

    #[test]
    fn test_integral_sums() {
        let img: GrayImage = ImageBuffer::from_pixel(3, 2, Luma([2]));
        let table = integral_sums(&img);
        assert_eq!(table[2 * 4 + 3], 12);
        assert_eq!(table[1 * 4 + 2], 4);
    }
}
