use image::GrayImage;

/// A glyph prepared for the classifier: centred on a white square canvas,
/// intensities scaled to 0.0..=1.0, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphTensor {
    /// Canvas side in pixels
    pub size: u32,
    /// `size * size` values
    pub data: Vec<f32>,
    /// Width of the crop before padding
    pub source_width: u32,
    /// Height of the crop before padding
    pub source_height: u32,
}

impl GlyphTensor {
    /// Pastes `glyph` with its top-left corner at `(size/2 - w/2, size/2 - h/2)`.
    /// Parts that fall outside the canvas are clipped.
    pub fn from_image(glyph: &GrayImage, size: u32) -> Self {
        let (w, h) = glyph.dimensions();
        let side = size as i64;
        let mut data = vec![1.0f32; (size * size) as usize];

        let offset_x = side / 2 - w as i64 / 2;
        let offset_y = side / 2 - h as i64 / 2;

        for (x, y, pixel) in glyph.enumerate_pixels() {
            let cx = x as i64 + offset_x;
            let cy = y as i64 + offset_y;
            if cx < 0 || cy < 0 || cx >= side || cy >= side {
                continue;
            }
            data[(cy * side + cx) as usize] = pixel[0] as f32 / 255.0;
        }

        Self {
            size,
            data,
            source_width: w,
            source_height: h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    impl GlyphTensor {
        fn get(&self, x: u32, y: u32) -> f32 {
            self.data[(y * self.size + x) as usize]
        }
    }

    #[test]
    fn test_small_glyph_is_centred() {
        let glyph: GrayImage = ImageBuffer::from_pixel(10, 20, Luma([0]));
        let tensor = GlyphTensor::from_image(&glyph, 100);

        assert_eq!(tensor.data.len(), 100 * 100);
        assert_eq!((tensor.source_width, tensor.source_height), (10, 20));
        // Top-left of the glyph lands at (45, 40)
        assert_eq!(tensor.get(45, 40), 0.0);
        assert_eq!(tensor.get(54, 59), 0.0);
        assert_eq!(tensor.get(44, 40), 1.0);
        assert_eq!(tensor.get(55, 59), 1.0);
        assert_eq!(tensor.get(45, 60), 1.0);
    }

    #[test]
    fn test_intensity_is_normalized() {
        let glyph: GrayImage = ImageBuffer::from_pixel(2, 2, Luma([51]));
        let tensor = GlyphTensor::from_image(&glyph, 8);
        assert!((tensor.get(3, 3) - 0.2).abs() < 1e-6);
        assert!(tensor.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_oversized_glyph_is_clipped() {
        let glyph: GrayImage = ImageBuffer::from_pixel(30, 6, Luma([0]));
        let tensor = GlyphTensor::from_image(&glyph, 10);
        // Offset x = 5 - 15 = -10, so the canvas row is fully covered
        for x in 0..10 {
            assert_eq!(tensor.get(x, 5), 0.0);
        }
        assert_eq!(tensor.get(0, 1), 1.0);
    }
}
