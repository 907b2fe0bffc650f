use image::{GrayImage, Luma};
use image::imageops::crop_imm;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{erode, open};

/// Morphological skeleton of an ink-white silhouette.
///
/// Repeatedly collects what an opening removes and erodes, until nothing is
/// left. The image is padded with a background border first, so every
/// erosion strictly shrinks the foreground and the loop always terminates.
pub fn skeletonize(ink: &GrayImage) -> GrayImage {
    let (width, height) = ink.dimensions();
    if width == 0 || height == 0 {
        return ink.clone();
    }

    let mut current = GrayImage::new(width + 2, height + 2);
    for (x, y, p) in ink.enumerate_pixels() {
        current.put_pixel(x + 1, y + 1, *p);
    }

    let mut skeleton = GrayImage::new(width + 2, height + 2);
    let mut remaining = count_foreground(&current);

    while remaining > 0 {
        let opened = open(&current, Norm::L1, 1);
        for (x, y, p) in current.enumerate_pixels() {
            let residue = p[0].saturating_sub(opened.get_pixel(x, y)[0]);
            if residue > 0 {
                let s = skeleton.get_pixel(x, y)[0];
                skeleton.put_pixel(x, y, Luma([s | residue]));
            }
        }

        current = erode(&current, Norm::L1, 1);
        let next = count_foreground(&current);
        debug_assert!(next < remaining, "erosion must shrink the foreground");
        if next >= remaining {
            break;
        }
        remaining = next;
    }

    crop_imm(&skeleton, 1, 1, width, height).to_image()
}

fn count_foreground(img: &GrayImage) -> usize {
    img.pixels().filter(|p| p[0] > 0).count()
}

/// Number of foreground pixels in each column.
pub fn column_profile(img: &GrayImage) -> Vec<u32> {
    let mut profile = vec![0u32; img.width() as usize];
    for (x, _, p) in img.enumerate_pixels() {
        if p[0] > 0 {
            profile[x as usize] += 1;
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn block(width: u32, height: u32, x0: u32, x1: u32, y0: u32, y1: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Luma([if (x0..x1).contains(&x) && (y0..y1).contains(&y) { 255 } else { 0 }])
        })
    }

    #[test]
    fn test_skeleton_is_thin_and_inside_shape() {
        let ink = block(40, 20, 5, 35, 5, 12);
        let skel = skeletonize(&ink);
        assert_eq!(skel.dimensions(), (40, 20));

        let skel_count = count_foreground(&skel);
        assert!(skel_count > 0);
        assert!(skel_count < count_foreground(&ink) / 2);
        for (x, y, p) in skel.enumerate_pixels() {
            if p[0] > 0 {
                assert!(ink.get_pixel(x, y)[0] > 0, "skeleton pixel ({}, {}) outside shape", x, y);
            }
        }
    }

    #[test]
    fn test_full_foreground_terminates() {
        let ink: GrayImage = ImageBuffer::from_pixel(15, 9, Luma([255]));
        let skel = skeletonize(&ink);
        assert!(count_foreground(&skel) > 0);
    }

    #[test]
    fn test_empty_stays_empty() {
        let ink = GrayImage::new(10, 10);
        assert_eq!(count_foreground(&skeletonize(&ink)), 0);
        assert_eq!(skeletonize(&GrayImage::new(0, 0)).dimensions(), (0, 0));
    }

    #[test]
    fn test_column_profile() {
        let ink = block(6, 4, 1, 3, 0, 3);
        assert_eq!(column_profile(&ink), vec![0, 3, 3, 0, 0, 0]);
    }

    #[test]
    fn test_skeleton_keeps_gap_between_blobs() {
        let ink: GrayImage = ImageBuffer::from_fn(50, 20, |x, y| {
            let inside = (4..16).contains(&y) && ((3..18).contains(&x) || (30..47).contains(&x));
            Luma([if inside { 255 } else { 0 }])
        });
        let profile = column_profile(&skeletonize(&ink));
        assert!(profile[20..28].iter().all(|&c| c == 0));
        assert!(profile[3..18].iter().any(|&c| c > 0));
        assert!(profile[30..47].iter().any(|&c| c > 0));
    }
}
