//! Contrast limited adaptive histogram equalization.
//!
//! The image is split into a `grid x grid` mosaic of tiles. Each tile gets its
//! own clipped, redistributed histogram and a lookup table derived from it;
//! every pixel is mapped through the four nearest tile tables and bilinearly
//! blended, which avoids visible tile seams.

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Applies CLAHE with the given clip limit and tiles per axis.
///
/// `clip_limit` is relative to a flat histogram: a bin may hold at most
/// `clip_limit * tile_area / 256` pixels (never less than one).
pub fn equalize_adaptive(img: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let grid = grid.max(1);
    let tile_w = width.div_ceil(grid);
    let tile_h = height.div_ceil(grid);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts: Vec<[u8; BINS]> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(img, x0, y0, x1, y1, clip_limit));
        }
    }

    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels() {
        let value = pixel[0] as usize;

        let (tx1, tx2, fx) = neighbours(x, tile_w, tiles_x);
        let (ty1, ty2, fy) = neighbours(y, tile_h, tiles_y);

        let lut = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][value] as f32;

        let top = lut(tx1, ty1) * (1.0 - fx) + lut(tx2, ty1) * fx;
        let bottom = lut(tx1, ty2) * (1.0 - fx) + lut(tx2, ty2) * fx;
        let blended = top * (1.0 - fy) + bottom * fy;

        output.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
    }

    output
}

/// Tile indices on either side of a pixel and the blend weight of the second.
fn neighbours(pos: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let t = pos as f32 / tile as f32 - 0.5;
    let first = t.floor();
    let weight = t - first;
    let last = tiles as i64 - 1;
    let t1 = (first as i64).clamp(0, last) as u32;
    let t2 = (first as i64 + 1).clamp(0, last) as u32;
    (t1, t2, weight)
}

fn tile_lut(img: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[img.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
        clip_histogram(&mut hist, limit);
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (i, count) in hist.iter().enumerate() {
        sum += count;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Clips every bin to `limit` and spreads the excess evenly over all bins.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let per_bin = excess / BINS as u32;
    let residual = (excess % BINS as u32) as usize;

    for count in hist.iter_mut() {
        *count += per_bin;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        let mut remaining = residual;
        while i < BINS && remaining > 0 {
            hist[i] += 1;
            remaining -= 1;
            i += step;
        }
    }
}
