// src/utils.rs
use image::{Rgb, RgbImage};
use ndarray::{s, Array2, ArrayView1, Axis};

/// Half-open ink rectangle inside a coverage mask, in (row, column) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl InkBounds {
    pub fn width(&self) -> usize {
        self.right - self.left
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top
    }
}

fn has_ink(lane: &ArrayView1<u8>, threshold: u8) -> bool {
    lane.iter().any(|&v| v > threshold)
}

/// Smallest rectangle holding every cell whose coverage is above `threshold`.
pub fn ink_bounds(mask: &Array2<u8>, threshold: u8) -> Option<InkBounds> {
    let rows: Vec<usize> = mask
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| has_ink(row, threshold))
        .map(|(i, _)| i)
        .collect();
    let cols: Vec<usize> = mask
        .axis_iter(Axis(1))
        .enumerate()
        .filter(|(_, col)| has_ink(col, threshold))
        .map(|(j, _)| j)
        .collect();

    match (rows.first(), rows.last(), cols.first(), cols.last()) {
        (Some(&top), Some(&bottom), Some(&left), Some(&right)) => Some(InkBounds {
            top,
            left,
            bottom: bottom + 1,
            right: right + 1,
        }),
        _ => None,
    }
}

/// Crops the mask to its ink bounds. A mask without ink becomes 0x0.
pub fn trim_to_ink(mask: &Array2<u8>, threshold: u8) -> Array2<u8> {
    match ink_bounds(mask, threshold) {
        Some(b) => mask.slice(s![b.top..b.bottom, b.left..b.right]).to_owned(),
        None => Array2::zeros((0, 0)),
    }
}

/// `floor((size - extent) / 2)`; negative when the extent overflows the edge.
#[inline(always)]
pub fn centering_offset(size: u32, extent: usize) -> i64 {
    (i64::from(size) - extent as i64).div_euclid(2)
}

/// Paints inked mask cells onto `img` with the mask's top-left at (x, y).
/// Cells outside the canvas are clipped; uninked cells leave the pixel alone.
pub fn composite_mask(
    img: &mut RgbImage,
    mask: &Array2<u8>,
    x: i64,
    y: i64,
    color: Rgb<u8>,
    threshold: u8,
) {
    let (width, height) = (i64::from(img.width()), i64::from(img.height()));
    for ((row, col), &coverage) in mask.indexed_iter() {
        if coverage <= threshold {
            continue;
        }
        let px = x + col as i64;
        let py = y + row as i64;
        if px < 0 || py < 0 || px >= width || py >= height {
            continue;
        }
        img.put_pixel(px as u32, py as u32, color);
    }
}
