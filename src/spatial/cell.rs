//! Cell addressing: world coordinates to integer cell coordinates
//!
//! All arithmetic is widened to `i64` so `x + width - 1` and `cx + radius`
//! cannot overflow for 32-bit inputs.

use crate::core::types::{CellCoord, Rect};

/// Integer division rounding toward negative infinity
///
/// `floor_div(-1, 100) == -1`, unlike truncating division which gives `0`.
/// `cell_size` must be positive.
#[inline]
pub fn floor_div(a: i64, cell_size: i64) -> i64 {
    a.div_euclid(cell_size)
}

/// Cell containing the world point `(x, y)`
#[inline]
pub fn cell_of(x: i32, y: i32, cell_size: i32) -> CellCoord {
    let size = cell_size as i64;
    CellCoord::new(floor_div(x as i64, size), floor_div(y as i64, size))
}

/// Cells a rectangle occupies
///
/// The end of each axis is `floor_div(coord + dim - 1)`. A zero or negative
/// extent collapses to the starting cell instead of producing an empty range,
/// so every object is registered somewhere.
pub fn covered_range(rect: &Rect, cell_size: i32) -> CellRange {
    let size = cell_size as i64;
    let start_x = floor_div(rect.x as i64, size);
    let start_y = floor_div(rect.y as i64, size);
    let end_x = floor_div(rect.x as i64 + rect.width as i64 - 1, size).max(start_x);
    let end_y = floor_div(rect.y as i64 + rect.height as i64 - 1, size).max(start_y);

    CellRange {
        min: CellCoord::new(start_x, start_y),
        max: CellCoord::new(end_x, end_y),
    }
}

/// Cells covering the square `[cx - r, cx + r] x [cy - r, cy + r]`
///
/// The low side starts one unit early. A rectangle's far edge `x + width`
/// sits one past its last covered cell, so contact exactly at `cx - r` on a
/// cell boundary is only found through the neighbouring cell.
/// A negative radius yields an empty range.
pub fn radius_range(cx: i32, cy: i32, radius: i32, cell_size: i32) -> CellRange {
    let size = cell_size as i64;
    let (cx, cy, r) = (cx as i64, cy as i64, radius as i64);

    CellRange {
        min: CellCoord::new(floor_div(cx - r - 1, size), floor_div(cy - r - 1, size)),
        max: CellCoord::new(floor_div(cx + r, size), floor_div(cy + r, size)),
    }
}

/// Inclusive rectangular block of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellRange {
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y
    }

    /// Number of cells in the block
    pub fn cell_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let w = (self.max.x - self.min.x + 1) as u64;
        let h = (self.max.y - self.min.y + 1) as u64;
        w.saturating_mul(h)
    }

    #[inline]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Every cell in the block, column by column
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| (min.y..=max.y).map(move |y| CellCoord::new(x, y)))
    }
}
