//! Point, rectangle and radius queries
//!
//! Range queries accumulate ids in a `QueryScratch` to drop duplicates from
//! objects spanning several cells, then copy the set out into a fresh `Vec`.
//! Result order is unspecified.

use std::mem::size_of;

use ahash::AHashSet;

use crate::core::types::{ObjectId, RadiusPrecision, Rect};
use crate::spatial::cell::{cell_of, covered_range, radius_range, CellRange};
use crate::spatial::sparse_hash::SpatialGrid;

/// Reusable de-duplication buffer for range queries
///
/// Keeps its allocation between queries. Each query clears it first and
/// never hands it out, so reuse is invisible to callers. Workers querying a
/// shared grid can each own one and use the `*_with` query methods.
#[derive(Debug, Default)]
pub struct QueryScratch {
    unique: AHashSet<ObjectId>,
}

impl QueryScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { unique: AHashSet::with_capacity(capacity) }
    }

    pub fn clear(&mut self) {
        self.unique.clear();
    }

    pub(crate) fn memory_estimate(&self) -> usize {
        self.unique.capacity() * size_of::<usize>()
    }

    fn begin(&mut self, expected: usize) {
        self.unique.clear();
        self.unique.reserve(expected);
    }

    fn finish(&self) -> Vec<ObjectId> {
        self.unique.iter().copied().collect()
    }
}

/// Whether the center of `rect` lies within `radius` of `(cx, cy)`
#[inline]
pub fn center_within_radius(rect: &Rect, cx: i32, cy: i32, radius: i32) -> bool {
    let (ox, oy) = rect.center();
    within_radius(ox - cx as i64, oy - cy as i64, radius)
}

/// Whether `rect` and the circle at `(cx, cy)` share any point
///
/// Clamps the circle center onto the rectangle to find its closest point.
/// Written as `max(min(..))` rather than `clamp` because negative extents
/// put the upper bound below the lower one.
#[inline]
pub fn rect_intersects_circle(rect: &Rect, cx: i32, cy: i32, radius: i32) -> bool {
    let (cx, cy) = (cx as i64, cy as i64);
    let (rx, ry) = (rect.x as i64, rect.y as i64);
    let closest_x = rx.max(cx.min(rx + rect.width as i64));
    let closest_y = ry.max(cy.min(ry + rect.height as i64));
    within_radius(closest_x - cx, closest_y - cy, radius)
}

#[inline]
fn within_radius(dx: i64, dy: i64, radius: i32) -> bool {
    let (dx, dy, r) = (dx as i128, dy as i128, radius as i128);
    dx * dx + dy * dy <= r * r
}

impl SpatialGrid {
    /// Objects registered in the cell containing `(x, y)`
    pub fn objects_at(&self, x: i32, y: i32) -> Vec<ObjectId> {
        self.cells
            .get(&cell_of(x, y, self.cell_size))
            .map(|cell| cell.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Objects sharing at least one cell with `rect`
    ///
    /// Broad phase only: an object can be returned when its rectangle merely
    /// shares a cell with the query without overlapping it.
    pub fn objects_in_rect(&mut self, rect: Rect) -> Vec<ObjectId> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.objects_in_rect_with(&mut scratch, rect);
        self.scratch = scratch;
        result
    }

    /// `objects_in_rect` using a caller-owned accumulator
    pub fn objects_in_rect_with(&self, scratch: &mut QueryScratch, rect: Rect) -> Vec<ObjectId> {
        let range = covered_range(&rect, self.cell_size);
        scratch.begin(self.estimate_capacity(&range));
        self.collect_cells(scratch, &range, |_| true);
        scratch.finish()
    }

    /// Objects within `radius` of `(cx, cy)` at the requested precision
    pub fn objects_in_radius(
        &mut self,
        cx: i32,
        cy: i32,
        radius: i32,
        precision: RadiusPrecision,
    ) -> Vec<ObjectId> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.objects_in_radius_with(&mut scratch, cx, cy, radius, precision);
        self.scratch = scratch;
        result
    }

    /// Radius query at the configured default precision
    pub fn objects_near(&mut self, cx: i32, cy: i32, radius: i32) -> Vec<ObjectId> {
        self.objects_in_radius(cx, cy, radius, self.default_precision)
    }

    /// `objects_in_radius` using a caller-owned accumulator
    pub fn objects_in_radius_with(
        &self,
        scratch: &mut QueryScratch,
        cx: i32,
        cy: i32,
        radius: i32,
        precision: RadiusPrecision,
    ) -> Vec<ObjectId> {
        let range = radius_range(cx, cy, radius, self.cell_size);
        scratch.begin(self.estimate_capacity(&range));

        match precision {
            RadiusPrecision::Square => self.collect_cells(scratch, &range, |_| true),
            RadiusPrecision::Center => self.collect_cells(scratch, &range, |id| {
                self.objects
                    .get(&id)
                    .is_some_and(|rect| center_within_radius(rect, cx, cy, radius))
            }),
            RadiusPrecision::Bounds => self.collect_cells(scratch, &range, |id| {
                self.objects
                    .get(&id)
                    .is_some_and(|rect| rect_intersects_circle(rect, cx, cy, radius))
            }),
        }

        scratch.finish()
    }

    fn collect_cells(
        &self,
        scratch: &mut QueryScratch,
        range: &CellRange,
        mut keep: impl FnMut(ObjectId) -> bool,
    ) {
        for coord in range.iter() {
            if let Some(cell) = self.cells.get(&coord) {
                for &id in cell {
                    // Skip ids already accepted through another cell
                    if !scratch.unique.contains(&id) && keep(id) {
                        scratch.unique.insert(id);
                    }
                }
            }
        }
    }
}
