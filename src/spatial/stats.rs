//! Occupancy statistics and result-capacity estimation
//!
//! The statistics never influence query results. They only size the
//! de-duplication buffer before a range query fills it.

use std::cell::Cell;

use serde::Serialize;

use crate::spatial::cell::CellRange;

/// Average occupancy assumed before any cell has been measured
pub const DEFAULT_AVG_OBJECTS_PER_CELL: f64 = 5.0;

/// Lower bound for any capacity estimate
pub const MIN_ESTIMATED_CAPACITY: usize = 32;

/// Headroom applied on top of the measured average
const CAPACITY_HEADROOM: f64 = 1.5;

/// Aggregate shape of the grid's cell occupancy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridStats {
    /// Sum of set sizes across all cells (object-cell references)
    pub total_references: usize,
    /// Largest single cell set
    pub max_objects_per_cell: usize,
    /// `total_references / cells`, or the default seed for an empty grid
    pub avg_objects_per_cell: f64,
}

impl Default for GridStats {
    fn default() -> Self {
        Self {
            total_references: 0,
            max_objects_per_cell: 0,
            avg_objects_per_cell: DEFAULT_AVG_OBJECTS_PER_CELL,
        }
    }
}

impl GridStats {
    /// Compute statistics from the occupancy of each non-empty cell
    pub fn compute(cell_sizes: impl IntoIterator<Item = usize>) -> Self {
        let mut cells = 0usize;
        let mut total = 0usize;
        let mut max = 0usize;

        for size in cell_sizes {
            cells += 1;
            total += size;
            max = max.max(size);
        }

        let avg = if cells == 0 {
            DEFAULT_AVG_OBJECTS_PER_CELL
        } else {
            total as f64 / cells as f64
        };

        Self {
            total_references: total,
            max_objects_per_cell: max,
            avg_objects_per_cell: avg,
        }
    }

    /// Expected number of unique ids a query over `range` will produce
    ///
    /// `cells * average * 1.5`, never below 32.
    pub fn estimate_capacity(&self, range: &CellRange) -> usize {
        let estimate = range.cell_count() as f64 * self.avg_objects_per_cell * CAPACITY_HEADROOM;
        (estimate as usize).max(MIN_ESTIMATED_CAPACITY)
    }
}

/// Dirty-flagged cache in front of `GridStats::compute`
///
/// Interior mutability lets read-only accessors refresh the cache. The grid
/// is single-threaded so `Cell` is enough.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    stats: Cell<GridStats>,
    dirty: Cell<bool>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Back to the empty-grid seed, clean
    pub fn reset(&self) {
        self.stats.set(GridStats::default());
        self.dirty.set(false);
    }

    /// Current statistics, recomputed from `cell_sizes` only when dirty
    pub fn get<I>(&self, cell_sizes: impl FnOnce() -> I) -> GridStats
    where
        I: IntoIterator<Item = usize>,
    {
        if self.dirty.get() {
            let stats = GridStats::compute(cell_sizes());
            tracing::trace!(
                "Recomputed grid stats: total={} max={} avg={:.2}",
                stats.total_references,
                stats.max_objects_per_cell,
                stats.avg_objects_per_cell
            );
            self.stats.set(stats);
            self.dirty.set(false);
        }
        self.stats.get()
    }
}
