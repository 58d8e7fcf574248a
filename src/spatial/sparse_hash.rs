//! Sparse hash grid of rectangular objects
//!
//! Two maps make up the index: cell coordinate to the set of object ids
//! overlapping that cell, and object id to its current rectangle. Only
//! `register_in_cells` and `unregister_from_cells` touch cell membership.

use std::mem::size_of;

use ahash::{AHashMap, AHashSet};

use crate::core::config::GridConfig;
use crate::core::error::{GridError, Result};
use crate::core::types::{CellCoord, ObjectId, RadiusPrecision, Rect};
use crate::spatial::cell::{covered_range, CellRange};
use crate::spatial::query::QueryScratch;
use crate::spatial::stats::{GridStats, StatsCache, MIN_ESTIMATED_CAPACITY};

pub(crate) type CellMap = AHashMap<CellCoord, AHashSet<ObjectId>>;

/// Uniform-grid spatial index
///
/// Invariants:
/// - an id is in a cell's set iff that cell is in `covered_range` of the
///   id's rectangle in the object table
/// - no cell maps to an empty set
///
/// Re-adding a tracked id through `add_object` breaks the first invariant
/// (its old cells keep a stale reference). Use `update_object` for moves.
#[derive(Debug)]
pub struct SpatialGrid {
    pub(crate) cell_size: i32,
    pub(crate) cells: CellMap,
    pub(crate) objects: AHashMap<ObjectId, Rect>,
    pub(crate) stats: StatsCache,
    pub(crate) scratch: QueryScratch,
    pub(crate) default_precision: RadiusPrecision,
    batch_reserve_factor: usize,
}

impl SpatialGrid {
    /// Grid with the given cell size and default capacities
    pub fn new(cell_size: i32) -> Result<Self> {
        Self::with_config(&GridConfig::with_cell_size(cell_size))
    }

    pub fn with_config(config: &GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cell_size: config.cell_size,
            cells: AHashMap::with_capacity(config.initial_cell_capacity),
            objects: AHashMap::with_capacity(config.initial_object_capacity),
            stats: StatsCache::new(),
            scratch: QueryScratch::new(),
            default_precision: config.default_precision,
            batch_reserve_factor: config.batch_reserve_factor,
        })
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    // === MUTATION PRIMITIVES ===

    fn register_in_cells(&mut self, id: ObjectId, rect: &Rect) {
        for coord in covered_range(rect, self.cell_size).iter() {
            self.cells.entry(coord).or_default().insert(id);
        }
        self.stats.mark_dirty();
    }

    fn unregister_from_cells(&mut self, id: ObjectId, rect: &Rect) {
        for coord in covered_range(rect, self.cell_size).iter() {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.remove(&id);
                if cell.is_empty() {
                    self.cells.remove(&coord);
                }
            }
        }
        self.stats.mark_dirty();
    }

    // === OBJECT LIFECYCLE ===

    /// Track a new object
    ///
    /// Overwrites the stored rectangle of an existing id without removing its
    /// old cell references. Hosts moving an object must call `update_object`.
    pub fn add_object(&mut self, id: ObjectId, rect: Rect) {
        self.objects.insert(id, rect);
        self.register_in_cells(id, &rect);
    }

    /// Stop tracking an object. Unknown ids are ignored.
    pub fn remove_object(&mut self, id: ObjectId) {
        if let Some(rect) = self.objects.remove(&id) {
            self.unregister_from_cells(id, &rect);
        }
    }

    /// Move or resize an object, adding it if unknown
    ///
    /// Cell membership is only rewritten when the covered cell range changes,
    /// so small moves inside the same footprint cost one table write.
    pub fn update_object(&mut self, id: ObjectId, rect: Rect) {
        let old = match self.objects.get(&id) {
            Some(old) => *old,
            None => {
                self.add_object(id, rect);
                return;
            }
        };

        if old == rect {
            return;
        }

        if covered_range(&old, self.cell_size) != covered_range(&rect, self.cell_size) {
            self.unregister_from_cells(id, &old);
            self.register_in_cells(id, &rect);
        }

        self.objects.insert(id, rect);
    }

    /// Apply many updates given as parallel arrays
    ///
    /// Fails without touching the index if the arrays differ in length.
    /// Otherwise every entry goes through `update_object` in input order.
    pub fn update_objects_batch(
        &mut self,
        ids: &[ObjectId],
        xs: &[i32],
        ys: &[i32],
        widths: &[i32],
        heights: &[i32],
    ) -> Result<()> {
        let len = ids.len();
        if xs.len() != len || ys.len() != len || widths.len() != len || heights.len() != len {
            let err = GridError::BatchLengthMismatch {
                ids: len,
                xs: xs.len(),
                ys: ys.len(),
                widths: widths.len(),
                heights: heights.len(),
            };
            tracing::warn!("Rejected batch update: {}", err);
            return Err(err);
        }

        self.cells.reserve(len.saturating_mul(self.batch_reserve_factor));

        for i in 0..len {
            self.update_object(ids[i], Rect::new(xs[i], ys[i], widths[i], heights[i]));
        }

        tracing::debug!("Applied batch update of {} objects ({} cells)", len, self.cells.len());
        Ok(())
    }

    /// Drop every object and cell, resetting statistics to their seed
    pub fn clear(&mut self) {
        tracing::debug!(
            "Clearing grid: {} objects in {} cells",
            self.objects.len(),
            self.cells.len()
        );
        self.cells.clear();
        self.objects.clear();
        self.scratch.clear();
        self.stats.reset();
    }

    /// Replace the whole contents with `objects`
    pub fn rebuild(&mut self, objects: impl IntoIterator<Item = (ObjectId, Rect)>) {
        self.clear();
        for (id, rect) in objects {
            self.update_object(id, rect);
        }
        tracing::debug!(
            "Rebuilt grid: {} objects in {} cells",
            self.objects.len(),
            self.cells.len()
        );
    }

    // === INTROSPECTION ===

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Rectangle on file for `id`
    pub fn rect_of(&self, id: ObjectId) -> Option<Rect> {
        self.objects.get(&id).copied()
    }

    /// Ids registered in one cell, if the cell is occupied
    pub fn cell(&self, coord: CellCoord) -> Option<&AHashSet<ObjectId>> {
        self.cells.get(&coord)
    }

    /// Occupied cells and their members
    pub fn cells(&self) -> impl Iterator<Item = (&CellCoord, &AHashSet<ObjectId>)> {
        self.cells.iter()
    }

    /// Cells `rect` would occupy in this grid
    pub fn covered_cells(&self, rect: &Rect) -> CellRange {
        covered_range(rect, self.cell_size)
    }

    pub fn stats(&self) -> GridStats {
        self.stats.get(|| self.cells.values().map(|cell| cell.len()))
    }

    pub fn max_objects_per_cell(&self) -> usize {
        self.stats().max_objects_per_cell
    }

    pub fn average_objects_per_cell(&self) -> f64 {
        self.stats().avg_objects_per_cell
    }

    /// Whether the next stats read will traverse the grid
    pub fn stats_dirty(&self) -> bool {
        self.stats.is_dirty()
    }

    /// Predicted unique ids produced by a query over `range`
    ///
    /// Never more than the number of tracked objects, never below the
    /// estimator's floor. The cap also keeps huge query extents from
    /// requesting enormous reservations.
    pub fn estimate_capacity(&self, range: &CellRange) -> usize {
        self.stats()
            .estimate_capacity(range)
            .min(self.objects.len().max(MIN_ESTIMATED_CAPACITY))
    }

    /// Rough heap footprint in bytes
    ///
    /// Counts one pointer per hash slot plus entry payloads. Diagnostic only;
    /// real allocator usage differs.
    pub fn memory_estimate(&self) -> usize {
        let ptr = size_of::<usize>();
        let mut estimate = 0;

        estimate += self.cells.capacity() * ptr;
        estimate += self.cells.len() * (size_of::<CellCoord>() + ptr);
        for cell in self.cells.values() {
            estimate += cell.capacity() * ptr;
            estimate += cell.len() * size_of::<ObjectId>();
        }

        estimate += self.objects.capacity() * ptr;
        estimate += self.objects.len() * (size_of::<ObjectId>() + size_of::<Rect>());

        estimate += self.scratch.memory_estimate();
        estimate
    }
}
