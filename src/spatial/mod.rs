//! Uniform-grid spatial index over rectangular objects

pub mod cell;
pub mod query;
pub mod sparse_hash;
pub mod stats;

pub use cell::{cell_of, covered_range, floor_div, radius_range, CellRange};
pub use query::{center_within_radius, rect_intersects_circle, QueryScratch};
pub use sparse_hash::SpatialGrid;
pub use stats::{GridStats, StatsCache};
