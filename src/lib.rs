//! Spatial Grid - uniform-grid index for rectangular objects
//!
//! Maps caller-identified rectangles into fixed-size square cells so point,
//! rectangle and radius queries cost time proportional to the queried area.

pub mod core;
pub mod spatial;

pub use crate::core::{GridConfig, GridError, ObjectId, RadiusPrecision, Rect, Result};
pub use crate::spatial::{GridStats, QueryScratch, SpatialGrid};
