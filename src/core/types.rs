//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

use crate::core::error::GridError;

/// Caller-assigned identifier for an indexed object
///
/// The index never allocates ids; uniqueness is the host's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ObjectId(pub i32);

impl ObjectId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for ObjectId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Axis-aligned rectangle in world units, anchored at its top-left corner
///
/// Width and height are not validated. Zero or negative extents are legal
/// and occupy the single cell containing `(x, y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Center point, using integer halving of the extents
    #[inline]
    pub fn center(&self) -> (i64, i64) {
        (
            self.x as i64 + (self.width / 2) as i64,
            self.y as i64 + (self.height / 2) as i64,
        )
    }
}

/// Integer cell address in the uniform grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i64,
    pub y: i64,
}

impl CellCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Refinement applied to candidates of a radius query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum RadiusPrecision {
    /// Every object sharing a cell with the query's bounding square
    Square = 0,
    /// Objects whose rectangle center lies inside the circle
    #[default]
    Center = 1,
    /// Objects whose rectangle touches the circle
    Bounds = 2,
}

impl TryFrom<i32> for RadiusPrecision {
    type Error = GridError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RadiusPrecision::Square),
            1 => Ok(RadiusPrecision::Center),
            2 => Ok(RadiusPrecision::Bounds),
            other => Err(GridError::UnknownPrecision(other)),
        }
    }
}

impl From<RadiusPrecision> for i32 {
    fn from(precision: RadiusPrecision) -> Self {
        precision as i32
    }
}
