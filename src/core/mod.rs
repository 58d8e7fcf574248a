pub mod config;
pub mod error;
pub mod types;

pub use config::GridConfig;
pub use error::{GridError, Result};
pub use types::{CellCoord, ObjectId, RadiusPrecision, Rect};
