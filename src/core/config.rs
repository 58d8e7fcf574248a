//! Grid configuration with documented defaults
//!
//! Values can be loaded from a TOML file; any key left out falls back to the
//! default listed on the field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GridError, Result};
use crate::core::types::RadiusPrecision;

/// Configuration for a spatial grid instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of each square cell (world units)
    ///
    /// Should be close to the typical object size. Smaller = more cells per
    /// object and more bookkeeping on every move. Larger = more candidates to
    /// filter per query. Fixed for the lifetime of the grid.
    pub cell_size: i32,

    /// Number of cell entries reserved up front
    pub initial_cell_capacity: usize,

    /// Number of object table entries reserved up front
    pub initial_object_capacity: usize,

    /// Precision used by `objects_near` when the caller does not pick one
    pub default_precision: RadiusPrecision,

    /// Extra cell slots reserved per entry before applying a batch update
    ///
    /// At the default of 4, a batch of objects that each span a 2x2 block of
    /// cells never rehashes the cell map mid-batch.
    pub batch_reserve_factor: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 100,
            initial_cell_capacity: 256,
            initial_object_capacity: 1000,
            default_precision: RadiusPrecision::Center,
            batch_reserve_factor: 4,
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with a different cell size
    pub fn with_cell_size(cell_size: i32) -> Self {
        Self { cell_size, ..Self::default() }
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded grid config from {}: cell_size={}", path.display(), config.cell_size);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0 {
            return Err(GridError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}
