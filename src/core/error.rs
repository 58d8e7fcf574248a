use thiserror::Error;

/// Status code returned to hosts when a batch update is applied
pub const BATCH_OK: i32 = 0;

/// Status code returned to hosts when batch arrays disagree in length
pub const BATCH_LENGTH_MISMATCH: i32 = -1;

/// Status code for any other failure surfaced to a host
pub const STATUS_FAILED: i32 = -2;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Cell size must be positive, got {0}")]
    InvalidCellSize(i32),

    #[error(
        "Batch arrays differ in length: ids={ids} xs={xs} ys={ys} widths={widths} heights={heights}"
    )]
    BatchLengthMismatch {
        ids: usize,
        xs: usize,
        ys: usize,
        widths: usize,
        heights: usize,
    },

    #[error("Unknown radius precision: {0}")]
    UnknownPrecision(i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl GridError {
    /// Integer status a host binding reports for this error.
    ///
    /// Only the batch length check has a dedicated code; everything else is
    /// reported as a generic failure.
    pub fn status_code(&self) -> i32 {
        match self {
            GridError::BatchLengthMismatch { .. } => BATCH_LENGTH_MISMATCH,
            _ => STATUS_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
