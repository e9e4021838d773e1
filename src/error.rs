use std::path::PathBuf;

use thiserror::Error;

use crate::common::{BlockValue, LevelType};

#[derive(Debug, Error)]
pub enum SpecialError {
    #[error("format error: {0}")]
    Format(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{what} index {index} out of range (must be below {limit})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("no block property defined for level type {level_type:X}, block {block:02X}")]
    KeyNotFound {
        level_type: LevelType,
        block: BlockValue,
    },

    #[error("{0} is not ready")]
    NotReady(String),

    #[error("level type {0} has no special definition slot")]
    UnknownLevelType(LevelType),

    #[error("special graphics file {} not found next to its definitions", .0.display())]
    MissingGraphics(PathBuf),

    #[error("special graphics path {} would overwrite its definitions", .0.display())]
    GraphicsPathClash(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpecialError>;

pub(crate) fn check_index(what: &'static str, index: usize, limit: usize) -> Result<()> {
    if index >= limit {
        return Err(SpecialError::IndexOutOfRange { what, index, limit });
    }
    Ok(())
}
