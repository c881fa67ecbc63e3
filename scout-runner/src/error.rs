//! Fatal run errors.

use std::path::PathBuf;
use thiserror::Error;

use scout_core::ConfigError;

use crate::provider::JudgeError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("snapshot {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    #[error("judge setup failed: {0}")]
    Judge(#[from] JudgeError),
}
