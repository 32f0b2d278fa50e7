//! Error types for procflow operations.
//!
//! Semantic problems with a process model are never errors here; they are
//! reported through a [`ValidationReport`](procflow_validator::ValidationReport).
//! [`ProcflowError`] covers the boundaries: files, configuration, and
//! document export.

use std::{io, path::PathBuf};

use thiserror::Error;

use procflow_validator::error::ValidationError;

/// The main error type for procflow operations.
#[derive(Debug, Error)]
pub enum ProcflowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for ProcflowError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
