//! The error returned when a report is turned into a `Result`.

use thiserror::Error;

use crate::error::Diagnostic;

/// A failed validation, carrying every error diagnostic of the report.
#[derive(Debug, Error)]
#[error("process validation failed with {} error(s); first: {}", .diagnostics.len(), first_message(.diagnostics))]
pub struct ValidationError {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationError {
    pub(crate) fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all error diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn first_message(diagnostics: &[Diagnostic]) -> &str {
    diagnostics.first().map_or("", Diagnostic::message)
}
