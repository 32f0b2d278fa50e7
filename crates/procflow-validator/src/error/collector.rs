//! Collector for accumulating diagnostics during validation.

use crate::{ValidationReport, error::Diagnostic};

/// Accumulates diagnostics so every check can run instead of stopping at
/// the first finding.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// Errors and warnings are kept apart, each in emission order.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    /// Finish collection and build the report.
    pub fn finish(self) -> ValidationReport {
        ValidationReport::new(self.errors, self.warnings)
    }
}
