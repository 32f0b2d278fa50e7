use std::fmt;

use crate::error::{Diagnostic, ValidationError};

/// The outcome of validating a process.
///
/// A report is valid exactly when it holds no errors; warnings never affect
/// validity.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub(crate) fn new(errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Error diagnostics, in check order.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Warning diagnostics, in check order.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Iterates over errors followed by warnings.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Converts the report into a `Result`, failing when it holds errors.
    ///
    /// The warnings of a valid report stay available on the `Ok` value.
    pub fn into_result(self) -> Result<Self, ValidationError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(ValidationError::new(self.errors))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            write!(f, "process is valid")?;
        } else {
            write!(f, "process is invalid")?;
        }
        write!(
            f,
            " ({} error(s), {} warning(s))",
            self.errors.len(),
            self.warnings.len()
        )?;
        for diagnostic in self.diagnostics() {
            write!(f, "\n  {diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_report_display() {
        let report = ValidationReport::new(
            vec![
                Diagnostic::error("Process must have at least one end event")
                    .with_code(ErrorCode::E401),
            ],
            vec![
                Diagnostic::warning("Process version not specified").with_code(ErrorCode::W002),
            ],
        );

        assert_eq!(
            report.to_string(),
            "process is invalid (1 error(s), 1 warning(s))\n  \
             error[E401]: Process must have at least one end event\n  \
             warning[W002]: Process version not specified"
        );
    }

    #[test]
    fn test_into_result_keeps_warnings() {
        let report = ValidationReport::new(Vec::new(), vec![Diagnostic::warning("w")]);
        let report = report
            .into_result()
            .expect("report without errors is valid");

        assert_eq!(report.warnings()[0].message(), "w");
    }

    #[test]
    fn test_into_result_fails_on_errors() {
        let report = ValidationReport::new(vec![Diagnostic::error("boom")], Vec::new());
        let err = report
            .into_result()
            .expect_err("report with errors is invalid");

        assert_eq!(err.diagnostics().len(), 1);
    }
}
