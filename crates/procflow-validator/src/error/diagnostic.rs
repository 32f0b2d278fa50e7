//! The core diagnostic type.
//!
//! A [`Diagnostic`] is a single error or warning about a process model, with
//! an optional error code, the id of the element it concerns, and help text.

use std::fmt;

use crate::error::{ErrorCode, Severity};

/// A finding about a process model.
///
/// # Example
///
/// ```text
/// error[E300]: Flow references non-existent source element: ghost
///   = element: ghost
///   = help: declare the element or fix the flow endpoint
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    element: Option<String>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the id of the element this diagnostic is about, if any.
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the id of the element this diagnostic is about.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            element: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E101]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.element().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("Duplicate element ID: task")
            .with_code(ErrorCode::E200)
            .with_element("task")
            .with_help("rename one of the elements");

        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.element(), Some("task"));
        assert_eq!(diag.help(), Some("rename one of the elements"));
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag =
            Diagnostic::error("Process must have a non-empty name").with_code(ErrorCode::E100);

        assert_eq!(
            diag.to_string(),
            "error[E100]: Process must have a non-empty name"
        );
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("unused element");

        assert_eq!(diag.to_string(), "warning: unused element");
    }
}
