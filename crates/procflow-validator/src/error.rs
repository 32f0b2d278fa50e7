//! Diagnostics reported by the validator.
//!
//! Every finding is a [`Diagnostic`] with a [`Severity`] and an
//! [`ErrorCode`]. The validator never fails early: findings are accumulated
//! in a [`DiagnosticCollector`] and handed back as a
//! [`ValidationReport`](crate::ValidationReport).
//!
//! # Example
//!
//! ```
//! # use procflow_validator::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("Duplicate element ID: task")
//!     .with_code(ErrorCode::E200)
//!     .with_element("task")
//!     .with_help("element ids must be unique within a process");
//!
//! assert_eq!(diag.to_string(), "error[E200]: Duplicate element ID: task");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod severity;
mod validation_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use severity::Severity;
pub use validation_error::ValidationError;
