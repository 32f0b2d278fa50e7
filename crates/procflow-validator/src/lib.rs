//! Semantic validation for procflow process models.
//!
//! [`validate`] runs every structural and semantic check over a
//! [`Process`] and returns a [`ValidationReport`]. Validation never mutates
//! the model and never fails: every finding is a
//! [`Diagnostic`](error::Diagnostic) in the report.
//!
//! # Example
//!
//! ```
//! use procflow_core::model::{Element, Flow, Process};
//!
//! let process = Process::new("order", "Order")
//!     .with_element(Element::start_event("start", "Start"))
//!     .with_element(Element::end_event("end", "End"))
//!     .with_flow(Flow::new("start", "end"));
//!
//! let report = procflow_validator::validate(&process);
//! assert!(report.is_valid());
//! assert_eq!(report.warnings().len(), 1); // no version
//! ```

pub mod error;
mod report;
mod validate;
pub mod visit;

use log::{debug, info};
use procflow_core::model::Process;

pub use report::ValidationReport;
pub use validate::is_valid_condition;

/// Validates `process` and returns every finding.
pub fn validate(process: &Process) -> ValidationReport {
    info!(process_id = process.id(); "Validating process");
    debug!(
        elements = process.elements().len(),
        flows = process.flows().len(),
        kinds:? = validate::kind_counts(process);
        "Process shape"
    );

    let report = validate::Validator::new().run(process);

    info!(
        valid = report.is_valid(),
        errors = report.errors().len(),
        warnings = report.warnings().len();
        "Validation finished"
    );
    report
}
