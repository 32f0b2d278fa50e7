//! Procflow - A compiler from process models to engine-ready BPMN 2.0 XML.
//!
//! Validation, automatic layout, and BPMN generation for process models. The
//! generated documents carry Zeebe extensions and a complete diagram, and
//! every `ProcessEntity` is expanded into a validation task, a decision
//! gateway, and an error end event.

pub mod config;
pub mod layout;

mod error;
mod export;

pub use procflow_core::{geometry, identifier, model};
pub use procflow_validator as validator;
pub use procflow_validator::ValidationReport;

pub use error::ProcflowError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use config::AppConfig;
use export::{Exporter, bpmn::BpmnExporter};
use model::Process;

/// Header written in front of every saved document.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Compiler for turning process models into BPMN documents.
///
/// This provides an API for processing process models through validation,
/// layout, and generation stages. A compiler holds no per-call state, so one
/// instance can be shared freely.
///
/// # Examples
///
/// ```rust
/// use procflow::{ProcessCompiler, config::AppConfig};
/// use procflow::model::{Element, Flow, Process};
///
/// let process = Process::new("order", "Order")
///     .with_version("1.0")
///     .with_element(Element::start_event("start", "Start"))
///     .with_element(Element::end_event("end", "End"))
///     .with_flow(Flow::new("start", "end"));
///
/// let compiler = ProcessCompiler::new(AppConfig::default());
///
/// // Validate, then generate
/// let bpmn = compiler.compile(&process).expect("Failed to compile");
/// assert!(bpmn.contains("<startEvent id=\"start\" name=\"Start\"/>"));
///
/// // Or use default config
/// let compiler = ProcessCompiler::default();
/// ```
#[derive(Debug, Default)]
pub struct ProcessCompiler {
    config: AppConfig,
}

impl ProcessCompiler {
    /// Create a new process compiler with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout and export settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this compiler was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate a process model.
    ///
    /// Validation never fails; every problem found is part of the returned
    /// report.
    pub fn validate(&self, process: &Process) -> ValidationReport {
        procflow_validator::validate(process)
    }

    /// Calculate the diagram layout of a process model.
    pub fn layout(&self, process: &Process) -> layout::Layout {
        info!(process_id = process.id(); "Calculating layout");
        let engine = layout::Engine::new(self.config.layout());
        let layout = engine.calculate_layout(process);
        debug!(
            positioned = layout.positions().len(),
            routed = layout.routes().len();
            "Layout calculated"
        );
        layout
    }

    /// Generate the BPMN document of a process model.
    ///
    /// The model is not validated first: an invalid model still produces a
    /// document. Use [`compile`](Self::compile) to reject invalid models.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::Export`] if the document cannot be serialized.
    pub fn generate(&self, process: &Process) -> Result<String, ProcflowError> {
        let layout = self.layout(process);
        trace!(layout:?; "Layout for generation");

        let exporter = BpmnExporter::new(self.config.export());
        let document = exporter.export_process(process, &layout)?;

        info!(process_id = process.id(), bytes = document.len(); "BPMN generated");
        Ok(document)
    }

    /// Validate a process model and generate its document when it is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::Validation`] carrying every error diagnostic
    /// if validation fails, or an export error from [`generate`](Self::generate).
    pub fn compile(&self, process: &Process) -> Result<String, ProcflowError> {
        let report = self.validate(process).into_result()?;
        for warning in report.warnings() {
            debug!(warning:% = warning; "Compiling despite warning");
        }
        self.generate(process)
    }

    /// Generate the document of a process model and write it to `path`,
    /// preceded by the XML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::NotFound`] if the parent directory of `path`
    /// does not exist and [`ProcflowError::Io`] if writing fails.
    pub fn save(&self, process: &Process, path: impl AsRef<Path>) -> Result<(), ProcflowError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Saving BPMN document");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ProcflowError::NotFound(path.to_path_buf()));
            }
        }

        let document = self.generate(process)?;
        fs::write(path, format!("{XML_DECLARATION}\n{document}\n"))?;

        debug!(path = path.display().to_string(); "BPMN document written");
        Ok(())
    }
}

/// Generate the BPMN document of `process` with the default configuration.
///
/// # Errors
///
/// See [`ProcessCompiler::generate`].
pub fn generate(process: &Process) -> Result<String, ProcflowError> {
    ProcessCompiler::default().generate(process)
}

/// Validate `process`.
pub fn validate(process: &Process) -> ValidationReport {
    procflow_validator::validate(process)
}
