//! Configuration types for process compilation.
//!
//! This module provides configuration structures that control how process
//! diagrams are laid out and how the exported document is stamped. All types
//! implement [`serde::Deserialize`] with per-field defaults, so a partial
//! TOML file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and export settings.
//! - [`LayoutConfig`] - Margins and spacings used by the layout engine.
//! - [`ExportConfig`] - Exporter identity and target namespace of generated documents.
//!
//! # Example
//!
//! ```
//! # use procflow::config::AppConfig;
//! let config = AppConfig::from_toml_str(
//!     r#"
//!     [layout]
//!     level_spacing = 150.0
//!     "#,
//! )
//! .expect("valid configuration");
//!
//! assert_eq!(config.layout().level_spacing(), 150.0);
//! assert_eq!(config.layout().margin(), 50.0);
//! assert_eq!(config.export().exporter(), "BPM DSL");
//! ```

use std::{fs, path::Path};

use log::{debug, info};
use serde::Deserialize;

use crate::ProcflowError;

/// Top-level configuration combining layout and export settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    pub fn new(layout: LayoutConfig, export: ExportConfig) -> Self {
        Self { layout, export }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::Config`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self, ProcflowError> {
        toml::from_str(content).map_err(|err| {
            ProcflowError::Config(format!("Failed to parse TOML configuration: {err}"))
        })
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Spacing constants for the layout engine.
///
/// All values are in diagram units.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Margin kept free around the diagram on every side.
    #[serde(default = "default_margin")]
    margin: f32,

    /// Horizontal gap between two consecutive levels.
    #[serde(default = "default_level_spacing")]
    level_spacing: f32,

    /// Vertical pitch between elements sharing a level.
    #[serde(default = "default_vertical_spacing")]
    vertical_spacing: f32,

    /// Vertical pitch between the branches leaving a gateway.
    #[serde(default = "default_gateway_branch_spacing")]
    gateway_branch_spacing: f32,

    /// Offset below the top margin where the first row starts.
    #[serde(default = "default_base_offset")]
    base_offset: f32,

    /// Largest vertical difference still routed as a straight edge.
    #[serde(default = "default_straight_tolerance")]
    straight_tolerance: f32,
}

impl LayoutConfig {
    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn level_spacing(&self) -> f32 {
        self.level_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn gateway_branch_spacing(&self) -> f32 {
        self.gateway_branch_spacing
    }

    pub fn base_offset(&self) -> f32 {
        self.base_offset
    }

    pub fn straight_tolerance(&self) -> f32 {
        self.straight_tolerance
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            level_spacing: default_level_spacing(),
            vertical_spacing: default_vertical_spacing(),
            gateway_branch_spacing: default_gateway_branch_spacing(),
            base_offset: default_base_offset(),
            straight_tolerance: default_straight_tolerance(),
        }
    }
}

/// Identity stamped on generated documents.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_exporter")]
    exporter: String,

    #[serde(default = "default_exporter_version")]
    exporter_version: String,

    #[serde(default = "default_target_namespace")]
    target_namespace: String,
}

impl ExportConfig {
    /// Returns the value of the `exporter` attribute.
    pub fn exporter(&self) -> &str {
        &self.exporter
    }

    /// Returns the value of the `exporterVersion` attribute.
    pub fn exporter_version(&self) -> &str {
        &self.exporter_version
    }

    /// Returns the value of the `targetNamespace` attribute.
    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            exporter: default_exporter(),
            exporter_version: default_exporter_version(),
            target_namespace: default_target_namespace(),
        }
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist ([`ProcflowError::NotFound`])
/// - File cannot be read ([`ProcflowError::Io`])
/// - TOML parsing fails ([`ProcflowError::Config`])
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ProcflowError> {
    let path = path.as_ref();
    info!(path = path.display().to_string(); "Loading configuration");

    if !path.exists() {
        return Err(ProcflowError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config = AppConfig::from_toml_str(&content)?;

    debug!(config:?; "Configuration loaded");
    Ok(config)
}

fn default_margin() -> f32 {
    50.0
}

fn default_level_spacing() -> f32 {
    200.0
}

fn default_vertical_spacing() -> f32 {
    100.0
}

fn default_gateway_branch_spacing() -> f32 {
    120.0
}

fn default_base_offset() -> f32 {
    100.0
}

fn default_straight_tolerance() -> f32 {
    10.0
}

fn default_exporter() -> String {
    "BPM DSL".to_string()
}

fn default_exporter_version() -> String {
    "1.0".to_string()
}

fn default_target_namespace() -> String {
    "http://bpmn.io/schema/bpmn".to_string()
}
