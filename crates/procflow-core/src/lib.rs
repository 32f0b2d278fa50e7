//! Procflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by the procflow
//! validator, layout engine, and BPMN exporter. It includes:
//!
//! - **Model**: The immutable process model ([`model::Process`],
//!   [`model::Element`], [`model::Flow`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Identifiers**: Lexical rules for element ids and variable names
//!   ([`identifier`] module)

pub mod geometry;
pub mod identifier;
pub mod model;
