//! Error codes for the procflow diagnostic system.
//!
//! Error codes are organized by the part of the model they concern:
//! - `E1xx` - Process errors
//! - `E2xx` - Element errors
//! - `E3xx` - Flow errors
//! - `E4xx` - Structural errors
//! - `W0xx` - Warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Process Errors (E1xx)
    // =========================================================================
    /// Empty process name.
    E100,

    /// Invalid process id.
    ///
    /// The process id is empty or is not usable as an XML id.
    E101,

    // =========================================================================
    // Element Errors (E2xx)
    // =========================================================================
    /// Duplicate element id.
    ///
    /// Two elements of the same process share an id.
    E200,

    /// Invalid element id.
    ///
    /// Element ids must start with a letter or underscore and contain only
    /// letters, digits, `-`, `_`, and `.`.
    E201,

    /// Empty element name.
    E202,

    /// Empty script body.
    E203,

    /// Invalid mapping variable.
    ///
    /// The plain-variable side of an io mapping is not a valid variable name.
    E204,

    /// Empty service task type.
    E205,

    /// Empty entity name.
    E206,

    /// Empty entity model path.
    E207,

    /// Script incompatible with the engine.
    ///
    /// The script body is blank, which the engine cannot evaluate.
    E208,

    // =========================================================================
    // Flow Errors (E3xx)
    // =========================================================================
    /// Unknown flow source.
    E300,

    /// Unknown flow target.
    E301,

    /// Invalid condition.
    ///
    /// The condition is blank or contains no comparison or boolean token.
    E302,

    /// Conditioned default flow.
    ///
    /// A default flow is taken when no other condition holds, so it must
    /// not carry a condition of its own.
    E303,

    /// Multiple default flows.
    ///
    /// An element may have at most one default outgoing flow.
    E304,

    // =========================================================================
    // Structural Errors (E4xx)
    // =========================================================================
    /// Missing start event.
    E400,

    /// Missing end event.
    E401,

    /// Start event with incoming flow.
    E402,

    /// End event with outgoing flow.
    E403,

    /// Unreachable element.
    ///
    /// The element cannot be reached from the first start event.
    E404,

    // =========================================================================
    // Warnings (W0xx)
    // =========================================================================
    /// Element not connected by any flow.
    W001,

    /// Process version not specified.
    W002,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E101").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Process errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Element errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            // Flow errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            // Structural errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
            ErrorCode::E404 => "E404",
            // Warnings
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "empty process name",
            ErrorCode::E101 => "invalid process id",
            ErrorCode::E200 => "duplicate element id",
            ErrorCode::E201 => "invalid element id",
            ErrorCode::E202 => "empty element name",
            ErrorCode::E203 => "empty script",
            ErrorCode::E204 => "invalid mapping variable",
            ErrorCode::E205 => "empty task type",
            ErrorCode::E206 => "empty entity name",
            ErrorCode::E207 => "empty entity model",
            ErrorCode::E208 => "script incompatible with engine",
            ErrorCode::E300 => "unknown flow source",
            ErrorCode::E301 => "unknown flow target",
            ErrorCode::E302 => "invalid condition",
            ErrorCode::E303 => "conditioned default flow",
            ErrorCode::E304 => "multiple default flows",
            ErrorCode::E400 => "missing start event",
            ErrorCode::E401 => "missing end event",
            ErrorCode::E402 => "start event with incoming flow",
            ErrorCode::E403 => "end event with outgoing flow",
            ErrorCode::E404 => "unreachable element",
            ErrorCode::W001 => "element not connected",
            ErrorCode::W002 => "missing process version",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E208.to_string(), "E208");
        assert_eq!(ErrorCode::E304.to_string(), "E304");
        assert_eq!(ErrorCode::W002.to_string(), "W002");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E200.description(), "duplicate element id");
        assert_eq!(ErrorCode::E404.description(), "unreachable element");
        assert_eq!(ErrorCode::W001.description(), "element not connected");
    }
}
