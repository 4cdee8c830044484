//! Shared validation error type.

use thiserror::Error;

/// Out-of-range or non-finite numeric input to a pure construction.
///
/// Raised before any I/O happens; a table or mask is never built from a
/// parameter set that would poison it with NaN or degenerate values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid parameter {name}: {value}")]
pub struct InvalidParameterError {
    /// Parameter name as spelled in the public API.
    pub name: &'static str,
    /// The offending value.
    pub value: f32,
}

impl InvalidParameterError {
    pub(crate) fn new(name: &'static str, value: f32) -> Self {
        Self { name, value }
    }
}
