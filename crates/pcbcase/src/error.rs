//! Error types for enclosure generation.

use pcbcase_ir::IrError;
use thiserror::Error;

/// Result type alias for enclosure operations.
pub type CaseResult<T> = Result<T, CaseError>;

/// Errors that can occur while loading a configuration or building an enclosure.
///
/// Geometry that is merely infeasible (a post wider than its clearance, a
/// restriction box swallowing a post) is not an error; only clearly
/// nonsensical parameters are rejected.
#[derive(Debug, Error)]
pub enum CaseError {
    /// A parameter is outside its meaningful range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Reading a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The produced CSG tree is malformed.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

impl CaseError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::InvalidConfiguration(details.into())
    }
}
