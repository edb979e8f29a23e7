//! Error types for scope resolution
//!
//! Three families, per the propagation policy:
//! - `ParameterValidation` - malformed inputs to a public entry point;
//!   surfaced synchronously to the immediate caller, never retried.
//! - `Configuration` - a content/authoring bug (unknown clothing mode,
//!   unregistered operator, condition-reference cycle); logged at error
//!   severity where raised, never silently swallowed.
//! - `Resolution` - a resolver or service failed mid-traversal. Clothing
//!   sub-steps contain these locally and degrade to an empty sub-result;
//!   everything else propagates unchanged.

use thiserror::Error;

use storyforge_domain::DomainError;

/// Unified error type for the scope resolution engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScopeError {
    /// Malformed input to a public entry point
    #[error("Invalid parameter in {source_name}: expected {expected}, received {received}")]
    ParameterValidation {
        /// The entry point that rejected the input
        source_name: String,
        expected: String,
        received: String,
        /// Optional guidance for the caller
        hint: Option<String>,
    },

    /// Content/authoring bug: unknown mode, unregistered operator,
    /// condition-reference cycle
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A resolver or service failed mid-traversal
    #[error("Resolution failed at {path}: {message}")]
    Resolution { path: String, message: String },
}

impl ScopeError {
    /// Create a parameter validation error
    pub fn parameter_validation(
        source_name: impl Into<String>,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        Self::ParameterValidation {
            source_name: source_name.into(),
            expected: expected.into(),
            received: received.into(),
            hint: None,
        }
    }

    /// Attach a caller-facing hint to a parameter validation error
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            Self::ParameterValidation {
                source_name,
                expected,
                received,
                ..
            } => Self::ParameterValidation {
                source_name,
                expected,
                received,
                hint: Some(hint.into()),
            },
            other => other,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<DomainError> for ScopeError {
    fn from(err: DomainError) -> Self {
        match err {
            // Parse failures on mode/layer names are mod-authoring defects
            DomainError::Parse(msg) => Self::configuration(msg),
            other => Self::resolution("domain", other.to_string()),
        }
    }
}
