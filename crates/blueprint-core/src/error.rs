//! Error taxonomy for the core pipeline.
//!
//! Every error carries a machine-checkable [`ErrorCategory`] so transport
//! layers can map failures to status codes without string matching.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::generate::GenerationError;
use crate::plan::PlanShapeError;

/// Machine-checkable error category, distinct from the human-readable
/// message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadInput,
    NotFound,
    Upstream,
    InvalidPlan,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadInput => "bad_input",
            Self::NotFound => "not_found",
            Self::Upstream => "upstream",
            Self::InvalidPlan => "invalid_plan",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the core pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required request field is missing or malformed. Raised before any
    /// side effect.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity does not exist.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: Uuid },

    /// The generative service returned an error or the call failed in
    /// transit. The upstream status, when known, is preserved rather than
    /// masked.
    #[error("generation service failed: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// The generative service returned text that fails JSON parsing or
    /// schema validation. The raw text is preserved for diagnostics and is
    /// never coerced into a best-guess plan.
    #[error("generated plan failed validation: {source}")]
    InvalidPlanShape {
        source: PlanShapeError,
        raw: String,
    },

    /// A store-level failure during create/read/write.
    #[error("persistence failure: {0:#}")]
    Persistence(anyhow::Error),
}

impl CoreError {
    /// The machine-checkable category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::BadInput,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Upstream { .. } => ErrorCategory::Upstream,
            Self::InvalidPlanShape { .. } => ErrorCategory::InvalidPlan,
            Self::Persistence(_) => ErrorCategory::Internal,
        }
    }

    /// The upstream HTTP status, when this is an upstream failure that
    /// carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err)
    }
}

impl From<GenerationError> for CoreError {
    fn from(err: GenerationError) -> Self {
        Self::Upstream {
            status: err.status(),
            message: err.to_string(),
        }
    }
}
