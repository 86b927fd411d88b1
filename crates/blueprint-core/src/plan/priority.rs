//! Bidirectional mapping between the semantic task priority used on the
//! wire ("low"/"medium"/"high") and the ordinal stored in the database
//! (1/2/3).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic task priority as produced by the generative service.
///
/// Converted to its ordinal exactly once, at the validation edge; the
/// semantic string never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanPriority {
    Low,
    Medium,
    High,
}

impl PlanPriority {
    /// The stored ordinal: low = 1, medium = 2, high = 3.
    pub fn ordinal(self) -> i32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Map a stored ordinal back for display.
    ///
    /// Total over all inputs: anything at or above 3 reads as high, exactly
    /// 2 as medium, everything else (including out-of-range garbage) as low.
    /// Storage is never rewritten from this direction.
    pub fn from_ordinal(ordinal: i32) -> Self {
        if ordinal >= 3 {
            Self::High
        } else if ordinal == 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Capitalized label for prompts and human-facing output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for PlanPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanPriority {
    type Err = PlanPriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(PlanPriorityParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PlanPriority`] string.
#[derive(Debug, Clone)]
pub struct PlanPriorityParseError(pub String);

impl fmt::Display for PlanPriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid priority: {:?}", self.0)
    }
}

impl std::error::Error for PlanPriorityParseError {}
