//! Validation of raw generative-service output into a typed plan.
//!
//! Parses a raw model response as JSON into a [`GeneratedPlan`] and
//! validates:
//! - Required fields and types (via serde; priority is a closed enum).
//! - Phase `order` values are unique within the plan.
//!
//! A Markdown code fence around the JSON is tolerated: the contract tells
//! the model not to add one, but models do it anyway.

use std::collections::HashSet;

use thiserror::Error;

use super::schema::GeneratedPlan;

/// Errors that can occur while parsing and validating a generated plan.
#[derive(Debug, Error)]
pub enum PlanShapeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate phase order {order} (phase {phase:?})")]
    DuplicatePhaseOrder { phase: String, order: i32 },
}

/// Parse and validate a raw model response.
///
/// Returns a typed [`GeneratedPlan`] or a descriptive error. Never
/// partially accepts: any failure rejects the whole plan. No side effects.
pub fn parse_generated_plan(raw: &str) -> Result<GeneratedPlan, PlanShapeError> {
    let plan: GeneratedPlan = serde_json::from_str(strip_code_fences(raw))?;
    validate(&plan)?;
    Ok(plan)
}

/// Validate plan-level invariants that serde cannot express.
fn validate(plan: &GeneratedPlan) -> Result<(), PlanShapeError> {
    let mut seen = HashSet::new();
    for phase in &plan.phases {
        if !seen.insert(phase.order) {
            return Err(PlanShapeError::DuplicatePhaseOrder {
                phase: phase.name.clone(),
                order: phase.order,
            });
        }
    }
    Ok(())
}

/// Strip a surrounding Markdown code fence, if present.
///
/// Handles ```json ... ``` and bare ``` ... ```. Anything else is returned
/// trimmed and unchanged; a half-open fence falls through to the JSON
/// parser, which produces the diagnostic.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = &rest[newline + 1..];
    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}
