//! Wire types for the generated plan.
//!
//! These map directly to the JSON contract the generative service is
//! instructed to follow and are deserialized via `serde` + `serde_json`.
//! A plan is transient: it exists between one generation call and the
//! apply that persists its projection.

use serde::{Deserialize, Serialize};

use super::priority::PlanPriority;

/// Top-level structure of a generated plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    /// Short summary of the project this plan implements.
    pub project_summary: String,
    /// Optional team metadata. Shape-permissive: the service is free to
    /// structure this however it likes and no consumer depends on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<serde_json::Value>,
    /// Optional architecture sketch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<PlanArchitecture>,
    /// Optional technology stack recommendation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<PlanTechStack>,
    /// Ordered phases. Must be present; may be empty.
    pub phases: Vec<PlanPhase>,
}

/// A single phase spec within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanPhase {
    pub name: String,
    /// Position in the phase sequence. Must be unique within the plan.
    pub order: i32,
    /// What the phase is meant to achieve. Used as prompt context only;
    /// the store does not persist it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub tasks: Vec<PlanTask>,
}

/// A single task spec within a phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanTask {
    pub title: String,
    pub description: String,
    pub priority: PlanPriority,
    pub estimate_hours: f64,
}

/// Architecture metadata block. All fields optional so a partially filled
/// block never fails the whole plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanArchitecture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// e.g. "modular monolith", "microservices".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub modules: Vec<ArchitectureModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_flow: Option<String>,
}

/// One module in an architecture sketch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureModule {
    pub name: String,
    pub responsibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Technology stack metadata block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanTechStack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default)]
    pub backend: Vec<String>,
    #[serde(default)]
    pub frontend: Vec<String>,
    #[serde(default)]
    pub database: Vec<String>,
    #[serde(default)]
    pub infrastructure: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_and_tooling: Option<Vec<String>>,
}
