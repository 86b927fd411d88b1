//! Prompt construction for each generation mode.
//!
//! Pure string assembly, no I/O. The JSON-producing prompts embed the exact
//! plan shape the validator expects; the free-text prompts (brief, risks,
//! spec, LaTeX doc) carry no JSON contract.

use serde::Deserialize;

use crate::plan::priority::PlanPriority;
use blueprint_db::models::TaskStatus;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input for the draft-brief mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftBriefInput {
    pub idea: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub dev_skills: Option<String>,
}

/// Input for the plan-from-brief mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequestInput {
    pub name: String,
    pub brief: String,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub dev_skills: Option<String>,
}

/// Snapshot of a project's current persisted state, rendered into the
/// replan and insight prompts.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    pub name: String,
    pub idea: String,
    pub dev_skills: Option<String>,
    pub phases: Vec<SnapshotPhase>,
}

/// One phase within a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotPhase {
    pub name: String,
    pub ordinal: i32,
    pub tasks: Vec<SnapshotTask>,
}

/// One task within a snapshot phase.
#[derive(Debug, Clone)]
pub struct SnapshotTask {
    pub title: String,
    pub status: TaskStatus,
    pub priority: PlanPriority,
}

// ---------------------------------------------------------------------------
// Shared blocks
// ---------------------------------------------------------------------------

/// JSON shape reference included in every plan-producing prompt.
const PLAN_SHAPE_REFERENCE: &str = r#"Return ONLY a valid JSON object with this exact shape:

{
  "projectSummary": string,
  "architecture": {
    "overview": string,
    "style": string,
    "modules": [
      { "name": string, "responsibility": string, "notes": string }
    ],
    "dataFlow": string
  },
  "techStack": {
    "rationale": string,
    "backend": [string],
    "frontend": [string],
    "database": [string],
    "infrastructure": [string],
    "testingAndTooling": [string]
  },
  "phases": [
    {
      "name": string,
      "order": number,
      "goal": string,
      "tasks": [
        {
          "title": string,
          "description": string,
          "priority": "low" | "medium" | "high",
          "estimateHours": number
        }
      ]
    }
  ]
}
"#;

/// Output rules included in every plan-producing prompt.
const PLAN_OUTPUT_RULES: &str = r#"Rules:
- Do NOT add any extra keys.
- Do NOT add comments or explanations.
- Do NOT wrap JSON in backticks.
- Phase order values must be unique.
- Keep text concise but clear.
"#;

fn or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "unknown",
    }
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}

/// Render a project snapshot as prompt context.
fn render_snapshot(snapshot: &ProjectSnapshot) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str(&format!("Project name: {}\n", snapshot.name));
    out.push_str(&format!("Project idea/brief:\n{}\n", snapshot.idea));
    out.push_str(&format!(
        "Team dev skills: {}\n",
        or_unknown(snapshot.dev_skills.as_deref())
    ));

    if snapshot.phases.is_empty() {
        out.push_str("\nCurrent plan: none (no phases yet).\n");
    } else {
        out.push_str("\nCurrent plan:\n");
        for phase in &snapshot.phases {
            out.push_str(&format!("- Phase {} ({})\n", phase.ordinal, phase.name));
            for task in &phase.tasks {
                out.push_str(&format!(
                    "  - [{}] {} (priority: {})\n",
                    task.status,
                    task.title,
                    task.priority.label()
                ));
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the draft-brief prompt: free-form markdown, no JSON contract.
pub fn build_draft_brief_prompt(input: &DraftBriefInput) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You are a product assistant. Draft a short, clear software project brief.\n\n",
    );
    prompt.push_str("Include sections:\n");
    prompt.push_str("- Problem\n");
    prompt.push_str("- Proposed solution\n");
    prompt.push_str("- Target users\n");
    prompt.push_str("- Constraints (team size, timeframe, team skills)\n");
    prompt.push_str("- 3-5 high-level goals as bullet points\n\n");
    prompt.push_str("Use markdown. Maximum 250-300 words.\n\n");

    prompt.push_str("Base information:\n");
    prompt.push_str(&format!("- Name: {}\n", or_na(input.name.as_deref())));
    prompt.push_str(&format!("- Idea: {}\n", input.idea));
    prompt.push_str(&format!(
        "- Team size: {}\n",
        or_na(input.team_size.as_deref())
    ));
    prompt.push_str(&format!(
        "- Timeframe: {}\n",
        or_na(input.timeframe.as_deref())
    ));
    prompt.push_str(&format!(
        "- Team skills: {}\n",
        or_na(input.dev_skills.as_deref())
    ));

    prompt
}

/// Build the plan-from-brief prompt: JSON contract, extended shape.
pub fn build_plan_from_brief_prompt(input: &PlanRequestInput) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are an AI project planner. The user has written and approved the \
         following project brief:\n\n",
    );
    prompt.push_str("---\n");
    prompt.push_str(&input.brief);
    prompt.push_str("\n---\n\n");
    prompt.push_str(&format!("Project name: {}\n", input.name));
    prompt.push_str(&format!(
        "Team size: {}\n",
        or_unknown(input.team_size.as_deref())
    ));
    prompt.push_str(&format!(
        "Timeframe: {}\n",
        or_unknown(input.timeframe.as_deref())
    ));
    prompt.push_str(&format!(
        "Team dev skills: {}\n\n",
        or_unknown(input.dev_skills.as_deref())
    ));
    prompt.push_str("Based on this brief, create a structured implementation plan.\n\n");

    prompt.push_str(PLAN_SHAPE_REFERENCE);
    prompt.push('\n');
    prompt.push_str(PLAN_OUTPUT_RULES);

    prompt
}

/// Build the replan prompt: same JSON contract, current state as context.
pub fn build_replan_prompt(snapshot: &ProjectSnapshot) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are an AI project planner. The user wants a fresh implementation \
         plan for an existing project. The current state is below; propose a \
         better plan from scratch. Completed work may inform your phasing but \
         the new plan replaces the old one entirely.\n\n",
    );
    prompt.push_str(&render_snapshot(snapshot));
    prompt.push('\n');

    prompt.push_str(PLAN_SHAPE_REFERENCE);
    prompt.push('\n');
    prompt.push_str(PLAN_OUTPUT_RULES);

    prompt
}

/// Build the risk-analysis prompt: free-form markdown.
pub fn build_risks_prompt(snapshot: &ProjectSnapshot) -> String {
    let mut prompt = String::with_capacity(1536);

    prompt.push_str(
        "You are a software delivery risk analyst. Analyze the project below \
         and produce a risk assessment.\n\n",
    );
    prompt.push_str(&render_snapshot(snapshot));
    prompt.push('\n');
    prompt.push_str(
        "List the top risks (technical, scope, team) with likelihood, impact, \
         and a concrete mitigation for each. Use markdown with one section per \
         risk category. Be specific to this project, not generic.\n",
    );

    prompt
}

/// Build the technical-spec prompt: free-form markdown.
pub fn build_spec_prompt(snapshot: &ProjectSnapshot) -> String {
    let mut prompt = String::with_capacity(1536);

    prompt.push_str(
        "You are a software architect. Write a concise technical specification \
         for the project below.\n\n",
    );
    prompt.push_str(&render_snapshot(snapshot));
    prompt.push('\n');
    prompt.push_str(
        "Cover: system overview, main components and their responsibilities, \
         data model sketch, external integrations, and open questions. Use \
         markdown headings. Keep it under 600 words.\n",
    );

    prompt
}

/// Build the LaTeX documentation prompt.
pub fn build_doc_tex_prompt(snapshot: &ProjectSnapshot) -> String {
    let mut prompt = String::with_capacity(1536);

    prompt.push_str(
        "You are a technical writer. Produce project documentation as a \
         complete, compilable LaTeX document for the project below.\n\n",
    );
    prompt.push_str(&render_snapshot(snapshot));
    prompt.push('\n');
    prompt.push_str(
        "Return ONLY LaTeX source, starting with \\documentclass and ending \
         with \\end{document}. Include sections for overview, plan phases, \
         and task tables. Do not wrap the output in backticks.\n",
    );

    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
