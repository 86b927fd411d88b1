//! Orchestrator: sequences generation, validation, and persistence for the
//! composite flows (create-with-plan, replan, insights).
//!
//! Holds the connection pool and an injected [`Generator`]; both are
//! constructed once at startup and passed in, never reached through global
//! state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use blueprint_db::models::Task;
use blueprint_db::queries::projects as project_queries;
use blueprint_db::queries::tasks::TaskUpdate;

use crate::error::CoreError;
use crate::generate::{
    DraftBriefInput, Generator, PlanRequestInput, ProjectSnapshot, PromptMode, SnapshotPhase,
    SnapshotTask, build_doc_tex_prompt, build_draft_brief_prompt, build_plan_from_brief_prompt,
    build_replan_prompt, build_risks_prompt, build_spec_prompt,
};
use crate::plan::priority::PlanPriority;
use crate::plan::schema::GeneratedPlan;
use crate::plan::service::{self, ProjectAggregate};
use crate::plan::validate::parse_generated_plan;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input for the create-with-plan flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub name: String,
    /// The approved brief the plan is generated from.
    pub brief: String,
    /// Original one-line idea. Falls back to the brief when absent.
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub dev_skills: Option<String>,
}

/// The three read-only insight generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Risks,
    Spec,
    DocTex,
}

impl InsightKind {
    fn prompt_mode(self) -> PromptMode {
        match self {
            Self::Risks => PromptMode::Risks,
            Self::Spec => PromptMode::Spec,
            Self::DocTex => PromptMode::DocTex,
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Risks => "risks",
            Self::Spec => "spec",
            Self::DocTex => "doc-tex",
        };
        f.write_str(s)
    }
}

impl FromStr for InsightKind {
    type Err = InsightKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risks" => Ok(Self::Risks),
            "spec" => Ok(Self::Spec),
            "doc-tex" | "doc" => Ok(Self::DocTex),
            other => Err(InsightKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`InsightKind`] string.
#[derive(Debug, Clone)]
pub struct InsightKindParseError(pub String);

impl fmt::Display for InsightKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid insight kind: {:?} (expected risks, spec, or doc-tex)", self.0)
    }
}

impl std::error::Error for InsightKindParseError {}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Composes the generation client, plan validator, and aggregate store.
pub struct Orchestrator {
    pool: PgPool,
    generator: Arc<dyn Generator>,
}

impl Orchestrator {
    pub fn new(pool: PgPool, generator: Arc<dyn Generator>) -> Self {
        Self { pool, generator }
    }

    /// Generate a draft brief from an idea. Free text, nothing persisted.
    pub async fn draft_brief(&self, input: &DraftBriefInput) -> Result<String, CoreError> {
        if input.idea.trim().is_empty() {
            return Err(CoreError::InvalidInput("field 'idea' is required".into()));
        }

        let prompt = build_draft_brief_prompt(input);
        info!(mode = %PromptMode::DraftBrief, "requesting generation");
        Ok(self.generator.complete(&prompt).await?)
    }

    /// Create a project and generate + persist its initial plan.
    ///
    /// The project row is created before the generation call so a prompt
    /// failure never loses the user's base info. If generation or
    /// validation fails afterwards, the project remains in an empty
    /// (zero-phase) state with a stable id the caller can retry against;
    /// no compensating delete is attempted.
    pub async fn create_with_plan(
        &self,
        input: &CreateProjectInput,
    ) -> Result<(ProjectAggregate, GeneratedPlan), CoreError> {
        if input.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("field 'name' is required".into()));
        }
        if input.brief.trim().is_empty() {
            return Err(CoreError::InvalidInput("field 'brief' is required".into()));
        }

        let idea = input.idea.as_deref().unwrap_or(&input.brief);
        let project = project_queries::insert_project(
            &self.pool,
            &input.name,
            idea,
            input.dev_skills.as_deref(),
        )
        .await?;
        info!(project_id = %project.id, name = %project.name, "project created");

        let request = PlanRequestInput {
            name: input.name.clone(),
            brief: input.brief.clone(),
            team_size: input.team_size.clone(),
            timeframe: input.timeframe.clone(),
            dev_skills: input.dev_skills.clone(),
        };
        let prompt = build_plan_from_brief_prompt(&request);
        info!(mode = %PromptMode::PlanFromBrief, project_id = %project.id, "requesting generation");

        let raw = match self.generator.complete(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(project_id = %project.id, error = %err,
                    "plan generation failed; project persists without phases");
                return Err(err.into());
            }
        };

        let plan = parse_generated_plan(&raw).map_err(|source| {
            warn!(project_id = %project.id, error = %source,
                "generated plan failed validation; project persists without phases");
            CoreError::InvalidPlanShape { source, raw }
        })?;

        let aggregate = service::apply_plan(&self.pool, project.id, &plan).await?;
        Ok((aggregate, plan))
    }

    /// Regenerate a candidate plan from current project state.
    ///
    /// Pure preview: nothing is written. Persisting the candidate requires
    /// an explicit [`Orchestrator::apply`] call, so a bad generation can
    /// never destroy existing work silently.
    pub async fn replan(&self, project_id: Uuid) -> Result<GeneratedPlan, CoreError> {
        let aggregate = service::get_project_aggregate(&self.pool, project_id).await?;
        let snapshot = snapshot_of(&aggregate);

        let prompt = build_replan_prompt(&snapshot);
        info!(mode = %PromptMode::Replan, project_id = %project_id, "requesting generation");
        let raw = self.generator.complete(&prompt).await?;

        parse_generated_plan(&raw).map_err(|source| CoreError::InvalidPlanShape { source, raw })
    }

    /// Atomically replace the project's phases/tasks with the given plan.
    pub async fn apply(
        &self,
        project_id: Uuid,
        plan: &GeneratedPlan,
    ) -> Result<ProjectAggregate, CoreError> {
        service::apply_plan(&self.pool, project_id, plan).await
    }

    /// Generate a read-only insight (risks, spec, or LaTeX doc) from the
    /// current project snapshot.
    pub async fn insight(
        &self,
        kind: InsightKind,
        project_id: Uuid,
    ) -> Result<String, CoreError> {
        let aggregate = service::get_project_aggregate(&self.pool, project_id).await?;
        let snapshot = snapshot_of(&aggregate);

        let prompt = match kind {
            InsightKind::Risks => build_risks_prompt(&snapshot),
            InsightKind::Spec => build_spec_prompt(&snapshot),
            InsightKind::DocTex => build_doc_tex_prompt(&snapshot),
        };
        info!(mode = %kind.prompt_mode(), project_id = %project_id, "requesting generation");
        Ok(self.generator.complete(&prompt).await?)
    }

    /// Fetch one project with nested phases/tasks.
    pub async fn get_project(&self, id: Uuid) -> Result<ProjectAggregate, CoreError> {
        service::get_project_aggregate(&self.pool, id).await
    }

    /// List all projects with nested phases/tasks, newest first.
    pub async fn list_projects(&self) -> Result<Vec<ProjectAggregate>, CoreError> {
        service::list_project_aggregates(&self.pool).await
    }

    /// Apply a partial update to a task.
    pub async fn update_task(
        &self,
        id: Uuid,
        update: &TaskUpdate<'_>,
    ) -> Result<Task, CoreError> {
        service::update_task(&self.pool, id, update).await
    }
}

/// Project snapshot for prompt context, derived from the stored aggregate.
fn snapshot_of(aggregate: &ProjectAggregate) -> ProjectSnapshot {
    ProjectSnapshot {
        name: aggregate.project.name.clone(),
        idea: aggregate.project.idea.clone(),
        dev_skills: aggregate.project.dev_skills.clone(),
        phases: aggregate
            .phases
            .iter()
            .map(|p| SnapshotPhase {
                name: p.phase.name.clone(),
                ordinal: p.phase.ordinal,
                tasks: p
                    .tasks
                    .iter()
                    .map(|t| SnapshotTask {
                        title: t.title.clone(),
                        status: t.status,
                        priority: PlanPriority::from_ordinal(t.priority),
                    })
                    .collect(),
            })
            .collect(),
    }
}
