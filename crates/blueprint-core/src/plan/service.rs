//! Aggregate service over the project graph.
//!
//! Reads return the full Project -> Phase -> Task aggregate with phases
//! ordered by ordinal and tasks in insertion order. The one
//! correctness-critical mutation is [`apply_plan`]: it atomically replaces
//! a project's entire phase/task graph inside a single transaction.

use std::collections::HashMap;

use anyhow::Context;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use blueprint_db::models::{Phase, Project, Task};
use blueprint_db::queries::tasks::TaskUpdate;
use blueprint_db::queries::{phases as phase_queries, projects as project_queries,
    tasks as task_queries};

use crate::error::CoreError;
use super::schema::GeneratedPlan;

/// A phase with its tasks, nested for aggregate responses.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseWithTasks {
    #[serde(flatten)]
    pub phase: Phase,
    pub tasks: Vec<Task>,
}

/// A project with its full phase/task graph.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAggregate {
    #[serde(flatten)]
    pub project: Project,
    pub phases: Vec<PhaseWithTasks>,
}

impl ProjectAggregate {
    /// Total number of tasks across all phases.
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }
}

/// Nest a project's phases and tasks into an aggregate.
fn assemble(project: Project, phases: Vec<Phase>, tasks: Vec<Task>) -> ProjectAggregate {
    let mut by_phase: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_phase.entry(task.phase_id).or_default().push(task);
    }

    let phases = phases
        .into_iter()
        .map(|phase| {
            let tasks = by_phase.remove(&phase.id).unwrap_or_default();
            PhaseWithTasks { phase, tasks }
        })
        .collect();

    ProjectAggregate { project, phases }
}

/// Fetch a project with phases (ordinal ascending) and tasks (insertion
/// order).
pub async fn get_project_aggregate(
    pool: &PgPool,
    id: Uuid,
) -> Result<ProjectAggregate, CoreError> {
    let project = project_queries::get_project(pool, id)
        .await?
        .ok_or(CoreError::NotFound { what: "project", id })?;

    let phases = phase_queries::list_phases_for_project(pool, id).await?;
    let tasks = task_queries::list_tasks_for_project(pool, id).await?;

    Ok(assemble(project, phases, tasks))
}

/// List all projects with nested phases/tasks, newest first.
pub async fn list_project_aggregates(pool: &PgPool) -> Result<Vec<ProjectAggregate>, CoreError> {
    let projects = project_queries::list_projects(pool).await?;

    let mut aggregates = Vec::with_capacity(projects.len());
    for project in projects {
        let phases = phase_queries::list_phases_for_project(pool, project.id).await?;
        let tasks = task_queries::list_tasks_for_project(pool, project.id).await?;
        aggregates.push(assemble(project, phases, tasks));
    }

    Ok(aggregates)
}

/// Atomically replace a project's entire phase/task graph with the given
/// plan.
///
/// Inside a single transaction: re-check the project exists (with a row
/// lock, so concurrent applies against the same project serialize), delete
/// all existing tasks, delete all existing phases, then create phases in
/// the plan's order and their tasks with mapped priorities. Every created
/// task starts as `todo`; an applied plan never inherits prior statuses.
///
/// If any step fails the transaction rolls back and the pre-apply graph
/// remains visible. Applies against different projects are independent.
pub async fn apply_plan(
    pool: &PgPool,
    project_id: Uuid,
    plan: &GeneratedPlan,
) -> Result<ProjectAggregate, CoreError> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    // Existence re-check inside the transaction. FOR UPDATE locks the
    // project row until commit, so a second in-flight apply for the same
    // project waits here instead of interleaving its writes.
    let locked: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await
            .context("failed to lock project row")?;

    if locked.is_none() {
        // Transaction rolls back on drop (no commit).
        return Err(CoreError::NotFound {
            what: "project",
            id: project_id,
        });
    }

    // Tasks first, then phases: children before owners.
    sqlx::query(
        "DELETE FROM tasks WHERE phase_id IN \
         (SELECT id FROM phases WHERE project_id = $1)",
    )
    .bind(project_id)
    .execute(&mut *tx)
    .await
    .context("failed to delete existing tasks")?;

    sqlx::query("DELETE FROM phases WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await
        .context("failed to delete existing phases")?;

    for phase_spec in &plan.phases {
        let phase: Phase = sqlx::query_as(
            "INSERT INTO phases (project_id, name, ordinal) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(project_id)
        .bind(&phase_spec.name)
        .bind(phase_spec.order)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert phase {:?}", phase_spec.name))?;

        for task_spec in &phase_spec.tasks {
            sqlx::query(
                "INSERT INTO tasks (phase_id, title, description, priority, status) \
                 VALUES ($1, $2, $3, $4, 'todo')",
            )
            .bind(phase.id)
            .bind(&task_spec.title)
            .bind(&task_spec.description)
            .bind(task_spec.priority.ordinal())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert task {:?}", task_spec.title))?;
        }
    }

    tx.commit().await.context("failed to commit transaction")?;

    tracing::info!(
        project_id = %project_id,
        phases = plan.phases.len(),
        tasks = plan.phases.iter().map(|p| p.tasks.len()).sum::<usize>(),
        "plan applied"
    );

    get_project_aggregate(pool, project_id).await
}

/// Apply a partial update to a task.
///
/// Rejects an empty field set and out-of-range priorities before touching
/// the store; the status field is already a closed enum by the time it
/// reaches this function. A missing task or target phase is reported, not
/// silently ignored.
pub async fn update_task(
    pool: &PgPool,
    id: Uuid,
    update: &TaskUpdate<'_>,
) -> Result<Task, CoreError> {
    if update.is_empty() {
        return Err(CoreError::InvalidInput("no fields to update".into()));
    }

    if let Some(priority) = update.priority {
        if !(1..=3).contains(&priority) {
            return Err(CoreError::InvalidInput(format!(
                "priority must be 1 (low), 2 (medium), or 3 (high); got {priority}"
            )));
        }
    }

    if let Some(phase_id) = update.phase_id {
        if phase_queries::get_phase(pool, phase_id).await?.is_none() {
            return Err(CoreError::NotFound {
                what: "phase",
                id: phase_id,
            });
        }
    }

    match task_queries::update_task_fields(pool, id, update).await? {
        Some(task) => Ok(task),
        None => Err(CoreError::NotFound { what: "task", id }),
    }
}
