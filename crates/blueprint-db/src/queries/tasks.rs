//! Database query functions for the `tasks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Task, TaskStatus};

/// Insert a new task row. Returns the inserted task with server-generated
/// defaults (id, seq, status, created_at).
pub async fn insert_task(
    pool: &PgPool,
    phase_id: Uuid,
    title: &str,
    description: Option<&str>,
    priority: i32,
) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (phase_id, title, description, priority) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(phase_id)
    .bind(title)
    .bind(description)
    .bind(priority)
    .fetch_one(pool)
    .await
    .context("failed to insert task")?;

    Ok(task)
}

/// Fetch a single task by ID.
pub async fn get_task(pool: &PgPool, id: Uuid) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task")?;

    Ok(task)
}

/// List all tasks belonging to a project (through its phases), in insertion
/// order.
pub async fn list_tasks_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT t.* FROM tasks t \
         JOIN phases p ON p.id = t.phase_id \
         WHERE p.project_id = $1 \
         ORDER BY t.seq ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for project")?;

    Ok(tasks)
}

/// Partial update of a task row.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<TaskStatus>,
    pub priority: Option<i32>,
    pub phase_id: Option<Uuid>,
}

impl TaskUpdate<'_> {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.phase_id.is_none()
    }
}

/// Apply a partial update to a task. Unset fields keep their current value.
///
/// Returns the updated row, or `None` when no task with the given ID exists.
/// Value constraints (status enum, priority range) are expected to be
/// enforced by the caller before this write; the CHECK constraints are the
/// last line of defence.
pub async fn update_task_fields(
    pool: &PgPool,
    id: Uuid,
    update: &TaskUpdate<'_>,
) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks \
         SET title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             status = COALESCE($4, status), \
             priority = COALESCE($5, priority), \
             phase_id = COALESCE($6, phase_id) \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(update.title)
    .bind(update.description)
    .bind(update.status)
    .bind(update.priority)
    .bind(update.phase_id)
    .fetch_optional(pool)
    .await
    .context("failed to update task")?;

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_detected() {
        let update = TaskUpdate::default();
        assert!(update.is_empty());
    }

    #[test]
    fn update_with_any_field_is_not_empty() {
        let update = TaskUpdate {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
