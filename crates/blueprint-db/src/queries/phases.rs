//! Database query functions for the `phases` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Phase;

/// Insert a new phase row.
///
/// `ordinal` must be unique within the project; the UNIQUE constraint on
/// `(project_id, ordinal)` rejects duplicates.
pub async fn insert_phase(
    pool: &PgPool,
    project_id: Uuid,
    name: &str,
    ordinal: i32,
) -> Result<Phase> {
    let phase = sqlx::query_as::<_, Phase>(
        "INSERT INTO phases (project_id, name, ordinal) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(project_id)
    .bind(name)
    .bind(ordinal)
    .fetch_one(pool)
    .await
    .context("failed to insert phase")?;

    Ok(phase)
}

/// Fetch a single phase by ID.
pub async fn get_phase(pool: &PgPool, id: Uuid) -> Result<Option<Phase>> {
    let phase = sqlx::query_as::<_, Phase>("SELECT * FROM phases WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch phase")?;

    Ok(phase)
}

/// List all phases for a project, ordered by ordinal ascending.
pub async fn list_phases_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Phase>> {
    let phases = sqlx::query_as::<_, Phase>(
        "SELECT * FROM phases WHERE project_id = $1 ORDER BY ordinal ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list phases for project")?;

    Ok(phases)
}
