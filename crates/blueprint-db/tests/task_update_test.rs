//! Integration tests for partial task updates.

use blueprint_db::models::TaskStatus;
use blueprint_db::queries::tasks::TaskUpdate;
use blueprint_db::queries::{phases, projects, tasks};
use blueprint_test_utils::{create_test_db, drop_test_db};
use uuid::Uuid;

async fn seed_task(pool: &sqlx::PgPool) -> (Uuid, blueprint_db::models::Task) {
    let project = projects::insert_project(pool, "P", "idea", None)
        .await
        .unwrap();
    let phase = phases::insert_phase(pool, project.id, "Phase", 1)
        .await
        .unwrap();
    let task = tasks::insert_task(pool, phase.id, "title", Some("desc"), 2)
        .await
        .unwrap();
    (project.id, task)
}

#[tokio::test]
async fn update_single_field_keeps_others() {
    let (pool, db_name) = create_test_db().await;
    let (_, task) = seed_task(&pool).await;

    let updated = tasks::update_task_fields(
        &pool,
        task.id,
        &TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .expect("update should succeed")
    .expect("task should exist");

    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.title, "title");
    assert_eq!(updated.description.as_deref(), Some("desc"));
    assert_eq!(updated.priority, 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_multiple_fields() {
    let (pool, db_name) = create_test_db().await;
    let (_, task) = seed_task(&pool).await;

    let updated = tasks::update_task_fields(
        &pool,
        task.id,
        &TaskUpdate {
            title: Some("renamed"),
            priority: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.priority, 3);
    assert_eq!(updated.status, TaskStatus::Todo);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_missing_task_returns_none() {
    let (pool, db_name) = create_test_db().await;

    let result = tasks::update_task_fields(
        &pool,
        Uuid::new_v4(),
        &TaskUpdate {
            title: Some("ghost"),
            ..Default::default()
        },
    )
    .await
    .expect("update should not error");

    assert!(result.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn move_task_to_another_phase() {
    let (pool, db_name) = create_test_db().await;
    let (project_id, task) = seed_task(&pool).await;

    let other = phases::insert_phase(&pool, project_id, "Other", 2)
        .await
        .unwrap();

    let updated = tasks::update_task_fields(
        &pool,
        task.id,
        &TaskUpdate {
            phase_id: Some(other.id),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.phase_id, other.id);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_to_invalid_status_rejected_by_check() {
    let (pool, db_name) = create_test_db().await;
    let (_, task) = seed_task(&pool).await;

    // Bypass the typed enum to exercise the CHECK constraint directly.
    let result = sqlx::query("UPDATE tasks SET status = 'urgent' WHERE id = $1")
        .bind(task.id)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "CHECK constraint should reject 'urgent'");

    let unchanged = tasks::get_task(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, TaskStatus::Todo);

    pool.close().await;
    drop_test_db(&db_name).await;
}
