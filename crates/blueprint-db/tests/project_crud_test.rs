//! Integration tests for project, phase, and task CRUD operations.
//!
//! Each test creates a unique temporary database via `blueprint-test-utils`,
//! runs migrations, and drops it on completion so tests are fully isolated.

use blueprint_db::models::TaskStatus;
use blueprint_db::queries::{phases, projects, tasks};
use blueprint_test_utils::{create_test_db, drop_test_db};
use uuid::Uuid;

// -----------------------------------------------------------------------
// Project CRUD
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_and_get_project() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "Demo", "Build X", Some("Rust, SQL"))
        .await
        .expect("insert_project should succeed");

    assert_eq!(project.name, "Demo");
    assert_eq!(project.idea, "Build X");
    assert_eq!(project.dev_skills.as_deref(), Some("Rust, SQL"));

    let fetched = projects::get_project(&pool, project.id)
        .await
        .expect("get_project should succeed")
        .expect("project should exist");

    assert_eq!(fetched.id, project.id);
    assert_eq!(fetched.name, "Demo");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn get_project_returns_none_for_missing_id() {
    let (pool, db_name) = create_test_db().await;

    let result = projects::get_project(&pool, Uuid::new_v4())
        .await
        .expect("get_project should not error");

    assert!(result.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_projects_newest_first() {
    let (pool, db_name) = create_test_db().await;

    let first = projects::insert_project(&pool, "First", "idea a", None)
        .await
        .unwrap();
    // Force distinct created_at values: now() has microsecond resolution but
    // both inserts can land in the same tick on a fast machine.
    sqlx::query("UPDATE projects SET created_at = created_at - interval '1 second' WHERE id = $1")
        .bind(first.id)
        .execute(&pool)
        .await
        .unwrap();
    let second = projects::insert_project(&pool, "Second", "idea b", None)
        .await
        .unwrap();

    let all = projects::list_projects(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id, "newest project should come first");
    assert_eq!(all[1].id, first.id);

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Phase CRUD
// -----------------------------------------------------------------------

#[tokio::test]
async fn phases_list_in_ordinal_order() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "Ordered", "idea", None)
        .await
        .unwrap();

    // Insert out of order with a gap; listing must sort by ordinal.
    phases::insert_phase(&pool, project.id, "Launch", 5)
        .await
        .unwrap();
    phases::insert_phase(&pool, project.id, "Setup", 1)
        .await
        .unwrap();
    phases::insert_phase(&pool, project.id, "Build", 3)
        .await
        .unwrap();

    let listed = phases::list_phases_for_project(&pool, project.id)
        .await
        .unwrap();
    let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Setup", "Build", "Launch"]);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn duplicate_phase_ordinal_rejected() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "Dup", "idea", None)
        .await
        .unwrap();

    phases::insert_phase(&pool, project.id, "A", 1).await.unwrap();
    let result = phases::insert_phase(&pool, project.id, "B", 1).await;
    assert!(result.is_err(), "duplicate ordinal should violate UNIQUE");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn deleting_project_cascades_to_phases_and_tasks() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "Cascade", "idea", None)
        .await
        .unwrap();
    let phase = phases::insert_phase(&pool, project.id, "Only", 1)
        .await
        .unwrap();
    let task = tasks::insert_task(&pool, phase.id, "t", None, 1).await.unwrap();

    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(phases::get_phase(&pool, phase.id).await.unwrap().is_none());
    assert!(tasks::get_task(&pool, task.id).await.unwrap().is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Task CRUD
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_task_defaults_to_todo() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "P", "idea", None)
        .await
        .unwrap();
    let phase = phases::insert_phase(&pool, project.id, "Phase", 1)
        .await
        .unwrap();

    let task = tasks::insert_task(&pool, phase.id, "Init repo", Some("create scaffold"), 3)
        .await
        .expect("insert_task should succeed");

    assert_eq!(task.phase_id, phase.id);
    assert_eq!(task.title, "Init repo");
    assert_eq!(task.description.as_deref(), Some("create scaffold"));
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.priority, 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn tasks_list_in_insertion_order() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "P", "idea", None)
        .await
        .unwrap();
    let phase_a = phases::insert_phase(&pool, project.id, "A", 1).await.unwrap();
    let phase_b = phases::insert_phase(&pool, project.id, "B", 2).await.unwrap();

    tasks::insert_task(&pool, phase_a.id, "first", None, 1)
        .await
        .unwrap();
    tasks::insert_task(&pool, phase_b.id, "second", None, 2)
        .await
        .unwrap();
    tasks::insert_task(&pool, phase_a.id, "third", None, 3)
        .await
        .unwrap();

    let listed = tasks::list_tasks_for_project(&pool, project.id)
        .await
        .unwrap();
    let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn out_of_range_priority_rejected_by_check() {
    let (pool, db_name) = create_test_db().await;

    let project = projects::insert_project(&pool, "P", "idea", None)
        .await
        .unwrap();
    let phase = phases::insert_phase(&pool, project.id, "Phase", 1)
        .await
        .unwrap();

    let result = tasks::insert_task(&pool, phase.id, "bad", None, 9).await;
    assert!(result.is_err(), "priority 9 should violate CHECK constraint");

    pool.close().await;
    drop_test_db(&db_name).await;
}
