//! Integration tests for the atomic apply-plan operation and task updates.

use blueprint_core::CoreError;
use blueprint_core::plan::priority::PlanPriority;
use blueprint_core::plan::schema::{GeneratedPlan, PlanPhase, PlanTask};
use blueprint_core::plan::service;
use blueprint_db::models::TaskStatus;
use blueprint_db::queries::tasks::TaskUpdate;
use blueprint_db::queries::{projects, tasks};
use blueprint_test_utils::{create_test_db, drop_test_db};
use uuid::Uuid;

fn task(title: &str, priority: PlanPriority) -> PlanTask {
    PlanTask {
        title: title.to_owned(),
        description: format!("{title} description"),
        priority,
        estimate_hours: 2.0,
    }
}

fn two_phase_plan() -> GeneratedPlan {
    GeneratedPlan {
        project_summary: "Build a todo app".to_owned(),
        team: None,
        architecture: None,
        tech_stack: None,
        phases: vec![
            PlanPhase {
                name: "Setup".to_owned(),
                order: 1,
                goal: Some("bootstrap".to_owned()),
                tasks: vec![task("Init repo", PlanPriority::High)],
            },
            PlanPhase {
                name: "Build".to_owned(),
                order: 2,
                goal: None,
                tasks: vec![
                    task("Implement core", PlanPriority::Medium),
                    task("Write tests", PlanPriority::Low),
                ],
            },
        ],
    }
}

fn alternative_plan() -> GeneratedPlan {
    GeneratedPlan {
        project_summary: "Different direction".to_owned(),
        team: None,
        architecture: None,
        tech_stack: None,
        phases: vec![PlanPhase {
            name: "Rewrite".to_owned(),
            order: 1,
            goal: None,
            tasks: vec![task("Throw it away", PlanPriority::High)],
        }],
    }
}

async fn seed_project(pool: &sqlx::PgPool) -> Uuid {
    projects::insert_project(pool, "Demo", "Build X", None)
        .await
        .expect("insert_project should succeed")
        .id
}

// -----------------------------------------------------------------------
// apply_plan
// -----------------------------------------------------------------------

#[tokio::test]
async fn apply_then_get_matches_plan() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;

    let plan = two_phase_plan();
    let aggregate = service::apply_plan(&pool, project_id, &plan)
        .await
        .expect("apply should succeed");

    assert_eq!(aggregate.phases.len(), plan.phases.len());
    assert_eq!(aggregate.task_count(), 3);

    // Phases come back sorted by ordinal, matching plan order.
    assert_eq!(aggregate.phases[0].phase.name, "Setup");
    assert_eq!(aggregate.phases[0].phase.ordinal, 1);
    assert_eq!(aggregate.phases[1].phase.name, "Build");
    assert_eq!(aggregate.phases[1].phase.ordinal, 2);

    // Every task is todo with the mapped ordinal priority.
    let setup_task = &aggregate.phases[0].tasks[0];
    assert_eq!(setup_task.title, "Init repo");
    assert_eq!(setup_task.status, TaskStatus::Todo);
    assert_eq!(setup_task.priority, 3);

    let build_tasks = &aggregate.phases[1].tasks;
    assert_eq!(build_tasks[0].title, "Implement core");
    assert_eq!(build_tasks[0].priority, 2);
    assert_eq!(build_tasks[1].title, "Write tests");
    assert_eq!(build_tasks[1].priority, 1);
    assert!(build_tasks.iter().all(|t| t.status == TaskStatus::Todo));

    // A fresh read agrees with the aggregate the apply returned.
    let reread = service::get_project_aggregate(&pool, project_id)
        .await
        .unwrap();
    assert_eq!(reread.phases.len(), 2);
    assert_eq!(reread.task_count(), 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn apply_twice_yields_identical_shape() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;

    let plan = two_phase_plan();
    let first = service::apply_plan(&pool, project_id, &plan).await.unwrap();
    let second = service::apply_plan(&pool, project_id, &plan).await.unwrap();

    assert_eq!(first.phases.len(), second.phases.len());
    assert_eq!(first.task_count(), second.task_count());
    for (a, b) in first.phases.iter().zip(second.phases.iter()) {
        assert_eq!(a.phase.name, b.phase.name);
        assert_eq!(a.phase.ordinal, b.phase.ordinal);
        // Rows are recreated, so ids differ.
        assert_ne!(a.phase.id, b.phase.id);
        for (ta, tb) in a.tasks.iter().zip(b.tasks.iter()) {
            assert_eq!(ta.title, tb.title);
            assert_eq!(ta.priority, tb.priority);
            assert_eq!(ta.status, tb.status);
        }
    }

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn apply_replaces_previous_graph_completely() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;

    service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();
    let aggregate = service::apply_plan(&pool, project_id, &alternative_plan())
        .await
        .unwrap();

    assert_eq!(aggregate.phases.len(), 1);
    assert_eq!(aggregate.phases[0].phase.name, "Rewrite");
    assert_eq!(aggregate.task_count(), 1);
    assert_eq!(aggregate.phases[0].tasks[0].title, "Throw it away");

    // Nothing from the first plan survives anywhere in the database.
    let orphans: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE title = 'Init repo'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphans.0, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn apply_with_empty_phases_clears_graph() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;

    service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();

    let empty = GeneratedPlan {
        project_summary: "scrapped".to_owned(),
        team: None,
        architecture: None,
        tech_stack: None,
        phases: vec![],
    };
    let aggregate = service::apply_plan(&pool, project_id, &empty).await.unwrap();
    assert!(aggregate.phases.is_empty());
    assert_eq!(aggregate.task_count(), 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn apply_to_missing_project_is_not_found() {
    let (pool, db_name) = create_test_db().await;

    let err = service::apply_plan(&pool, Uuid::new_v4(), &two_phase_plan())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { what: "project", .. }), "got: {err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn failed_apply_rolls_back_previous_graph() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;

    service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();

    // Duplicate ordinals violate the UNIQUE constraint mid-transaction.
    // (The validator catches this shape upstream; here we force it through
    // to prove the transactional boundary.)
    let broken = GeneratedPlan {
        project_summary: "broken".to_owned(),
        team: None,
        architecture: None,
        tech_stack: None,
        phases: vec![
            PlanPhase {
                name: "A".to_owned(),
                order: 1,
                goal: None,
                tasks: vec![],
            },
            PlanPhase {
                name: "B".to_owned(),
                order: 1,
                goal: None,
                tasks: vec![],
            },
        ],
    };
    let err = service::apply_plan(&pool, project_id, &broken).await.unwrap_err();
    assert!(matches!(err, CoreError::Persistence(_)), "got: {err}");

    // The pre-apply graph is fully intact.
    let aggregate = service::get_project_aggregate(&pool, project_id)
        .await
        .unwrap();
    assert_eq!(aggregate.phases.len(), 2);
    assert_eq!(aggregate.phases[0].phase.name, "Setup");
    assert_eq!(aggregate.task_count(), 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn concurrent_applies_never_interleave() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;

    let plan_a = two_phase_plan();
    let plan_b = alternative_plan();

    let (ra, rb) = tokio::join!(
        service::apply_plan(&pool, project_id, &plan_a),
        service::apply_plan(&pool, project_id, &plan_b),
    );
    ra.expect("apply A should succeed");
    rb.expect("apply B should succeed");

    // Exactly one plan's graph is the final state -- never a mixture.
    let aggregate = service::get_project_aggregate(&pool, project_id)
        .await
        .unwrap();
    let names: Vec<&str> = aggregate
        .phases
        .iter()
        .map(|p| p.phase.name.as_str())
        .collect();

    let is_plan_a = names == ["Setup", "Build"] && aggregate.task_count() == 3;
    let is_plan_b = names == ["Rewrite"] && aggregate.task_count() == 1;
    assert!(
        is_plan_a || is_plan_b,
        "final state must match exactly one plan, got phases {names:?} with {} tasks",
        aggregate.task_count()
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// update_task
// -----------------------------------------------------------------------

#[tokio::test]
async fn update_task_rejects_empty_field_set() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;
    let aggregate = service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();
    let task_id = aggregate.phases[0].tasks[0].id;

    let err = service::update_task(&pool, task_id, &TaskUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)), "got: {err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_task_rejects_out_of_range_priority() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;
    let aggregate = service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();
    let original = aggregate.phases[0].tasks[0].clone();

    let err = service::update_task(
        &pool,
        original.id,
        &TaskUpdate {
            priority: Some(7),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)), "got: {err}");

    // Rejected before any write: the task is unmodified.
    let unchanged = tasks::get_task(&pool, original.id).await.unwrap().unwrap();
    assert_eq!(unchanged.priority, original.priority);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_task_missing_id_is_not_found() {
    let (pool, db_name) = create_test_db().await;

    let err = service::update_task(
        &pool,
        Uuid::new_v4(),
        &TaskUpdate {
            status: Some(TaskStatus::Done),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { what: "task", .. }), "got: {err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_task_to_missing_phase_is_not_found() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;
    let aggregate = service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();
    let task_id = aggregate.phases[0].tasks[0].id;

    let err = service::update_task(
        &pool,
        task_id,
        &TaskUpdate {
            phase_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { what: "phase", .. }), "got: {err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_task_status_transition() {
    let (pool, db_name) = create_test_db().await;
    let project_id = seed_project(&pool).await;
    let aggregate = service::apply_plan(&pool, project_id, &two_phase_plan())
        .await
        .unwrap();
    let task_id = aggregate.phases[0].tasks[0].id;

    let updated = service::update_task(
        &pool,
        task_id,
        &TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);

    pool.close().await;
    drop_test_db(&db_name).await;
}
