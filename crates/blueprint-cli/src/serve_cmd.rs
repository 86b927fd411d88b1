use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use blueprint_core::generate::DraftBriefInput;
use blueprint_core::orchestrator::{CreateProjectInput, InsightKind};
use blueprint_core::plan::GeneratedPlan;
use blueprint_core::{CoreError, ErrorCategory, Orchestrator};
use blueprint_db::models::TaskStatus;
use blueprint_db::queries::tasks::TaskUpdate;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Transport-level error: an HTTP status plus the machine-checkable
/// category and human-readable detail, serialized as the response body.
pub struct AppError {
    status: StatusCode,
    category: ErrorCategory,
    message: String,
    /// Raw model output, present only for invalid-plan failures.
    raw: Option<String>,
}

impl AppError {
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            category: ErrorCategory::BadInput,
            message: msg.into(),
            raw: None,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let category = err.category();
        let status = match category {
            ErrorCategory::BadInput => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            // Surface the upstream status when the service gave one, rather
            // than masking everything as a generic failure.
            ErrorCategory::Upstream => err
                .upstream_status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ErrorCategory::InvalidPlan => StatusCode::BAD_GATEWAY,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let raw = match &err {
            CoreError::InvalidPlanShape { raw, .. } => Some(raw.clone()),
            _ => None,
        };
        Self {
            status,
            category,
            message: format!("{err:#}"),
            raw,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let mut body = json!({
            "category": self.category.to_string(),
            "error": self.message,
        });
        if let Some(raw) = self.raw {
            body["raw"] = json!(raw);
        }
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Create-with-agents body. Required fields are optional here so their
/// absence maps to a 400 with a category rather than a deserialization
/// rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    name: Option<String>,
    brief: Option<String>,
    #[serde(default)]
    idea: Option<String>,
    #[serde(default)]
    team_size: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
    #[serde(default)]
    dev_skills: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftBriefRequest {
    idea: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    team_size: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
    #[serde(default)]
    dev_skills: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectIdRequest {
    project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct ApplyPlanRequest {
    plan: GeneratedPlan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    phase_id: Option<Uuid>,
}

fn required(field: Option<String>, msg: &str) -> Result<String, AppError> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::bad_input(msg)),
    }
}

fn required_id(field: Option<Uuid>) -> Result<Uuid, AppError> {
    field.ok_or_else(|| AppError::bad_input("Field 'projectId' is required."))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/create-with-agents", post(create_with_agents))
        .route("/projects/{id}", get(get_project))
        .route("/projects/{id}/apply-plan", post(apply_plan))
        .route("/tasks/{id}", patch(update_task))
        .route("/generate/draft-brief", post(draft_brief))
        .route("/generate/project-replan", post(project_replan))
        .route("/generate/project-risks", post(project_risks))
        .route("/generate/project-spec", post(project_spec))
        .route("/generate/project-doc-tex", post(project_doc_tex))
        .layer(CorsLayer::permissive())
        .with_state(orchestrator)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(orchestrator: Arc<Orchestrator>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(orchestrator);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("blueprint serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("blueprint serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_projects(
    State(orchestrator): State<Arc<Orchestrator>>,
) -> Result<axum::response::Response, AppError> {
    let projects = orchestrator.list_projects().await?;
    Ok(Json(json!({ "projects": projects })).into_response())
}

async fn get_project(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let project = orchestrator.get_project(id).await?;
    Ok(Json(json!({ "project": project })).into_response())
}

async fn create_with_agents(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<axum::response::Response, AppError> {
    let name = required(req.name, "Fields 'name' and 'brief' are required.")?;
    let brief = required(req.brief, "Fields 'name' and 'brief' are required.")?;

    let input = CreateProjectInput {
        name,
        brief,
        idea: req.idea,
        team_size: req.team_size,
        timeframe: req.timeframe,
        dev_skills: req.dev_skills,
    };
    let (project, plan) = orchestrator.create_with_plan(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "project": project, "planMeta": plan })),
    )
        .into_response())
}

async fn apply_plan(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyPlanRequest>,
) -> Result<axum::response::Response, AppError> {
    let project = orchestrator.apply(id, &req.plan).await?;
    Ok(Json(json!({ "project": project, "planMeta": req.plan })).into_response())
}

async fn update_task(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<axum::response::Response, AppError> {
    // Convert the status string to the closed enum at the boundary; any
    // other value is rejected before the store is touched.
    let status = match req.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<TaskStatus>()
                .map_err(|e| AppError::bad_input(e.to_string()))?,
        ),
        None => None,
    };

    let update = TaskUpdate {
        title: req.title.as_deref(),
        description: req.description.as_deref(),
        status,
        priority: req.priority,
        phase_id: req.phase_id,
    };
    let task = orchestrator.update_task(id, &update).await?;
    Ok(Json(json!({ "task": task })).into_response())
}

async fn draft_brief(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<DraftBriefRequest>,
) -> Result<axum::response::Response, AppError> {
    let idea = required(req.idea, "Field 'idea' is required as string.")?;

    let input = DraftBriefInput {
        idea,
        name: req.name,
        team_size: req.team_size,
        timeframe: req.timeframe,
        dev_skills: req.dev_skills,
    };
    let brief = orchestrator.draft_brief(&input).await?;
    Ok(Json(json!({ "brief": brief })).into_response())
}

async fn project_replan(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<axum::response::Response, AppError> {
    let id = required_id(req.project_id)?;
    let plan = orchestrator.replan(id).await?;
    Ok(Json(json!({ "plan": plan })).into_response())
}

async fn project_risks(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<axum::response::Response, AppError> {
    let id = required_id(req.project_id)?;
    let risks = orchestrator.insight(InsightKind::Risks, id).await?;
    Ok(Json(json!({ "risks": risks })).into_response())
}

async fn project_spec(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<axum::response::Response, AppError> {
    let id = required_id(req.project_id)?;
    let spec = orchestrator.insight(InsightKind::Spec, id).await?;
    Ok(Json(json!({ "spec": spec })).into_response())
}

async fn project_doc_tex(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<axum::response::Response, AppError> {
    let id = required_id(req.project_id)?;
    let tex = orchestrator.insight(InsightKind::DocTex, id).await?;
    Ok(Json(json!({ "tex": tex })).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
