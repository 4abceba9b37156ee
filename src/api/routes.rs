// ABOUTME: HTTP route handlers for workflow submission and queries
// ABOUTME: Thin adapter translating requests into factory and store calls

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ApiError;
use super::state::ApiState;
use crate::parser::DEFAULT_WORKFLOW_NAME;
use crate::store::{Store, TaskStatus, WorkflowStatus};

/// Builds the workflow API router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/analysis", post(create_analysis))
        .route("/workflow/:id/status", get(workflow_status))
        .route("/workflow/:id/results", get(workflow_results))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAnalysisRequest {
    client_id: String,
    geo_json: Value,
    #[serde(default)]
    workflow_name: Option<String>,
}

async fn create_analysis(
    State(state): State<ApiState>,
    Json(request): Json<CreateAnalysisRequest>,
) -> Result<Response, ApiError> {
    let workflow_name = request
        .workflow_name
        .as_deref()
        .unwrap_or(DEFAULT_WORKFLOW_NAME);

    let definition = state.library.get(workflow_name).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid workflow: unknown workflow definition '{}'",
            workflow_name
        ))
    })?;

    let payload = request.geo_json.to_string();
    let workflow = state
        .factory
        .create(definition, &request.client_id, &payload)
        .await?;

    info!(
        "Accepted analysis request from client {} as workflow {}",
        request.client_id, workflow.workflow_id
    );

    let body = Json(json!({
        "workflowId": workflow.workflow_id,
        "message": "Workflow created and queued for processing",
    }));
    Ok((StatusCode::ACCEPTED, body).into_response())
}

async fn workflow_status(
    State(state): State<ApiState>,
    Path(workflow_id): Path<String>,
) -> Result<Response, ApiError> {
    let workflow = state
        .store
        .get_workflow(&workflow_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Workflow not found: {}", workflow_id)))?;

    let tasks = state
        .store
        .list_tasks_by_workflow(&workflow_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();

    let body = Json(json!({
        "workflowId": workflow.workflow_id,
        "status": workflow.status,
        "completedTasks": completed,
        "totalTasks": tasks.len(),
    }));
    Ok(body.into_response())
}

async fn workflow_results(
    State(state): State<ApiState>,
    Path(workflow_id): Path<String>,
) -> Result<Response, ApiError> {
    let workflow = state
        .store
        .get_workflow(&workflow_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Workflow not found: {}", workflow_id)))?;

    if workflow.status != WorkflowStatus::Completed {
        let body = Json(json!({
            "message": "Workflow is not yet completed",
            "workflowId": workflow.workflow_id,
            "status": workflow.status,
        }));
        return Ok((StatusCode::BAD_REQUEST, body).into_response());
    }

    // Stored serialized; returned parsed, raw string if parsing fails.
    let final_result = workflow
        .final_result
        .as_deref()
        .map(|raw| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
        .unwrap_or(Value::Null);

    let body = Json(json!({
        "workflowId": workflow.workflow_id,
        "status": workflow.status,
        "finalResult": final_result,
    }));
    Ok(body.into_response())
}
