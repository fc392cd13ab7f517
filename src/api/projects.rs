//! Project endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::error::{decode_body, message, require_name, ApiError, ApiPath};
use super::routes::AppState;
use crate::model::Project;
use crate::store::TodoStore;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /projects` and `PUT /projects/:project`.
#[derive(Debug, Deserialize)]
pub struct ProjectNameRequest {
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Look up a project or fail with a 404.
async fn find_project_or_404(
    store: &dyn TodoStore,
    name: &str,
) -> Result<Project, ApiError> {
    store
        .get_project(name)
        .await?
        .ok_or_else(|| ApiError::NotFound("No project with this name found".to_string()))
}

/// GET /projects - List all projects.
pub(super) async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.store.list_projects().await?))
}

/// POST /projects - Create a project.
pub(super) async fn create_project(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: ProjectNameRequest = decode_body(&body)?;
    require_name(&req.name)?;

    let project = state.store.create_project(&req.name).await?;
    tracing::info!(project = %project.name, id = project.id, "Created project");

    Ok(message(
        StatusCode::CREATED,
        format!("Project {} created", project.name),
    )
    .into_response())
}

/// GET /projects/:project - Fetch one project.
pub(super) async fn get_project(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Project>, ApiError> {
    find_project_or_404(state.store.as_ref(), &name)
        .await
        .map(Json)
}

/// DELETE /projects/:project - Delete a project and its tasks.
pub(super) async fn delete_project(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<Response, ApiError> {
    let project = find_project_or_404(state.store.as_ref(), &name).await?;
    state.store.delete_project(&project.name).await?;
    tracing::info!(project = %project.name, "Deleted project");

    Ok(message(StatusCode::OK, "Project deleted").into_response())
}

/// PUT /projects/:project - Rename a project.
pub(super) async fn update_project(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let mut project = find_project_or_404(state.store.as_ref(), &name).await?;

    let req: ProjectNameRequest = decode_body(&body)?;
    require_name(&req.name)?;

    project.name = req.name;
    state.store.update_project(&project).await?;
    tracing::info!(from = %name, to = %project.name, "Renamed project");

    Ok(message(StatusCode::OK, "Project successfully updated").into_response())
}

/// PUT /projects/:project/archive
pub(super) async fn archive_project(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<Response, ApiError> {
    let mut project = find_project_or_404(state.store.as_ref(), &name).await?;
    project.archive();
    state.store.update_project(&project).await?;
    tracing::info!(project = %project.name, "Archived project");

    Ok(message(StatusCode::OK, format!("Project {} archived", project.name)).into_response())
}

/// DELETE /projects/:project/archive
pub(super) async fn unarchive_project(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<Response, ApiError> {
    let mut project = find_project_or_404(state.store.as_ref(), &name).await?;
    project.unarchive();
    state.store.update_project(&project).await?;
    tracing::info!(project = %project.name, "Unarchived project");

    Ok(message(StatusCode::OK, format!("Project {} unarchived", project.name)).into_response())
}
