//! Task endpoints, nested under `/projects/:project/tasks`.
//!
//! Every handler resolves the owning project first, then the task, so a
//! missing project is reported before a missing task.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::error::{decode_body, message, require_name, ApiError, ApiPath};
use super::routes::AppState;
use crate::model::{NewTask, Priority, Project, Task};
use crate::store::TodoStore;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /projects/:project/tasks`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
}

/// Body of `PUT /projects/:project/tasks/:task`.
///
/// An absent `deadline` keeps the current one, `"deadline": null` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub name: String,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

/// Wrap any value that is present in the body, `null` included, in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookups
// ─────────────────────────────────────────────────────────────────────────────

async fn find_project_for_task(store: &dyn TodoStore, name: &str) -> Result<Project, ApiError> {
    store
        .get_project(name)
        .await?
        .ok_or_else(|| ApiError::NotFound("No project with that name exists".to_string()))
}

/// Look up a task by project and task name, 404 on either missing.
async fn find_task_or_404(
    store: &dyn TodoStore,
    project_name: &str,
    task_name: &str,
) -> Result<Task, ApiError> {
    find_project_for_task(store, project_name).await?;
    store
        .get_task(project_name, task_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("No task with that name exists".to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /projects/:project/tasks/:task
pub(super) async fn get_task(
    State(state): State<Arc<AppState>>,
    ApiPath((project_name, task_name)): ApiPath<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    find_task_or_404(state.store.as_ref(), &project_name, &task_name)
        .await
        .map(Json)
}

/// POST /projects/:project/tasks - Create a task in the project.
pub(super) async fn create_task(
    State(state): State<Arc<AppState>>,
    ApiPath(project_name): ApiPath<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: CreateTaskRequest = decode_body(&body)?;
    let project = find_project_for_task(state.store.as_ref(), &project_name).await?;
    require_name(&req.name)?;

    let task = state
        .store
        .create_task(NewTask {
            name: req.name,
            priority: req.priority,
            deadline: req.deadline,
            done: req.done,
            project_id: project.id,
        })
        .await?;
    tracing::info!(project = %project.name, task = %task.name, id = task.id, "Created task");

    Ok(message(
        StatusCode::CREATED,
        format!("Task {} for project {} created", task.name, project.name),
    )
    .into_response())
}

/// GET /projects/:project/tasks - List the project's tasks.
///
/// An existing project without tasks answers 404.
pub(super) async fn list_project_tasks(
    State(state): State<Arc<AppState>>,
    ApiPath(project_name): ApiPath<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let project = find_project_for_task(state.store.as_ref(), &project_name).await?;
    let tasks = state.store.list_project_tasks(&project).await?;

    if tasks.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No tasks in project {} found",
            project.name
        )));
    }
    Ok(Json(tasks))
}

/// DELETE /projects/:project/tasks/:task
pub(super) async fn delete_task(
    State(state): State<Arc<AppState>>,
    ApiPath((project_name, task_name)): ApiPath<(String, String)>,
) -> Result<Response, ApiError> {
    let task = find_task_or_404(state.store.as_ref(), &project_name, &task_name).await?;
    state.store.delete_task(&task).await?;
    tracing::info!(project = %project_name, task = %task.name, "Deleted task");

    Ok(message(StatusCode::OK, "Task was successfully deleted").into_response())
}

/// PUT /projects/:project/tasks/:task - Rename a task, optionally changing
/// its priority and deadline.
pub(super) async fn update_task(
    State(state): State<Arc<AppState>>,
    ApiPath((project_name, task_name)): ApiPath<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let mut task = find_task_or_404(state.store.as_ref(), &project_name, &task_name).await?;

    let req: UpdateTaskRequest = decode_body(&body)?;
    require_name(&req.name)?;

    task.name = req.name;
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(deadline) = req.deadline {
        task.deadline = deadline;
    }
    state.store.update_task(&task).await?;
    tracing::info!(project = %project_name, from = %task_name, to = %task.name, "Updated task");

    Ok(message(StatusCode::OK, "Task successfully updated").into_response())
}

/// PUT /projects/:project/tasks/:task/complete
pub(super) async fn complete_task(
    State(state): State<Arc<AppState>>,
    ApiPath((project_name, task_name)): ApiPath<(String, String)>,
) -> Result<Response, ApiError> {
    let mut task = find_task_or_404(state.store.as_ref(), &project_name, &task_name).await?;
    task.complete();
    state.store.update_task(&task).await?;
    tracing::info!(project = %project_name, task = %task.name, "Completed task");

    Ok(message(StatusCode::OK, "Task was completed").into_response())
}

/// DELETE /projects/:project/tasks/:task/complete
pub(super) async fn reopen_task(
    State(state): State<Arc<AppState>>,
    ApiPath((project_name, task_name)): ApiPath<(String, String)>,
) -> Result<Response, ApiError> {
    let mut task = find_task_or_404(state.store.as_ref(), &project_name, &task_name).await?;
    task.reopen();
    state.store.update_task(&task).await?;
    tracing::info!(project = %project_name, task = %task.name, "Reopened task");

    Ok(message(StatusCode::OK, "Task was reopened").into_response())
}
