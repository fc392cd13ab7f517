//! Persistence layer.
//!
//! `TodoStore` is the boundary between handlers and storage. Two
//! implementations exist:
//! - `SqliteStore`: the production adapter, backed by a SQLite file
//! - `MemoryStore`: a map-backed double used by tests
//!
//! Lookups return `Ok(None)` when a record is absent. Operations that need an
//! existing record (delete, update) return a `*NotFound` error instead.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{NewTask, Project, Task};

#[cfg(test)]
mod contract;
mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared store handle passed to the HTTP layer.
pub type SharedStore = Arc<dyn TodoStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project {0} not found")]
    ProjectNotFound(String),

    #[error("task {task} not found in project {project}")]
    TaskNotFound { project: String, task: String },

    #[error("project {0} already exists")]
    DuplicateProject(String),

    #[error("task {task} already exists in project {project}")]
    DuplicateTask { project: String, task: String },

    #[error("invalid stored data: {0}")]
    InvalidData(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("database connection lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProjectNotFound(_) | Self::TaskNotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateProject(_) | Self::DuplicateTask { .. })
    }
}

/// Record-level CRUD over projects and their tasks.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Exact name match.
    async fn get_project(&self, name: &str) -> StoreResult<Option<Project>>;

    /// Fails with `DuplicateProject` if the name is taken.
    async fn create_project(&self, name: &str) -> StoreResult<Project>;

    /// All projects in insertion order.
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Deletes the project and every task it owns.
    async fn delete_project(&self, name: &str) -> StoreResult<()>;

    /// Persists `name` and `archived` of the project with the same id.
    async fn update_project(&self, project: &Project) -> StoreResult<()>;

    async fn get_task(&self, project_name: &str, task_name: &str) -> StoreResult<Option<Task>>;

    /// Fails with `DuplicateTask` if the project already has a task of that name.
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;

    /// Tasks owned by `project`, in insertion order.
    async fn list_project_tasks(&self, project: &Project) -> StoreResult<Vec<Task>>;

    async fn delete_task(&self, task: &Task) -> StoreResult<()>;

    /// Persists every mutable field of the task with the same id.
    async fn update_task(&self, task: &Task) -> StoreResult<()>;
}
