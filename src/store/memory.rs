//! Map-backed `TodoStore` used as a test double for the HTTP and store tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, TodoStore};
use crate::model::{NewTask, Project, Task};

#[derive(Debug, Default)]
struct Tables {
    // BTreeMap keyed by id keeps insertion order since ids only grow.
    projects: BTreeMap<i64, Project>,
    tasks: BTreeMap<i64, Task>,
    last_project_id: i64,
    last_task_id: i64,
}

impl Tables {
    fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.values().find(|p| p.name == name)
    }

    fn project_name(&self, id: i64) -> String {
        self.projects
            .get(&id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn task_name_taken(&self, project_id: i64, name: &str, except: Option<i64>) -> bool {
        self.tasks
            .values()
            .any(|t| t.project_id == project_id && t.name == name && Some(t.id) != except)
    }
}

/// In-memory store. Enforces the same uniqueness rules as `SqliteStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn get_project(&self, name: &str) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.project_by_name(name).cloned())
    }

    async fn create_project(&self, name: &str) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        if tables.project_by_name(name).is_some() {
            return Err(StoreError::DuplicateProject(name.to_string()));
        }

        tables.last_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: tables.last_project_id,
            name: name.to_string(),
            archived: false,
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.values().cloned().collect())
    }

    async fn delete_project(&self, name: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let id = tables
            .project_by_name(name)
            .map(|p| p.id)
            .ok_or_else(|| StoreError::ProjectNotFound(name.to_string()))?;

        tables.projects.remove(&id);
        tables.tasks.retain(|_, t| t.project_id != id);
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .projects
            .values()
            .any(|p| p.name == project.name && p.id != project.id)
        {
            return Err(StoreError::DuplicateProject(project.name.clone()));
        }

        let stored = tables
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::ProjectNotFound(project.name.clone()))?;
        stored.name = project.name.clone();
        stored.archived = project.archived;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn get_task(&self, project_name: &str, task_name: &str) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        let Some(project) = tables.project_by_name(project_name) else {
            return Ok(None);
        };
        Ok(tables
            .tasks
            .values()
            .find(|t| t.project_id == project.id && t.name == task_name)
            .cloned())
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&task.project_id) {
            return Err(StoreError::ProjectNotFound(task.project_id.to_string()));
        }
        if tables.task_name_taken(task.project_id, &task.name, None) {
            return Err(StoreError::DuplicateTask {
                project: tables.project_name(task.project_id),
                task: task.name,
            });
        }

        tables.last_task_id += 1;
        let task = task.into_task(tables.last_task_id, Utc::now());
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_project_tasks(&self, project: &Project) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.project_id == project.id)
            .cloned()
            .collect())
    }

    async fn delete_task(&self, task: &Task) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.tasks.remove(&task.id).is_none() {
            return Err(StoreError::TaskNotFound {
                project: tables.project_name(task.project_id),
                task: task.name.clone(),
            });
        }
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.task_name_taken(task.project_id, &task.name, Some(task.id)) {
            return Err(StoreError::DuplicateTask {
                project: tables.project_name(task.project_id),
                task: task.name.clone(),
            });
        }

        let project = tables.project_name(task.project_id);
        let stored = tables
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| StoreError::TaskNotFound {
                project,
                task: task.name.clone(),
            })?;
        stored.name = task.name.clone();
        stored.priority = task.priority;
        stored.deadline = task.deadline;
        stored.done = task.done;
        stored.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn test_project_lifecycle() {
        contract::project_lifecycle(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_project_rename() {
        contract::project_rename(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_task_uniqueness_is_per_project() {
        contract::task_uniqueness_is_per_project(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_task_updates() {
        contract::task_updates(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        contract::delete_project_cascades(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_missing_records() {
        contract::missing_records(&MemoryStore::new()).await;
    }
}
