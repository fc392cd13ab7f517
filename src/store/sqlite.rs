//! SQLite-backed `TodoStore`.
//!
//! A single connection is shared behind a mutex. Every call runs on the
//! blocking thread pool so handlers never block the async runtime on disk IO.
//!
//! Name uniqueness (global for projects, per project for tasks) is enforced by
//! `UNIQUE` constraints in `schema.sql`; constraint failures are reported as
//! `DuplicateProject` / `DuplicateTask`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{StoreError, StoreResult, TodoStore};
use crate::model::{NewTask, Priority, Project, Task};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    archived,
    created_at,
    updated_at
FROM projects";

const TASK_SELECT_SQL: &str = "SELECT
    tasks.id,
    tasks.name,
    tasks.priority,
    tasks.deadline,
    tasks.done,
    tasks.project_id,
    tasks.created_at,
    tasks.updated_at
FROM tasks";

/// Production store over a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self::bootstrap(conn)?;
        tracing::info!(path = %path.display(), "Opened database");
        Ok(store)
    }

    /// Open a private in-memory database with the schema applied.
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self::bootstrap(Connection::open_in_memory()?)?;
        tracing::debug!("Opened in-memory database");
        Ok(store)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn get_project(&self, name: &str) -> StoreResult<Option<Project>> {
        let name = name.to_string();
        self.call(move |conn| find_project_by_name(conn, &name)).await
    }

    async fn create_project(&self, name: &str) -> StoreResult<Project> {
        let name = name.to_string();
        self.call(move |conn| {
            let now = Utc::now();
            let inserted = conn.execute(
                "INSERT INTO projects (name, archived, created_at, updated_at)
                 VALUES (?1, 0, ?2, ?2);",
                params![name, format_timestamp(now)],
            );
            if let Err(err) = inserted {
                return Err(if is_unique_violation(&err) {
                    StoreError::DuplicateProject(name)
                } else {
                    err.into()
                });
            }

            Ok(Project {
                id: conn.last_insert_rowid(),
                name,
                archived: false,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.call(|conn| {
            let mut stmt = conn.prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY id;"))?;
            let mut rows = stmt.query([])?;
            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(parse_project_row(row)?);
            }
            Ok(projects)
        })
        .await
    }

    async fn delete_project(&self, name: &str) -> StoreResult<()> {
        let name = name.to_string();
        self.call(move |conn| {
            // Owned tasks go with it through ON DELETE CASCADE.
            let changed = conn.execute("DELETE FROM projects WHERE name = ?1;", params![name])?;
            if changed == 0 {
                return Err(StoreError::ProjectNotFound(name));
            }
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> StoreResult<()> {
        let project = project.clone();
        self.call(move |conn| {
            let updated = conn.execute(
                "UPDATE projects
                 SET name = ?1, archived = ?2, updated_at = ?3
                 WHERE id = ?4;",
                params![
                    project.name,
                    project.archived,
                    format_timestamp(Utc::now()),
                    project.id
                ],
            );
            match updated {
                Ok(0) => Err(StoreError::ProjectNotFound(project.name)),
                Ok(_) => Ok(()),
                Err(err) if is_unique_violation(&err) => {
                    Err(StoreError::DuplicateProject(project.name))
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    async fn get_task(&self, project_name: &str, task_name: &str) -> StoreResult<Option<Task>> {
        let project_name = project_name.to_string();
        let task_name = task_name.to_string();
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{TASK_SELECT_SQL}
                 JOIN projects ON projects.id = tasks.project_id
                 WHERE projects.name = ?1 AND tasks.name = ?2;"
            ))?;
            let mut rows = stmt.query(params![project_name, task_name])?;
            match rows.next()? {
                Some(row) => Ok(Some(parse_task_row(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let project_name = project_name_by_id(&tx, task.project_id)?
                .ok_or_else(|| StoreError::ProjectNotFound(task.project_id.to_string()))?;

            let now = Utc::now();
            let inserted = tx.execute(
                "INSERT INTO tasks (
                    name,
                    priority,
                    deadline,
                    done,
                    project_id,
                    created_at,
                    updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
                params![
                    task.name,
                    task.priority.as_str(),
                    task.deadline.map(format_timestamp),
                    task.done,
                    task.project_id,
                    format_timestamp(now),
                ],
            );
            if let Err(err) = inserted {
                return Err(if is_unique_violation(&err) {
                    StoreError::DuplicateTask {
                        project: project_name,
                        task: task.name,
                    }
                } else {
                    err.into()
                });
            }

            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(task.into_task(id, now))
        })
        .await
    }

    async fn list_project_tasks(&self, project: &Project) -> StoreResult<Vec<Task>> {
        let project_id = project.id;
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{TASK_SELECT_SQL} WHERE tasks.project_id = ?1 ORDER BY tasks.id;"
            ))?;
            let mut rows = stmt.query(params![project_id])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(parse_task_row(row)?);
            }
            Ok(tasks)
        })
        .await
    }

    async fn delete_task(&self, task: &Task) -> StoreResult<()> {
        let task = task.clone();
        self.call(move |conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1;", params![task.id])?;
            if changed == 0 {
                return Err(task_not_found(conn, &task));
            }
            Ok(())
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let task = task.clone();
        self.call(move |conn| {
            let updated = conn.execute(
                "UPDATE tasks
                 SET
                    name = ?1,
                    priority = ?2,
                    deadline = ?3,
                    done = ?4,
                    updated_at = ?5
                 WHERE id = ?6;",
                params![
                    task.name,
                    task.priority.as_str(),
                    task.deadline.map(format_timestamp),
                    task.done,
                    format_timestamp(Utc::now()),
                    task.id,
                ],
            );
            match updated {
                Ok(0) => Err(task_not_found(conn, &task)),
                Ok(_) => Ok(()),
                Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateTask {
                    project: project_label(conn, task.project_id),
                    task: task.name,
                }),
                Err(err) => Err(err.into()),
            }
        })
        .await
    }
}

fn find_project_by_name(conn: &Connection, name: &str) -> StoreResult<Option<Project>> {
    let mut stmt = conn.prepare(&format!("{PROJECT_SELECT_SQL} WHERE name = ?1;"))?;
    let mut rows = stmt.query(params![name])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_project_row(row)?)),
        None => Ok(None),
    }
}

fn project_name_by_id(conn: &Connection, id: i64) -> StoreResult<Option<String>> {
    let name = conn
        .query_row(
            "SELECT name FROM projects WHERE id = ?1;",
            params![id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(name)
}

/// Project name for error messages, falling back to the raw id.
fn project_label(conn: &Connection, id: i64) -> String {
    project_name_by_id(conn, id)
        .ok()
        .flatten()
        .unwrap_or_else(|| id.to_string())
}

fn task_not_found(conn: &Connection, task: &Task) -> StoreError {
    StoreError::TaskNotFound {
        project: project_label(conn, task.project_id),
        task: task.name.clone(),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_project_row(row: &Row<'_>) -> StoreResult<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        archived: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(4)?)?,
    })
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let priority_code: String = row.get(2)?;
    let priority = Priority::from_code(&priority_code)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown priority `{priority_code}`")))?;
    let deadline = row
        .get::<_, Option<String>>(3)?
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        priority,
        deadline,
        done: row.get(4)?,
        project_id: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(7)?)?,
    })
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("bad timestamp `{raw}`: {e}")))
}
