use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority. Serialized as the storage code (`"0"` through `"3"`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    #[default]
    #[serde(rename = "0")]
    Low,
    #[serde(rename = "1")]
    Medium,
    #[serde(rename = "2")]
    High,
    #[serde(rename = "3")]
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "0",
            Self::Medium => "1",
            Self::High => "2",
            Self::Urgent => "3",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Low),
            "1" => Some(Self::Medium),
            "2" => Some(Self::High),
            "3" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// A unit of work owned by one project.
///
/// Names are unique within the owning project only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn complete(&mut self) {
        self.done = true;
    }

    pub fn reopen(&mut self) {
        self.done = false;
    }
}

/// Fields needed to insert a task; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    pub done: bool,
    pub project_id: i64,
}

impl NewTask {
    pub fn new(project_id: i64, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: Priority::default(),
            deadline: None,
            done: false,
            project_id,
        }
    }

    pub(crate) fn into_task(self, id: i64, now: DateTime<Utc>) -> Task {
        Task {
            id,
            name: self.name,
            priority: self.priority,
            deadline: self.deadline,
            done: self.done,
            project_id: self.project_id,
            created_at: now,
            updated_at: now,
        }
    }
}
