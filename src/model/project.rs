use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named todo container. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Assigned by the store on creation.
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn archive(&mut self) {
        self.archived = true;
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn homework() -> Project {
        let now = Utc::now();
        Project {
            id: 1,
            name: "homework".to_string(),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_archive_is_idempotent() {
        let mut project = homework();
        project.archive();
        project.archive();
        assert!(project.archived);

        project.unarchive();
        project.unarchive();
        assert!(!project.archived);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(homework()).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "homework");
        assert_eq!(value["archived"], false);
        assert!(value.get("created_at").is_some());
    }
}
