use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A unit of work inside a workspace. Owned by one user unless marked
/// global, in which case every member of the workspace may check into it.
/// Tasks are never deleted; `completed` is the only soft state.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub workspace_id: String, // opaque platform id
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub global: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(owner_id: Uuid, workspace_id: &str, name: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            workspace_id: workspace_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            completed: false,
            global: false,
            created_at: Utc::now(),
        }
    }

    pub fn new_global(owner_id: Uuid, workspace_id: &str, name: &str, description: &str) -> Self {
        Self {
            global: true,
            ..Self::new(owner_id, workspace_id, name, description)
        }
    }
}
