use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_INACTIVITY_LIMIT_MIN: i64 = 30;
pub const DEFAULT_PING_TIMEOUT_MIN: i64 = 5;

/// Per-workspace configuration, created lazily with defaults the first
/// time an unseen workspace is referenced.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSettings {
    pub id: Uuid,
    pub workspace_id: String,
    pub inactivity_limit: i64, // minutes
    pub ping_timeout: i64,     // minutes
    pub created_at: DateTime<Utc>,
}

impl WorkspaceSettings {
    pub fn with_defaults(workspace_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            inactivity_limit: DEFAULT_INACTIVITY_LIMIT_MIN,
            ping_timeout: DEFAULT_PING_TIMEOUT_MIN,
            created_at: Utc::now(),
        }
    }
}
