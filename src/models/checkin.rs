use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::task::Task;
use crate::utils::now_secs;

/// A timed interval a user spends on a task.
///
/// `active` is persisted redundantly with `end_time IS NULL` so the
/// open-session lookup stays cheap. Every write path must flip both
/// together; the invariant `active == end_time.is_none()` holds at all
/// times.
#[derive(Debug, Clone, Serialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workspace_id: String,
    pub task_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>, // NULL while the session is open
    pub active: bool,
}

impl CheckIn {
    /// An open session starting now.
    pub fn open(user_id: Uuid, workspace_id: &str, task_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            workspace_id: workspace_id.to_string(),
            task_id,
            start_time: now_secs(),
            end_time: None,
            active: true,
        }
    }

    /// An already-closed session, used by out-of-band declarations.
    /// It never passes through the active state.
    pub fn closed(
        user_id: Uuid,
        workspace_id: &str,
        task_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            workspace_id: workspace_id.to_string(),
            task_id,
            start_time,
            end_time: Some(end_time),
            active: false,
        }
    }

    /// Elapsed time of a closed session, None while still open.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// A closed check-in joined with its task, as returned by history queries.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInWithTask {
    pub check_in: CheckIn,
    pub task: Task,
}
