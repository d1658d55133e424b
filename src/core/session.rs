//! Check-in state machine.
//!
//! Per (user, workspace) there are two states: idle (no active
//! check-in) and active (exactly one). Checking in while active closes
//! the old session first and reports it alongside the new one, so the
//! caller's feedback is never dropped. Declarations insert an
//! already-closed record and only then auto-close whatever was active.

use chrono::Duration;
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{CheckIn, Task, User};
use crate::utils::now_secs;

/// Declared durations longer than this are accepted but flagged.
const DECLARE_FLAG_LIMIT_SECS: i64 = 8 * 3600;

/// Which task a check-in targets: one that already exists, or one
/// created on the fly.
#[derive(Debug, Clone)]
pub enum TaskRef {
    Existing(Uuid),
    New { name: String, description: String },
}

/// Summary of a session that was closed on the caller's behalf.
#[derive(Debug, Clone)]
pub struct ClosedSession {
    pub task_name: String,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct CheckInOutcome {
    pub task: Task,
    /// The previously active session, auto-closed before the new one
    /// opened.
    pub previous: Option<ClosedSession>,
}

#[derive(Debug)]
pub struct CheckOutOutcome {
    pub task_name: String,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct DeclareOutcome {
    pub task_name: String,
    pub duration: Duration,
    /// Set when the declared duration exceeds the 8h flag limit. The
    /// record is stored regardless.
    pub over_limit: bool,
    /// Active session auto-closed after the declaration was written.
    pub auto_closed: Option<ClosedSession>,
    /// The declaration itself succeeded but closing the active session
    /// failed; reported as a separate fact, never collapsed into an
    /// error for the whole operation.
    pub auto_close_failure: Option<String>,
}

/// Start working on a task. From idle this opens a session; from
/// active it closes the current session first (its summary comes back
/// in `previous`), then opens the new one.
pub fn check_in(
    conn: &mut Connection,
    user: &User,
    workspace_id: &str,
    task_ref: TaskRef,
) -> AppResult<CheckInOutcome> {
    let task = resolve_task(conn, user, workspace_id, task_ref)?;

    let previous = match db::get_active_check_in(conn, user.id, workspace_id)? {
        Some(active) => Some(close_session(conn, &active)?),
        None => None,
    };

    let check_in = CheckIn::open(user.id, workspace_id, task.id);
    db::create_check_in(conn, &check_in)?;

    info!(
        user = %user.external_id,
        workspace = workspace_id,
        task = %task.name,
        auto_closed = previous.is_some(),
        "check-in"
    );

    Ok(CheckInOutcome { task, previous })
}

/// Stop working on the current task. Errors with `NoActiveSession`
/// when idle.
pub fn check_out(
    conn: &mut Connection,
    user: &User,
    workspace_id: &str,
) -> AppResult<CheckOutOutcome> {
    let active = db::get_active_check_in(conn, user.id, workspace_id)?
        .ok_or(AppError::NoActiveSession)?;

    let closed = close_session(conn, &active)?;
    info!(
        user = %user.external_id,
        workspace = workspace_id,
        task = %closed.task_name,
        "check-out"
    );
    Ok(CheckOutOutcome {
        task_name: closed.task_name,
        duration: closed.duration,
    })
}

/// Record already-elapsed effort out of band: a closed check-in with
/// `start = now - duration`, `end = now`. The record is written first;
/// any active session is auto-closed afterwards, so under equal
/// timestamps the declared record is the older insert.
pub fn declare(
    conn: &mut Connection,
    user: &User,
    workspace_id: &str,
    task_id: Uuid,
    duration: Duration,
) -> AppResult<DeclareOutcome> {
    if duration <= Duration::zero() {
        return Err(AppError::InvalidInput(
            "declared duration must be positive".to_string(),
        ));
    }

    let task = lookup_workspace_task(conn, workspace_id, task_id)?;

    let end_time = now_secs();
    let record = CheckIn::closed(user.id, workspace_id, task.id, end_time - duration, end_time);
    db::create_declared_check_in(conn, &record)?;

    // Flagged after the write: over-long declarations are an
    // observability signal, not a rejection.
    let over_limit = duration.num_seconds() > DECLARE_FLAG_LIMIT_SECS;
    if over_limit {
        warn!(
            user = %user.external_id,
            workspace = workspace_id,
            task = %task.name,
            declared_secs = duration.num_seconds(),
            "declared duration exceeds 8h flag limit"
        );
    }

    // The declaration stands on its own. A failure while closing the
    // active session must not mask it.
    let (auto_closed, auto_close_failure) =
        match db::get_active_check_in(conn, user.id, workspace_id) {
            Ok(Some(active)) => match close_session(conn, &active) {
                Ok(closed) => (Some(closed), None),
                Err(err) => (None, Some(err.to_string())),
            },
            Ok(None) => (None, None),
            Err(err) => (None, Some(err.to_string())),
        };

    info!(
        user = %user.external_id,
        workspace = workspace_id,
        task = %task.name,
        declared_secs = duration.num_seconds(),
        "declare"
    );

    Ok(DeclareOutcome {
        task_name: task.name,
        duration,
        over_limit,
        auto_closed,
        auto_close_failure,
    })
}

fn resolve_task(
    conn: &Connection,
    user: &User,
    workspace_id: &str,
    task_ref: TaskRef,
) -> AppResult<Task> {
    match task_ref {
        TaskRef::Existing(task_id) => lookup_workspace_task(conn, workspace_id, task_id),
        TaskRef::New { name, description } => {
            if name.trim().is_empty() {
                return Err(AppError::InvalidInput("task name is empty".to_string()));
            }
            let task = Task::new(user.id, workspace_id, name.trim(), &description);
            db::create_task(conn, &task)?;
            Ok(task)
        }
    }
}

/// Fetch a task and make sure it lives in the caller's workspace.
fn lookup_workspace_task(conn: &Connection, workspace_id: &str, task_id: Uuid) -> AppResult<Task> {
    let task = db::get_task_by_id(conn, task_id)?
        .ok_or_else(|| AppError::NotFound("task".to_string()))?;
    if task.workspace_id != workspace_id {
        return Err(AppError::NotFound("task".to_string()));
    }
    Ok(task)
}

fn close_session(conn: &mut Connection, active: &CheckIn) -> AppResult<ClosedSession> {
    let task = db::get_task_by_id(conn, active.task_id)?
        .ok_or_else(|| AppError::NotFound("task".to_string()))?;
    let closed = db::check_out(conn, active.id)?;
    let duration = closed
        .duration()
        .ok_or_else(|| AppError::Integrity(format!("check-in {} still open after close", closed.id)))?;
    Ok(ClosedSession {
        task_name: task.name,
        duration,
    })
}
