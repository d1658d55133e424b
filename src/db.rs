//! Persistence layer: durable storage and the primitive operations the
//! check-in state machine composes.
//!
//! Invariants enforced here:
//! - `active` is written in lockstep with `end_time` on every path.
//! - at most one active check-in per (user, workspace); detecting more
//!   than one is surfaced as an integrity error, never repaired by
//!   picking a row.
//! - closing a session is a conditional update (`WHERE end_time IS
//!   NULL`) inside one transaction, so concurrent checkouts cannot
//!   both compute an end time: the loser observes zero rows affected
//!   and resolves to already-closed success.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::error;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{CheckIn, CheckInWithTask, Task, User, WorkspaceSettings};
use crate::utils::{clamp_end_time, from_db_ts, now_secs, to_db_ts};

pub mod pool;
pub use pool::DbPool;

/// Initialize the database schema. Idempotent.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id           TEXT PRIMARY KEY,
            external_id  TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            timezone     TEXT NOT NULL DEFAULT 'UTC',
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id           TEXT PRIMARY KEY,
            owner_id     TEXT NOT NULL REFERENCES users(id),
            workspace_id TEXT NOT NULL,
            name         TEXT NOT NULL,
            description  TEXT NOT NULL DEFAULT '',
            completed    INTEGER NOT NULL DEFAULT 0,
            global       INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS check_ins (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id),
            workspace_id TEXT NOT NULL,
            task_id      TEXT NOT NULL REFERENCES tasks(id),
            start_time   TEXT NOT NULL,   -- RFC 3339 UTC, whole seconds
            end_time     TEXT,            -- NULL while the session is open
            active       INTEGER NOT NULL DEFAULT 1,
            CHECK (end_time IS NULL OR end_time > start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_check_ins_active
            ON check_ins (user_id, workspace_id) WHERE active = 1;
        CREATE INDEX IF NOT EXISTS idx_check_ins_window
            ON check_ins (workspace_id, start_time);

        CREATE TABLE IF NOT EXISTS workspace_settings (
            id               TEXT PRIMARY KEY,
            workspace_id     TEXT NOT NULL UNIQUE,
            inactivity_limit INTEGER NOT NULL DEFAULT 30,
            ping_timeout     INTEGER NOT NULL DEFAULT 5,
            created_at       TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn text_conversion_err(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn uuid_from_col(raw: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&raw).map_err(|_| {
        text_conversion_err(AppError::InvalidInput(format!("invalid uuid '{}'", raw)))
    })
}

fn ts_from_col(raw: String) -> rusqlite::Result<DateTime<Utc>> {
    from_db_ts(&raw).map_err(text_conversion_err)
}

pub(crate) fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_from_col(row.get("id")?)?,
        external_id: row.get("external_id")?,
        display_name: row.get("display_name")?,
        timezone: row.get("timezone")?,
        created_at: ts_from_col(row.get("created_at")?)?,
    })
}

pub(crate) fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: uuid_from_col(row.get("id")?)?,
        owner_id: uuid_from_col(row.get("owner_id")?)?,
        workspace_id: row.get("workspace_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        completed: row.get("completed")?,
        global: row.get("global")?,
        created_at: ts_from_col(row.get("created_at")?)?,
    })
}

pub(crate) fn row_to_check_in(row: &Row) -> rusqlite::Result<CheckIn> {
    let end_raw: Option<String> = row.get("end_time")?;
    let end_time = match end_raw {
        Some(raw) => Some(ts_from_col(raw)?),
        None => None,
    };
    Ok(CheckIn {
        id: uuid_from_col(row.get("id")?)?,
        user_id: uuid_from_col(row.get("user_id")?)?,
        workspace_id: row.get("workspace_id")?,
        task_id: uuid_from_col(row.get("task_id")?)?,
        start_time: ts_from_col(row.get("start_time")?)?,
        end_time,
        active: row.get("active")?,
    })
}

fn row_to_settings(row: &Row) -> rusqlite::Result<WorkspaceSettings> {
    Ok(WorkspaceSettings {
        id: uuid_from_col(row.get("id")?)?,
        workspace_id: row.get("workspace_id")?,
        inactivity_limit: row.get("inactivity_limit")?,
        ping_timeout: row.get("ping_timeout")?,
        created_at: ts_from_col(row.get("created_at")?)?,
    })
}

const CHECK_IN_COLS: &str = "id, user_id, workspace_id, task_id, start_time, end_time, active";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Look a user up by platform id, creating them lazily on first contact.
pub fn get_or_create_user(
    conn: &Connection,
    external_id: &str,
    display_name: &str,
) -> AppResult<User> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, external_id, display_name, timezone, created_at
         FROM users WHERE external_id = ?1",
    )?;
    if let Some(user) = stmt.query_row([external_id], row_to_user).optional()? {
        return Ok(user);
    }

    let user = User::new(external_id, display_name);
    conn.execute(
        "INSERT INTO users (id, external_id, display_name, timezone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id.to_string(),
            user.external_id,
            user.display_name,
            user.timezone,
            to_db_ts(&user.created_at),
        ],
    )?;
    Ok(user)
}

pub fn update_user_timezone(conn: &Connection, user_id: Uuid, timezone: &str) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE users SET timezone = ?1 WHERE id = ?2",
        params![timezone, user_id.to_string()],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound("user".to_string()));
    }
    Ok(())
}

/// Workspace roster: everyone who has ever checked in there, sorted by
/// display name. Users who did nothing in a report window still come
/// from here, so they appear with a zero total.
pub fn get_workspace_users(conn: &Connection, workspace_id: &str) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT DISTINCT u.id, u.external_id, u.display_name, u.timezone, u.created_at
         FROM users u
         JOIN check_ins c ON c.user_id = u.id
         WHERE c.workspace_id = ?1
         ORDER BY u.display_name ASC",
    )?;
    let rows = stmt.query_map([workspace_id], row_to_user)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub fn create_task(conn: &Connection, task: &Task) -> AppResult<()> {
    conn.execute(
        "INSERT INTO tasks (id, owner_id, workspace_id, name, description, completed, global, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.id.to_string(),
            task.owner_id.to_string(),
            task.workspace_id,
            task.name,
            task.description,
            task.completed,
            task.global,
            to_db_ts(&task.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_task_by_id(conn: &Connection, task_id: Uuid) -> AppResult<Option<Task>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, owner_id, workspace_id, name, description, completed, global, created_at
         FROM tasks WHERE id = ?1",
    )?;
    Ok(stmt
        .query_row([task_id.to_string()], row_to_task)
        .optional()?)
}

/// Tasks usable by a user in a workspace: their own plus global ones,
/// newest first.
pub fn get_user_tasks(conn: &Connection, user_id: Uuid, workspace_id: &str) -> AppResult<Vec<Task>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, owner_id, workspace_id, name, description, completed, global, created_at
         FROM tasks
         WHERE (owner_id = ?1 OR global = 1) AND workspace_id = ?2
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string(), workspace_id], row_to_task)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_task_status(conn: &Connection, task_id: Uuid, completed: bool) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE tasks SET completed = ?1 WHERE id = ?2",
        params![completed, task_id.to_string()],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound("task".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Check-ins
// ---------------------------------------------------------------------------

/// Insert a new open session. `active` and `end_time` are pinned here
/// rather than taken from the struct so the lockstep invariant cannot
/// be bypassed by a caller.
pub fn create_check_in(conn: &Connection, check_in: &CheckIn) -> AppResult<()> {
    conn.execute(
        "INSERT INTO check_ins (id, user_id, workspace_id, task_id, start_time, end_time, active)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, 1)",
        params![
            check_in.id.to_string(),
            check_in.user_id.to_string(),
            check_in.workspace_id,
            check_in.task_id.to_string(),
            to_db_ts(&check_in.start_time),
        ],
    )?;
    Ok(())
}

/// Insert an already-closed session (out-of-band declaration). The row
/// never passes through the active state.
pub fn create_declared_check_in(conn: &Connection, check_in: &CheckIn) -> AppResult<()> {
    let end_time = check_in
        .end_time
        .ok_or_else(|| AppError::InvalidInput("declared check-in has no end time".to_string()))?;
    conn.execute(
        "INSERT INTO check_ins (id, user_id, workspace_id, task_id, start_time, end_time, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            check_in.id.to_string(),
            check_in.user_id.to_string(),
            check_in.workspace_id,
            check_in.task_id.to_string(),
            to_db_ts(&check_in.start_time),
            to_db_ts(&end_time),
        ],
    )?;
    Ok(())
}

/// The single open session for a user in a workspace, if any.
///
/// More than one matching row means the close-before-open ordering was
/// violated somewhere; that is surfaced as an integrity error rather
/// than resolved by picking a row.
pub fn get_active_check_in(
    conn: &Connection,
    user_id: Uuid,
    workspace_id: &str,
) -> AppResult<Option<CheckIn>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, workspace_id, task_id, start_time, end_time, active
         FROM check_ins
         WHERE user_id = ?1 AND workspace_id = ?2 AND active = 1
         LIMIT 2",
    )?;
    let rows = stmt.query_map(params![user_id.to_string(), workspace_id], row_to_check_in)?;
    let mut matches = Vec::new();
    for r in rows {
        matches.push(r?);
    }

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => {
            error!(
                user_id = %user_id,
                workspace_id,
                "multiple active check-ins for one user+workspace; invariant violated"
            );
            Err(AppError::Integrity(format!(
                "multiple active check-ins for user {} in workspace {}",
                user_id, workspace_id
            )))
        }
    }
}

pub fn get_check_in_by_id(conn: &Connection, check_in_id: Uuid) -> AppResult<Option<CheckIn>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, workspace_id, task_id, start_time, end_time, active
         FROM check_ins WHERE id = ?1",
    )?;
    Ok(stmt
        .query_row([check_in_id.to_string()], row_to_check_in)
        .optional()?)
}

/// Close a session, computing `end_time = max(now, start_time + 1s)`.
///
/// Idempotent: closing an already-closed session returns it unchanged.
/// The read and the conditional write share one transaction, and the
/// update carries `WHERE end_time IS NULL`, so of two concurrent
/// checkouts only one writes; the other sees zero rows affected and
/// returns the row the winner produced.
pub fn check_out(conn: &mut Connection, check_in_id: Uuid) -> AppResult<CheckIn> {
    let tx = conn.transaction()?;

    let closed = {
        let start_raw: Option<String> = tx
            .query_row(
                "SELECT start_time FROM check_ins WHERE id = ?1 AND end_time IS NULL",
                [check_in_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match start_raw {
            None => {
                // Either already closed (retry, fine) or missing entirely.
                match get_check_in_by_id(&tx, check_in_id)? {
                    Some(existing) => existing,
                    None => return Err(AppError::NotFound("check-in".to_string())),
                }
            }
            Some(raw) => {
                let start_time = from_db_ts(&raw)?;
                let end_time = clamp_end_time(start_time, now_secs());
                // Zero rows affected means a concurrent checkout won the
                // race; its end time stands and we return what it wrote.
                tx.execute(
                    "UPDATE check_ins SET end_time = ?1, active = 0
                     WHERE id = ?2 AND end_time IS NULL",
                    params![to_db_ts(&end_time), check_in_id.to_string()],
                )?;
                get_check_in_by_id(&tx, check_in_id)?
                    .ok_or_else(|| AppError::NotFound("check-in".to_string()))?
            }
        }
    };

    tx.commit()?;
    Ok(closed)
}

/// Closed sessions (joined with their task) whose start falls in
/// `[start, end)`, newest first. Ties on start_time break on rowid so
/// the most recently inserted row sorts first.
pub fn get_task_history(
    conn: &Connection,
    workspace_id: &str,
    user_filter: Option<Uuid>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<Vec<CheckInWithTask>> {
    let base = "SELECT c.id, c.user_id, c.workspace_id, c.task_id, c.start_time, c.end_time, c.active,
                t.id AS t_id, t.owner_id AS t_owner_id, t.workspace_id AS t_workspace_id,
                t.name AS t_name, t.description AS t_description,
                t.completed AS t_completed, t.global AS t_global, t.created_at AS t_created_at
         FROM check_ins c
         JOIN tasks t ON t.id = c.task_id
         WHERE c.workspace_id = ?1
           AND c.end_time IS NOT NULL
           AND c.start_time >= ?2 AND c.start_time < ?3";

    let map = |row: &Row| -> rusqlite::Result<CheckInWithTask> {
        Ok(CheckInWithTask {
            check_in: row_to_check_in(row)?,
            task: Task {
                id: uuid_from_col(row.get("t_id")?)?,
                owner_id: uuid_from_col(row.get("t_owner_id")?)?,
                workspace_id: row.get("t_workspace_id")?,
                name: row.get("t_name")?,
                description: row.get("t_description")?,
                completed: row.get("t_completed")?,
                global: row.get("t_global")?,
                created_at: ts_from_col(row.get("t_created_at")?)?,
            },
        })
    };

    let mut out = Vec::new();
    match user_filter {
        Some(user_id) => {
            let sql = format!(
                "{base} AND c.user_id = ?4 ORDER BY c.start_time DESC, c.rowid DESC"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(
                params![
                    workspace_id,
                    to_db_ts(&start),
                    to_db_ts(&end),
                    user_id.to_string()
                ],
                map,
            )?;
            for r in rows {
                out.push(r?);
            }
        }
        None => {
            let sql = format!("{base} ORDER BY c.start_time DESC, c.rowid DESC");
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(
                params![workspace_id, to_db_ts(&start), to_db_ts(&end)],
                map,
            )?;
            for r in rows {
                out.push(r?);
            }
        }
    }
    Ok(out)
}

/// A currently open session joined with its task and user, for the
/// workspace status view.
#[derive(Debug, Clone)]
pub struct ActiveCheckInRow {
    pub check_in: CheckIn,
    pub task: Task,
    pub user: User,
}

pub fn get_all_active_check_ins(
    conn: &Connection,
    workspace_id: &str,
) -> AppResult<Vec<ActiveCheckInRow>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, c.user_id, c.workspace_id, c.task_id, c.start_time, c.end_time, c.active,
                t.id AS t_id, t.owner_id AS t_owner_id, t.workspace_id AS t_workspace_id,
                t.name AS t_name, t.description AS t_description,
                t.completed AS t_completed, t.global AS t_global, t.created_at AS t_created_at,
                u.id AS u_id, u.external_id AS u_external_id, u.display_name AS u_display_name,
                u.timezone AS u_timezone, u.created_at AS u_created_at
         FROM check_ins c
         JOIN tasks t ON t.id = c.task_id
         JOIN users u ON u.id = c.user_id
         WHERE c.workspace_id = ?1 AND c.active = 1
         ORDER BY u.display_name ASC",
    )?;
    let rows = stmt.query_map([workspace_id], |row| {
        Ok(ActiveCheckInRow {
            check_in: row_to_check_in(row)?,
            task: Task {
                id: uuid_from_col(row.get("t_id")?)?,
                owner_id: uuid_from_col(row.get("t_owner_id")?)?,
                workspace_id: row.get("t_workspace_id")?,
                name: row.get("t_name")?,
                description: row.get("t_description")?,
                completed: row.get("t_completed")?,
                global: row.get("t_global")?,
                created_at: ts_from_col(row.get("t_created_at")?)?,
            },
            user: User {
                id: uuid_from_col(row.get("u_id")?)?,
                external_id: row.get("u_external_id")?,
                display_name: row.get("u_display_name")?,
                timezone: row.get("u_timezone")?,
                created_at: ts_from_col(row.get("u_created_at")?)?,
            },
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Workspace settings
// ---------------------------------------------------------------------------

/// Settings for a workspace, created with defaults (30 / 5 minutes) on
/// first reference.
pub fn get_or_create_workspace_settings(
    conn: &Connection,
    workspace_id: &str,
) -> AppResult<WorkspaceSettings> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, workspace_id, inactivity_limit, ping_timeout, created_at
         FROM workspace_settings WHERE workspace_id = ?1",
    )?;
    if let Some(settings) = stmt.query_row([workspace_id], row_to_settings).optional()? {
        return Ok(settings);
    }

    let settings = WorkspaceSettings::with_defaults(workspace_id);
    conn.execute(
        "INSERT INTO workspace_settings (id, workspace_id, inactivity_limit, ping_timeout, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            settings.id.to_string(),
            settings.workspace_id,
            settings.inactivity_limit,
            settings.ping_timeout,
            to_db_ts(&settings.created_at),
        ],
    )?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckIn, Task};
    use chrono::Duration;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn seed_user_task(conn: &Connection) -> (User, Task) {
        let user = get_or_create_user(conn, "ext-1", "alice").unwrap();
        let task = Task::new(user.id, "ws-1", "Design", "mockups");
        create_task(conn, &task).unwrap();
        (user, task)
    }

    #[test]
    fn user_created_lazily_and_reused() {
        let conn = test_conn();
        let first = get_or_create_user(&conn, "ext-1", "alice").unwrap();
        let second = get_or_create_user(&conn, "ext-1", "alice-renamed").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "alice");
        assert_eq!(second.timezone, "UTC");
    }

    #[test]
    fn active_lookup_empty_then_single() {
        let mut conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        assert!(get_active_check_in(&conn, user.id, "ws-1")
            .unwrap()
            .is_none());

        let ci = CheckIn::open(user.id, "ws-1", task.id);
        create_check_in(&conn, &ci).unwrap();
        let active = get_active_check_in(&conn, user.id, "ws-1").unwrap().unwrap();
        assert_eq!(active.id, ci.id);
        assert!(active.active);
        assert!(active.end_time.is_none());

        check_out(&mut conn, ci.id).unwrap();
        assert!(get_active_check_in(&conn, user.id, "ws-1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn active_lookup_scoped_per_workspace() {
        let conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        let ci = CheckIn::open(user.id, "ws-1", task.id);
        create_check_in(&conn, &ci).unwrap();
        assert!(get_active_check_in(&conn, user.id, "ws-other")
            .unwrap()
            .is_none());
    }

    #[test]
    fn duplicate_active_rows_surface_integrity_error() {
        let conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        // Bypass the state machine to plant the corrupt state.
        create_check_in(&conn, &CheckIn::open(user.id, "ws-1", task.id)).unwrap();
        create_check_in(&conn, &CheckIn::open(user.id, "ws-1", task.id)).unwrap();

        let err = get_active_check_in(&conn, user.id, "ws-1").unwrap_err();
        assert!(matches!(err, AppError::Integrity(_)));
    }

    #[test]
    fn check_out_is_idempotent_with_stable_end_time() {
        let mut conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        let ci = CheckIn::open(user.id, "ws-1", task.id);
        create_check_in(&conn, &ci).unwrap();

        let first = check_out(&mut conn, ci.id).unwrap();
        let second = check_out(&mut conn, ci.id).unwrap();
        assert!(!first.active);
        assert_eq!(first.end_time, second.end_time);
        assert!(first.end_time.unwrap() > first.start_time);
    }

    #[test]
    fn check_out_clamps_end_after_start() {
        let mut conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        // Session "started" in the future relative to the wall clock.
        let mut ci = CheckIn::open(user.id, "ws-1", task.id);
        ci.start_time = now_secs() + Duration::minutes(5);
        create_check_in(&conn, &ci).unwrap();

        let closed = check_out(&mut conn, ci.id).unwrap();
        assert_eq!(closed.end_time.unwrap(), ci.start_time + Duration::seconds(1));
    }

    #[test]
    fn check_out_unknown_id_is_not_found() {
        let mut conn = test_conn();
        let err = check_out(&mut conn, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn check_in_lookup_by_id() {
        let conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        let ci = CheckIn::open(user.id, "ws-1", task.id);
        create_check_in(&conn, &ci).unwrap();

        let found = get_check_in_by_id(&conn, ci.id).unwrap().unwrap();
        assert_eq!(found.id, ci.id);
        assert!(found.active);
        assert!(get_check_in_by_id(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn user_tasks_include_global_newest_first() {
        let conn = test_conn();
        let (alice, own_task) = seed_user_task(&conn);
        let bob = get_or_create_user(&conn, "ext-2", "bob").unwrap();

        let mut global = Task::new_global(bob.id, "ws-1", "Standup", "");
        global.created_at = own_task.created_at + Duration::seconds(10);
        create_task(&conn, &global).unwrap();

        let other_ws = Task::new(alice.id, "ws-2", "Elsewhere", "");
        create_task(&conn, &other_ws).unwrap();

        let bobs_private = Task::new(bob.id, "ws-1", "Private", "");
        create_task(&conn, &bobs_private).unwrap();

        let tasks = get_user_tasks(&conn, alice.id, "ws-1").unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Standup", "Design"]);
    }

    #[test]
    fn update_task_status_missing_task() {
        let conn = test_conn();
        let err = update_task_status(&conn, Uuid::new_v4(), true).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn settings_created_with_defaults_once() {
        let conn = test_conn();
        let first = get_or_create_workspace_settings(&conn, "ws-1").unwrap();
        assert_eq!(first.inactivity_limit, 30);
        assert_eq!(first.ping_timeout, 5);
        let second = get_or_create_workspace_settings(&conn, "ws-1").unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn history_window_is_half_open() {
        let conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        let base = now_secs() - Duration::hours(10);

        for offset in [0i64, 1, 2] {
            let start = base + Duration::hours(offset);
            let ci = CheckIn::closed(user.id, "ws-1", task.id, start, start + Duration::minutes(30));
            create_declared_check_in(&conn, &ci).unwrap();
        }

        // Window covers exactly the first two starts.
        let hist = get_task_history(&conn, "ws-1", None, base, base + Duration::hours(2)).unwrap();
        assert_eq!(hist.len(), 2);
        // Newest first.
        assert!(hist[0].check_in.start_time > hist[1].check_in.start_time);
    }

    #[test]
    fn history_tie_break_is_insertion_order() {
        let conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        let start = now_secs() - Duration::hours(1);

        let first = CheckIn::closed(user.id, "ws-1", task.id, start, start + Duration::minutes(5));
        let second = CheckIn::closed(user.id, "ws-1", task.id, start, start + Duration::minutes(9));
        create_declared_check_in(&conn, &first).unwrap();
        create_declared_check_in(&conn, &second).unwrap();

        let hist =
            get_task_history(&conn, "ws-1", None, start, start + Duration::hours(1)).unwrap();
        assert_eq!(hist.len(), 2);
        // Equal start_time: the later insert wins the "most recent" slot.
        assert_eq!(hist[0].check_in.id, second.id);
    }

    #[test]
    fn history_excludes_open_sessions() {
        let conn = test_conn();
        let (user, task) = seed_user_task(&conn);
        create_check_in(&conn, &CheckIn::open(user.id, "ws-1", task.id)).unwrap();

        let hist = get_task_history(
            &conn,
            "ws-1",
            None,
            now_secs() - Duration::hours(1),
            now_secs() + Duration::hours(1),
        )
        .unwrap();
        assert!(hist.is_empty());
    }
}
