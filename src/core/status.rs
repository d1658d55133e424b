//! Workspace status view: who is working on what right now, and how
//! much each member has already logged today.

use chrono::Duration;
use rusqlite::Connection;
use uuid::Uuid;

use crate::core::report::ReportPeriod;
use crate::db;
use crate::errors::AppResult;
use crate::models::User;
use crate::utils::{format_duration, format_table, now_secs, truncate};

#[derive(Debug, Clone)]
pub struct StatusRow {
    pub user: User,
    /// Name of the task the user is checked into, if any.
    pub active_task: Option<String>,
    /// Elapsed time on the active task.
    pub elapsed: Option<Duration>,
    /// Total closed time logged today (UTC day).
    pub today_total: Duration,
}

/// One row per roster member, active sessions first, then by name.
pub fn workspace_status(conn: &Connection, workspace_id: &str) -> AppResult<Vec<StatusRow>> {
    let now = now_secs();
    let (today_start, _) = ReportPeriod::Today.window(now);

    let roster = db::get_workspace_users(conn, workspace_id)?;
    let actives = db::get_all_active_check_ins(conn, workspace_id)?;
    let today = db::get_task_history(conn, workspace_id, None, today_start, now)?;

    let mut totals: std::collections::HashMap<Uuid, Duration> = std::collections::HashMap::new();
    for entry in &today {
        if let Some(duration) = entry.check_in.duration() {
            let total = totals
                .entry(entry.check_in.user_id)
                .or_insert_with(Duration::zero);
            *total = *total + duration;
        }
    }

    let mut rows: Vec<StatusRow> = roster
        .into_iter()
        .map(|user| {
            let active = actives.iter().find(|row| row.user.id == user.id);
            StatusRow {
                active_task: active.map(|row| row.task.name.clone()),
                elapsed: active.map(|row| now - row.check_in.start_time),
                today_total: totals.get(&user.id).copied().unwrap_or_else(Duration::zero),
                user,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.active_task
            .is_some()
            .cmp(&a.active_task.is_some())
            .then_with(|| a.user.display_name.cmp(&b.user.display_name))
    });

    Ok(rows)
}

pub fn render_text(rows: &[StatusRow]) -> String {
    if rows.is_empty() {
        return "No activity recorded".to_string();
    }

    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                truncate(&row.user.display_name, 20),
                if row.active_task.is_some() {
                    "online".to_string()
                } else {
                    "offline".to_string()
                },
                format_duration(row.today_total),
                row.active_task
                    .as_deref()
                    .map(|t| truncate(t, 30))
                    .unwrap_or_else(|| "N/A".to_string()),
                row.elapsed.map(format_duration).unwrap_or_default(),
            ]
        })
        .collect();

    format_table(
        &["USER", "STATUS", "TODAY TOTAL", "CURRENT TASK", "ELAPSED"],
        &table_rows,
    )
}
