//! Reporting aggregator: read-only fold of closed check-ins into
//! per-user totals and per-task breakdowns over a half-open UTC window.
//!
//! Zero-activity roster members are included with a zero total on
//! purpose; "who hasn't logged anything" is as useful as "who did what".

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::utils::{format_duration, format_table, truncate};

/// Named reporting period. Windows are computed in UTC by policy; no
/// per-user-timezone windowing is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Today,
    Week,
    Month,
    LastMonth,
    /// Full calendar month, 2..=6 months back.
    MonthsAgo(u32),
}

impl ReportPeriod {
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "last_month" => Ok(Self::LastMonth),
            "month_2" => Ok(Self::MonthsAgo(2)),
            "month_3" => Ok(Self::MonthsAgo(3)),
            "month_4" => Ok(Self::MonthsAgo(4)),
            "month_5" => Ok(Self::MonthsAgo(5)),
            "month_6" => Ok(Self::MonthsAgo(6)),
            other => Err(AppError::InvalidInput(format!(
                "unknown report period '{}'",
                other
            ))),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Today => "today".to_string(),
            Self::Week => "week".to_string(),
            Self::Month => "month".to_string(),
            Self::LastMonth => "last_month".to_string(),
            Self::MonthsAgo(n) => format!("month_{}", n),
        }
    }

    /// Half-open window `[start, end)` for this period relative to `now`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Today => (day_start(now), now),
            Self::Week => (now - Duration::days(7), now),
            Self::Month => (now - Months::new(1), now),
            Self::LastMonth => {
                let this_month = month_start(now);
                (this_month - Months::new(1), this_month)
            }
            Self::MonthsAgo(n) => {
                let this_month = month_start(now);
                (this_month - Months::new(*n), this_month - Months::new(n - 1))
            }
        }
    }
}

fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[derive(Debug, Clone)]
pub struct TaskTotal {
    pub task_id: Uuid,
    pub task_name: String,
    pub total: Duration,
}

#[derive(Debug, Clone)]
pub struct UserReport {
    pub user: User,
    pub total: Duration,
    /// Per-task breakdown, sorted by task name. Empty when the user
    /// logged nothing in the window.
    pub tasks: Vec<TaskTotal>,
}

/// Build the report for one workspace over `[start, end)`.
///
/// Every roster member appears, activity or not. With `user_filter`
/// (a platform external id) the report narrows to that single member.
pub fn build_report(
    conn: &Connection,
    workspace_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    user_filter: Option<&str>,
) -> AppResult<Vec<UserReport>> {
    let history = db::get_task_history(conn, workspace_id, None, start, end)?;
    let roster = db::get_workspace_users(conn, workspace_id)?;

    let mut user_totals: HashMap<Uuid, Duration> = HashMap::new();
    let mut task_totals: HashMap<(Uuid, Uuid), Duration> = HashMap::new();
    let mut task_names: HashMap<Uuid, String> = HashMap::new();

    for entry in &history {
        let ci = &entry.check_in;
        let Some(duration) = ci.duration() else {
            continue;
        };
        let user_total = user_totals.entry(ci.user_id).or_insert_with(Duration::zero);
        *user_total = *user_total + duration;
        let task_total = task_totals
            .entry((ci.user_id, ci.task_id))
            .or_insert_with(Duration::zero);
        *task_total = *task_total + duration;
        task_names.insert(ci.task_id, entry.task.name.clone());
    }

    let mut out = Vec::new();
    for user in roster {
        if let Some(filter) = user_filter {
            if user.external_id != filter {
                continue;
            }
        }

        let mut tasks: Vec<TaskTotal> = task_totals
            .iter()
            .filter(|((uid, _), _)| *uid == user.id)
            .map(|((_, task_id), total)| TaskTotal {
                task_id: *task_id,
                task_name: task_names.get(task_id).cloned().unwrap_or_default(),
                total: *total,
            })
            .collect();
        tasks.sort_by(|a, b| a.task_name.cmp(&b.task_name).then(a.task_id.cmp(&b.task_id)));

        out.push(UserReport {
            total: user_totals.get(&user.id).copied().unwrap_or_else(Duration::zero),
            tasks,
            user,
        });
    }

    if user_filter.is_some() && out.is_empty() {
        return Err(AppError::NotFound("user".to_string()));
    }

    Ok(out)
}

/// Text rendering: one row per (user, task), plus a "No tasks" row for
/// members with nothing in the window.
pub fn render_text(title: &str, reports: &[UserReport]) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for report in reports {
        if report.tasks.is_empty() {
            rows.push(vec![
                truncate(&report.user.display_name, 20),
                "No tasks".to_string(),
                format_duration(Duration::zero()),
            ]);
            continue;
        }
        for task in &report.tasks {
            rows.push(vec![
                truncate(&report.user.display_name, 20),
                truncate(&task.task_name, 30),
                format_duration(task.total),
            ]);
        }
    }

    format!(
        "{}\n\n{}",
        title,
        format_table(&["USER", "TASK", "DURATION"], &rows)
    )
}

/// CSV rendering, duration as whole seconds so the output stays
/// machine-consumable.
pub fn render_csv(reports: &[UserReport]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["user", "task", "duration_seconds"])
        .map_err(|e| AppError::Other(format!("csv error: {}", e)))?;

    for report in reports {
        if report.tasks.is_empty() {
            writer
                .write_record([report.user.display_name.as_str(), "", "0"])
                .map_err(|e| AppError::Other(format!("csv error: {}", e)))?;
            continue;
        }
        for task in &report.tasks {
            writer
                .write_record([
                    report.user.display_name.as_str(),
                    task.task_name.as_str(),
                    &task.total.num_seconds().to_string(),
                ])
                .map_err(|e| AppError::Other(format!("csv error: {}", e)))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Other(format!("csv error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Other(format!("csv error: {}", e)))
}
