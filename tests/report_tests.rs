//! Aggregator integration tests: roster inclusion, per-task breakdowns,
//! user filtering and the rendered output formats.

use chrono::Duration;
use rusqlite::Connection;

use taskbot::core::report::{self, build_report};
use taskbot::core::session::{self, TaskRef};
use taskbot::core::status;
use taskbot::db::{self, DbPool};
use taskbot::errors::AppError;
use taskbot::models::{CheckIn, Task, User};
use taskbot::utils::now_secs;

const WS: &str = "ws-1";

fn setup() -> DbPool {
    let pool = DbPool::in_memory().unwrap();
    db::init_db(&pool.conn).unwrap();
    pool
}

fn member(conn: &Connection, ext: &str, name: &str) -> User {
    db::get_or_create_user(conn, ext, name).unwrap()
}

fn new_task(conn: &Connection, owner: &User, name: &str) -> Task {
    let task = Task::new(owner.id, WS, name, "");
    db::create_task(conn, &task).unwrap();
    task
}

/// Record `minutes` of closed time on `task`, ending `end_ago` before now.
fn log_time(conn: &Connection, user: &User, task: &Task, minutes: i64, end_ago: Duration) {
    let end = now_secs() - end_ago;
    let ci = CheckIn::closed(user.id, WS, task.id, end - Duration::minutes(minutes), end);
    db::create_declared_check_in(conn, &ci).unwrap();
}

#[test]
fn zero_activity_member_appears_with_zero_total() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let bob = member(&pool.conn, "ext-bob", "Bob");
    let design = new_task(&pool.conn, &alice, "Design");
    let ops = new_task(&pool.conn, &bob, "Ops");

    // Alice logged time inside the window; Bob's only record ended two
    // days ago, so he is on the roster but idle in this window.
    log_time(&pool.conn, &alice, &design, 60, Duration::minutes(5));
    log_time(&pool.conn, &bob, &ops, 60, Duration::days(2));

    let reports = build_report(
        &pool.conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs(),
        None,
    )
    .unwrap();

    assert_eq!(reports.len(), 2);
    let bob_report = reports.iter().find(|r| r.user.id == bob.id).unwrap();
    assert_eq!(bob_report.total, Duration::zero());
    assert!(bob_report.tasks.is_empty());

    let alice_report = reports.iter().find(|r| r.user.id == alice.id).unwrap();
    assert_eq!(alice_report.total, Duration::minutes(60));
}

#[test]
fn per_task_breakdown_sums_to_user_total() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let design = new_task(&pool.conn, &alice, "Design");
    let code = new_task(&pool.conn, &alice, "Code");

    log_time(&pool.conn, &alice, &design, 30, Duration::minutes(90));
    log_time(&pool.conn, &alice, &design, 15, Duration::minutes(60));
    log_time(&pool.conn, &alice, &code, 45, Duration::minutes(10));

    let reports = build_report(
        &pool.conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs(),
        None,
    )
    .unwrap();

    assert_eq!(reports.len(), 1);
    let alice_report = &reports[0];
    assert_eq!(alice_report.total, Duration::minutes(90));
    assert_eq!(alice_report.tasks.len(), 2);

    // Breakdown is sorted by task name.
    assert_eq!(alice_report.tasks[0].task_name, "Code");
    assert_eq!(alice_report.tasks[0].total, Duration::minutes(45));
    assert_eq!(alice_report.tasks[1].task_name, "Design");
    assert_eq!(alice_report.tasks[1].total, Duration::minutes(45));
}

#[test]
fn open_sessions_do_not_count_toward_totals() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let design = new_task(&pool.conn, &alice, "Design");

    log_time(&pool.conn, &alice, &design, 20, Duration::minutes(30));
    let mut conn = pool.conn;
    session::check_in(&mut conn, &alice, WS, TaskRef::Existing(design.id)).unwrap();

    let reports = build_report(
        &conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs() + Duration::hours(1),
        None,
    )
    .unwrap();
    assert_eq!(reports[0].total, Duration::minutes(20));
}

#[test]
fn user_filter_narrows_to_one_member() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let bob = member(&pool.conn, "ext-bob", "Bob");
    let design = new_task(&pool.conn, &alice, "Design");
    let ops = new_task(&pool.conn, &bob, "Ops");

    log_time(&pool.conn, &alice, &design, 30, Duration::minutes(5));
    log_time(&pool.conn, &bob, &ops, 40, Duration::minutes(5));

    let reports = build_report(
        &pool.conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs(),
        Some("ext-bob"),
    )
    .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].user.external_id, "ext-bob");
    assert_eq!(reports[0].total, Duration::minutes(40));
}

#[test]
fn unknown_user_filter_is_not_found() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let design = new_task(&pool.conn, &alice, "Design");
    log_time(&pool.conn, &alice, &design, 30, Duration::minutes(5));

    let err = build_report(
        &pool.conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs(),
        Some("ext-nobody"),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn csv_rendering_emits_whole_seconds() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let bob = member(&pool.conn, "ext-bob", "Bob");
    let design = new_task(&pool.conn, &alice, "Design");
    let ops = new_task(&pool.conn, &bob, "Ops");

    log_time(&pool.conn, &alice, &design, 30, Duration::minutes(5));
    // Bob stays idle in the window.
    log_time(&pool.conn, &bob, &ops, 60, Duration::days(2));

    let reports = build_report(
        &pool.conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs(),
        None,
    )
    .unwrap();
    let csv = report::render_csv(&reports).unwrap();

    assert!(csv.starts_with("user,task,duration_seconds\n"));
    assert!(csv.contains("Alice,Design,1800"));
    assert!(csv.contains("Bob,,0"));
}

#[test]
fn text_rendering_lists_idle_members_as_no_tasks() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let design = new_task(&pool.conn, &alice, "Design");
    log_time(&pool.conn, &alice, &design, 30, Duration::days(2));

    let reports = build_report(
        &pool.conn,
        WS,
        now_secs() - Duration::hours(4),
        now_secs(),
        None,
    )
    .unwrap();
    let text = report::render_text("Task history for today", &reports);

    assert!(text.contains("Task history for today"));
    assert!(text.contains("Alice"));
    assert!(text.contains("No tasks"));
    assert!(text.contains("0s"));
}

#[test]
fn status_shows_active_sessions_first() {
    let pool = setup();
    let alice = member(&pool.conn, "ext-alice", "Alice");
    let bob = member(&pool.conn, "ext-bob", "Bob");
    let design = new_task(&pool.conn, &alice, "Design");
    let ops = new_task(&pool.conn, &bob, "Ops");

    // Bob is idle with some time logged today; Alice is online. Pin
    // Bob's record inside today's UTC window so a run shortly after
    // midnight still counts it.
    let now = now_secs();
    let (today_start, _) = report::ReportPeriod::Today.window(now);
    let start = std::cmp::max(today_start, now - Duration::minutes(35));
    let end = std::cmp::max(start + Duration::minutes(1), now - Duration::minutes(5));
    let expected = end - start;
    let ci = CheckIn::closed(bob.id, WS, ops.id, start, end);
    db::create_declared_check_in(&pool.conn, &ci).unwrap();
    let mut conn = pool.conn;
    session::check_in(&mut conn, &alice, WS, TaskRef::Existing(design.id)).unwrap();

    let rows = status::workspace_status(&conn, WS).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].user.display_name, "Alice");
    assert_eq!(rows[0].active_task.as_deref(), Some("Design"));
    assert!(rows[0].elapsed.is_some());
    assert_eq!(rows[1].user.display_name, "Bob");
    assert!(rows[1].active_task.is_none());
    assert_eq!(rows[1].today_total, expected);

    let text = status::render_text(&rows);
    assert!(text.contains("online"));
    assert!(text.contains("offline"));
}

#[test]
fn status_with_empty_roster_reports_no_activity() {
    let pool = setup();
    let rows = status::workspace_status(&pool.conn, WS).unwrap();
    assert!(rows.is_empty());
    assert_eq!(status::render_text(&rows), "No activity recorded");
}
