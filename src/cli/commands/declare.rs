use crate::cli::{open_db, parse_task_id, resolve_user};
use crate::config::Config;
use crate::core::session;
use crate::errors::AppResult;
use crate::utils::{format_duration, parse_duration};

pub fn handle(task: &str, duration: &str, cfg: &Config) -> AppResult<()> {
    let task_id = parse_task_id(task)?;
    let duration = parse_duration(duration)?;

    let mut pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;

    let outcome = session::declare(&mut pool.conn, &user, &cfg.workspace, task_id, duration)?;

    println!(
        "Declared {} on task: {}",
        format_duration(outcome.duration),
        outcome.task_name
    );
    if outcome.over_limit {
        println!("Note: the declared duration exceeds 8h and was flagged.");
    }
    if let Some(closed) = &outcome.auto_closed {
        println!(
            "Checked out from task: {} (time spent: {})",
            closed.task_name,
            format_duration(closed.duration)
        );
    }
    // Two separate facts: the declaration landed, the checkout did not.
    if let Some(failure) = &outcome.auto_close_failure {
        eprintln!(
            "Warning: the declaration was recorded, but closing the active session failed: {}",
            failure
        );
    }
    Ok(())
}
