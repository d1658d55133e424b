use crate::cli::parser::CheckinTarget;
use crate::cli::{open_db, parse_task_id, resolve_user};
use crate::config::Config;
use crate::core::session::{self, TaskRef};
use crate::errors::AppResult;
use crate::utils::format_duration;

pub fn handle(target: &CheckinTarget, cfg: &Config) -> AppResult<()> {
    let mut pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;

    let task_ref = match target {
        CheckinTarget::Existing { task } => TaskRef::Existing(parse_task_id(task)?),
        CheckinTarget::New { name, description } => TaskRef::New {
            name: name.clone(),
            description: description.clone(),
        },
    };

    let outcome = session::check_in(&mut pool.conn, &user, &cfg.workspace, task_ref)?;

    // The closed session is reported before the new one, so the auto
    // checkout is never silently dropped.
    if let Some(previous) = &outcome.previous {
        println!(
            "Checked out from task: {} (time spent: {})",
            previous.task_name,
            format_duration(previous.duration)
        );
    }
    println!("Started working on task: {}", outcome.task.name);
    Ok(())
}
