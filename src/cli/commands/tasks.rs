use crate::cli::{open_db, resolve_user};
use crate::config::Config;
use crate::db;
use crate::errors::AppResult;
use crate::utils::{format_table, truncate};

/// List the tasks the user can check into: their own plus global ones,
/// newest first.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;
    let tasks = db::get_user_tasks(&pool.conn, user.id, &cfg.workspace)?;

    if tasks.is_empty() {
        println!("No tasks yet. Create one with `taskbot checkin new <name>`.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            vec![
                task.id.to_string(),
                truncate(&task.name, 30),
                if task.completed { "completed" } else { "open" }.to_string(),
                if task.global { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();

    println!("{}", format_table(&["ID", "NAME", "STATUS", "GLOBAL"], &rows));
    Ok(())
}
