use crate::cli::{open_db, resolve_user, Capabilities};
use crate::config::Config;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::Task;

/// Create a task visible to everyone in the workspace. Admin only.
pub fn handle(name: &str, description: &str, cfg: &Config, caps: &dyn Capabilities) -> AppResult<()> {
    if !caps.is_admin(&cfg.workspace, &cfg.user) {
        return Err(AppError::Unauthorized(
            "only administrators can create global tasks".to_string(),
        ));
    }
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("task name is empty".to_string()));
    }

    let pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;

    let task = Task::new_global(user.id, &cfg.workspace, name.trim(), description);
    db::create_task(&pool.conn, &task)?;

    println!("Created global task: {} ({})", task.name, task.id);
    Ok(())
}
