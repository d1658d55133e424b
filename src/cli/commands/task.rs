use crate::cli::{open_db, parse_task_id, resolve_user, Capabilities};
use crate::config::Config;
use crate::db;
use crate::errors::{AppError, AppResult};

/// Update a task's completed status. Owner or administrator only; the
/// currently active task cannot be updated.
pub fn handle(task: &str, status: &str, cfg: &Config, caps: &dyn Capabilities) -> AppResult<()> {
    let task_id = parse_task_id(task)?;
    let completed = match status {
        "completed" => true,
        "open" => false,
        other => {
            return Err(AppError::InvalidInput(format!(
                "unknown status '{}' (use open or completed)",
                other
            )));
        }
    };

    let pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;

    let target = db::get_task_by_id(&pool.conn, task_id)?
        .ok_or_else(|| AppError::NotFound("task".to_string()))?;

    let is_admin = caps.is_admin(&cfg.workspace, &user.external_id);
    if !is_admin && target.owner_id != user.id {
        return Err(AppError::Unauthorized(
            "you can only update your own tasks".to_string(),
        ));
    }

    if let Some(active) = db::get_active_check_in(&pool.conn, user.id, &cfg.workspace)? {
        if active.task_id == task_id {
            return Err(AppError::InvalidInput(
                "cannot update the status of an active task; check out first".to_string(),
            ));
        }
    }

    db::update_task_status(&pool.conn, task_id, completed)?;

    let mut message = format!("Task '{}' marked as {}", target.name, status);
    if is_admin && target.owner_id != user.id {
        message.push_str(" (admin action)");
    }
    println!("{}", message);
    Ok(())
}
