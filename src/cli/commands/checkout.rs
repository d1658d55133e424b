use crate::cli::{open_db, resolve_user};
use crate::config::Config;
use crate::core::session;
use crate::errors::AppResult;
use crate::utils::format_duration;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;

    let outcome = session::check_out(&mut pool.conn, &user, &cfg.workspace)?;
    println!(
        "Checked out from task: {}\nTime spent: {}",
        outcome.task_name,
        format_duration(outcome.duration)
    );
    Ok(())
}
