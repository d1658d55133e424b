use crate::cli::open_db;
use crate::config::Config;
use crate::core::status;
use crate::errors::AppResult;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let pool = open_db(cfg)?;
    let rows = status::workspace_status(&pool.conn, &cfg.workspace)?;
    println!("{}", status::render_text(&rows));
    Ok(())
}
