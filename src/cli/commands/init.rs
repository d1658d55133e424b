use std::fs;
use std::path::Path;

use crate::cli::open_db;
use crate::config::Config;
use crate::errors::AppResult;

/// Initialize configuration and database.
pub fn handle(cfg: &Config) -> AppResult<()> {
    if !Config::config_file().exists() {
        cfg.save()?;
        println!("Configuration written to {}", Config::config_file().display());
    }

    if let Some(parent) = Path::new(&cfg.database).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    open_db(cfg)?;
    println!("Database initialized at {}", cfg.database);
    Ok(())
}
