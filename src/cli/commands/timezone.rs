use chrono_tz::Tz;

use crate::cli::{open_db, resolve_user};
use crate::config::Config;
use crate::db;
use crate::errors::{AppError, AppResult};

pub fn handle(zone: &str, cfg: &Config) -> AppResult<()> {
    let tz: Tz = zone.parse().map_err(|_| {
        AppError::InvalidInput(
            "invalid timezone; use IANA names (e.g. America/New_York, Europe/London)".to_string(),
        )
    })?;

    let pool = open_db(cfg)?;
    let user = resolve_user(&pool.conn, cfg)?;
    db::update_user_timezone(&pool.conn, user.id, tz.name())?;

    println!("Timezone updated to {}", tz.name());
    Ok(())
}
