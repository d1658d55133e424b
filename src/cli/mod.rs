pub mod commands;
pub mod parser;

use rusqlite::Connection;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// Capability check the core consults but never implements itself. A
/// chat-gateway dispatcher answers this from platform roles; the CLI
/// answers it from the `--admin` flag.
pub trait Capabilities {
    fn is_admin(&self, workspace_id: &str, user_external_id: &str) -> bool;
}

pub struct FlagCapabilities {
    pub admin: bool,
}

impl Capabilities for FlagCapabilities {
    fn is_admin(&self, _workspace_id: &str, _user_external_id: &str) -> bool {
        self.admin
    }
}

/// Open the configured database and make sure the schema exists
/// (schema creation is idempotent).
pub fn open_db(cfg: &Config) -> AppResult<db::DbPool> {
    let pool = db::DbPool::new(&cfg.database)?;
    db::init_db(&pool.conn)?;
    Ok(pool)
}

/// Resolve the acting user from the configured identity, creating them
/// lazily on first contact (as the chat dispatcher would on the first
/// interaction).
pub fn resolve_user(conn: &Connection, cfg: &Config) -> AppResult<User> {
    db::get_or_create_user(conn, &cfg.user, &cfg.display_name)
}

/// Parse a task id argument.
pub fn parse_task_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("invalid task id '{}'", raw)))
}
