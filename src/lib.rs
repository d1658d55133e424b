//! taskbot library root.
//!
//! The core (state machine in [`core::session`], persistence in [`db`],
//! aggregation in [`core::report`]) is a library consumed by a command
//! dispatcher; the bundled CLI is one such dispatcher, driving the same
//! inbound intents a chat gateway would.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use cli::FlagCapabilities;
use config::Config;
use errors::AppResult;

/// Central command dispatcher.
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let caps = FlagCapabilities { admin: cli.admin };
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cfg),
        Commands::Checkin { target } => cli::commands::checkin::handle(target, cfg),
        Commands::Checkout => cli::commands::checkout::handle(cfg),
        Commands::Declare { task, duration } => {
            cli::commands::declare::handle(task, duration, cfg)
        }
        Commands::Status => cli::commands::status::handle(cfg),
        Commands::Report {
            period,
            format,
            user_filter,
        } => cli::commands::report::handle(period, format, user_filter.as_deref(), cfg, &caps),
        Commands::Tasks => cli::commands::tasks::handle(cfg),
        Commands::Task { task, status } => cli::commands::task::handle(task, status, cfg, &caps),
        Commands::Globaltask { name, description } => {
            cli::commands::globaltask::handle(name, description, cfg, &caps)
        }
        Commands::Timezone { zone } => cli::commands::timezone::handle(zone, cfg),
    }
}

/// Entry point used by main.rs.
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load();

    // Command-line identity overrides win over the config file.
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(workspace) = &cli.workspace {
        cfg.workspace = workspace.clone();
    }
    if let Some(user) = &cli.user {
        cfg.user = user.clone();
        // A fresh identity needs a display name too; fall back to the id.
        cfg.display_name = cli.display_name.clone().unwrap_or_else(|| user.clone());
    } else if let Some(display_name) = &cli.display_name {
        cfg.display_name = display_name.clone();
    }

    dispatch(&cli, &cfg)
}
