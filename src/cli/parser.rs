use clap::{Parser, Subcommand};

/// Command-line interface definition for taskbot.
/// Plays the role of the chat-command dispatcher against a local database.
#[derive(Parser)]
#[command(
    name = "taskbot",
    version = env!("CARGO_PKG_VERSION"),
    about = "Check in and out of tasks, declare elapsed effort, and pull time-tracking reports",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Workspace to act in (defaults to the configured one)
    #[arg(global = true, long = "workspace")]
    pub workspace: Option<String>,

    /// Act as this user (opaque external id)
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Display name used when the user is first created
    #[arg(global = true, long = "display-name")]
    pub display_name: Option<String>,

    /// Grant administrator capability for this invocation
    #[arg(global = true, long = "admin")]
    pub admin: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Start working on a task (closes any session already running)
    Checkin {
        #[command(subcommand)]
        target: CheckinTarget,
    },

    /// Stop working on the current task
    Checkout,

    /// Record already-elapsed effort without touching the running session
    Declare {
        /// Task id to book the time on
        task: String,

        /// Elapsed effort, e.g. 1h30m, 45m, or a number of minutes
        duration: String,
    },

    /// Show who is working on what in the workspace
    Status,

    /// Show aggregated task history for a period
    Report {
        /// today, week, month, last_month, or month_2..month_6
        period: String,

        /// Output format: text or csv (csv is admin-only)
        #[arg(long = "format", default_value = "text")]
        format: String,

        /// Filter to a single user (external id)
        #[arg(long = "user-filter")]
        user_filter: Option<String>,
    },

    /// List the tasks you can check into
    Tasks,

    /// Update a task's status
    Task {
        /// Task id
        task: String,

        /// New status: open or completed
        status: String,
    },

    /// Create a global task usable by everyone in the workspace (admin only)
    Globaltask {
        name: String,

        #[arg(long = "description", default_value = "")]
        description: String,
    },

    /// Set your timezone (IANA name, e.g. Europe/Rome)
    Timezone { zone: String },
}

#[derive(Subcommand)]
pub enum CheckinTarget {
    /// Check in to an existing task by id
    Existing { task: String },

    /// Create a new task and check in to it
    New {
        name: String,

        #[arg(long = "description", default_value = "")]
        description: String,
    },
}
