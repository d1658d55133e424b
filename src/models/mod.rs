pub mod checkin;
pub mod settings;
pub mod task;
pub mod user;

pub use checkin::{CheckIn, CheckInWithTask};
pub use settings::WorkspaceSettings;
pub use task::Task;
pub use user::User;
