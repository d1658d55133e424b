pub mod checkin;
pub mod checkout;
pub mod declare;
pub mod globaltask;
pub mod init;
pub mod report;
pub mod status;
pub mod task;
pub mod tasks;
pub mod timezone;
