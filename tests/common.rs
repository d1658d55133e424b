#![allow(dead_code)]
use assert_cmd::{cargo_bin_cmd, Command};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const TEST_WORKSPACE: &str = "ws-test";
pub const TEST_USER: &str = "u-alice";
pub const TEST_NAME: &str = "Alice";

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_taskbot.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// taskbot invocation with an isolated config dir and a fixed identity
pub fn bot(config_dir: &std::path::Path, db_path: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("taskbot");
    cmd.env("XDG_CONFIG_HOME", config_dir);
    cmd.args([
        "--db",
        db_path,
        "--workspace",
        TEST_WORKSPACE,
        "--user",
        TEST_USER,
        "--display-name",
        TEST_NAME,
    ]);
    cmd
}

/// Same identity knobs for a second user
pub fn bot_as(
    config_dir: &std::path::Path,
    db_path: &str,
    user: &str,
    display_name: &str,
) -> Command {
    let mut cmd = cargo_bin_cmd!("taskbot");
    cmd.env("XDG_CONFIG_HOME", config_dir);
    cmd.args([
        "--db",
        db_path,
        "--workspace",
        TEST_WORKSPACE,
        "--user",
        user,
        "--display-name",
        display_name,
    ]);
    cmd
}
