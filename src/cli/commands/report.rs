use crate::cli::{open_db, Capabilities};
use crate::config::Config;
use crate::core::report::{self, ReportPeriod};
use crate::errors::{AppError, AppResult};
use crate::utils::now_secs;

pub fn handle(
    period: &str,
    format: &str,
    user_filter: Option<&str>,
    cfg: &Config,
    caps: &dyn Capabilities,
) -> AppResult<()> {
    let period = ReportPeriod::parse(period)?;

    if format == "csv" && !caps.is_admin(&cfg.workspace, &cfg.user) {
        return Err(AppError::Unauthorized(
            "CSV format is only available for administrators".to_string(),
        ));
    }

    let pool = open_db(cfg)?;
    let (start, end) = period.window(now_secs());
    let reports = report::build_report(&pool.conn, &cfg.workspace, start, end, user_filter)?;

    match format {
        "csv" => print!("{}", report::render_csv(&reports)?),
        "text" => {
            let title = format!("Task history for {}", period.label());
            println!("{}", report::render_text(&title, &reports));
        }
        other => {
            return Err(AppError::InvalidInput(format!(
                "unknown report format '{}' (use text or csv)",
                other
            )));
        }
    }
    Ok(())
}
