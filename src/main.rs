#![cfg(not(tarpaulin_include))]

use fsa_dashboard::app;
use fsa_dashboard::config::DashboardConfig;
use std::env;

/// Main entry point for the dashboard web server
///
/// # Arguments
/// * `[workbook_path]` - Workbook to load (default `FSAFAWAIExcel_Final.xlsx`)
/// * `[bind_addr]` - Address to listen on (default `127.0.0.1:3000`)
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - fails when the workbook cannot be opened
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = DashboardConfig::from_args(&args);

    log::info!(
        "Starting dashboard for {} on {}",
        config.workbook_path.display(),
        config.bind_addr
    );
    app::run(config).await
}
