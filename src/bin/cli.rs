#![cfg(not(tarpaulin_include))]

use fsa_dashboard::cache::WorkbookCache;
use fsa_dashboard::config::DashboardConfig;
use fsa_dashboard::error::DashboardError;
use fsa_dashboard::page::{self, PageOptions};
use fsa_dashboard::report::Dashboard;
use std::env;
use std::process::ExitCode;

const DEFAULT_OUTPUT: &str = "report.html";

// Usage: fsa-report [company] [output.html]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let company = args.get(1).map(String::as_str);
    let output = args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUTPUT);
    let config = DashboardConfig::default();

    let workbook = match WorkbookCache::global().load(&config.workbook_path) {
        Ok(workbook) => workbook,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let offline = PageOptions {
        downloads: false,
        ..PageOptions::default()
    };

    let html = Dashboard::new(&workbook)
        .map(|d| d.with_chart_size(config.chart_width, config.chart_height))
        .and_then(|d| d.render(company))
        .and_then(|report| {
            if report.company.is_none() {
                log::warn!("workbook lists no companies");
            }
            page::render_report(&report, &offline)
        });

    match html {
        Ok(html) => match std::fs::write(output, html) {
            Ok(()) => {
                println!("Report written to {}", output);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: cannot write {}: {}", output, e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            if matches!(e, DashboardError::MissingSheets { .. }) {
                eprintln!("{}", page::MISSING_SHEETS_HEADLINE);
            }
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
