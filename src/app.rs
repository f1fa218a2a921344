#![cfg(not(tarpaulin_include))]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::cache::WorkbookCache;
use crate::config::DashboardConfig;
use crate::downloader::{DupontRow, dupont_to_csv, dupont_to_xlsx};
use crate::error::{DashboardError, Result};
use crate::page::{self, PageOptions};
use crate::report::Dashboard;
use crate::workbook::Workbook;

/// What every request renders from
pub enum ReportSource {
    /// Sheets resolved and validated
    Ready(Dashboard),

    /// Sheets could not be resolved; every request shows this instead
    Failed { message: String, page: String },
}

pub struct AppState {
    source: ReportSource,
}

#[derive(Deserialize)]
pub struct ReportQuery {
    company: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

impl AppState {
    /// Resolves the workbook once for the lifetime of the server
    ///
    /// Missing sheets and schema problems do not stop the server: they are
    /// kept and shown on every request. Anything else is returned.
    pub fn from_workbook(workbook: &Workbook, config: &DashboardConfig) -> Result<Self> {
        let source = match Dashboard::new(workbook) {
            Ok(dashboard) => ReportSource::Ready(
                dashboard.with_chart_size(config.chart_width, config.chart_height),
            ),
            Err(err) if err.is_render_failure() => {
                log::error!("{}", err);
                ReportSource::Failed {
                    message: err.to_string(),
                    page: page::render_error(&err)?,
                }
            }
            Err(err) => return Err(err),
        };
        Ok(Self { source })
    }

    pub fn source(&self) -> &ReportSource {
        &self.source
    }
}

/// Builds the dashboard's routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_report))
        .route("/api/report", get(get_report))
        .route("/api/companies", get(get_companies))
        .route("/export/dupont.csv", get(export_csv))
        .route("/export/dupont.xlsx", get(export_xlsx))
        .with_state(state)
}

/// Loads the workbook, resolves it and serves the dashboard
///
/// A workbook that cannot be opened stops startup with an error.
pub async fn run(config: DashboardConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let workbook = WorkbookCache::global().load(&config.workbook_path)?;
    let state = Arc::new(AppState::from_workbook(&workbook, &config)?);

    let app = router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    log::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn error_page(err: &DashboardError) -> Response {
    log::error!("render failed: {}", err);
    match page::render_error(err) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

fn error_json(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            status: "error".to_string(),
            message,
        }),
    )
        .into_response()
}

async fn serve_report(
    Query(params): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let dashboard = match &state.source {
        ReportSource::Ready(dashboard) => dashboard,
        ReportSource::Failed { page, .. } => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(page.clone())).into_response();
        }
    };

    let html = dashboard
        .render(params.company.as_deref())
        .and_then(|report| page::render_report(&report, &PageOptions::default()));

    match html {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&e),
    }
}

async fn get_report(
    Query(params): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match &state.source {
        ReportSource::Ready(dashboard) => match dashboard.render(params.company.as_deref()) {
            Ok(report) => Json(report).into_response(),
            Err(e) => error_json(e.to_string()),
        },
        ReportSource::Failed { message, .. } => error_json(message.clone()),
    }
}

async fn get_companies(State(state): State<Arc<AppState>>) -> Response {
    match &state.source {
        ReportSource::Ready(dashboard) => Json(dashboard.companies()).into_response(),
        ReportSource::Failed { message, .. } => error_json(message.clone()),
    }
}

/// DuPont rows for the requested company, or the first one
fn dupont_for(state: &AppState, company: Option<&str>) -> std::result::Result<Vec<DupontRow>, String> {
    match &state.source {
        ReportSource::Ready(dashboard) => {
            let company = company
                .map(str::to_string)
                .or_else(|| dashboard.companies().into_iter().next())
                .unwrap_or_default();
            Ok(dashboard.dupont(&company))
        }
        ReportSource::Failed { message, .. } => Err(message.clone()),
    }
}

async fn export_csv(
    Query(params): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match dupont_for(&state, params.company.as_deref()) {
        Ok(rows) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"dupont.csv\""),
            ],
            dupont_to_csv(&rows),
        )
            .into_response(),
        Err(message) => error_json(message),
    }
}

async fn export_xlsx(
    Query(params): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let bytes = dupont_for(&state, params.company.as_deref())
        .and_then(|rows| dupont_to_xlsx(&rows).map_err(|e| e.to_string()));

    match bytes {
        Ok(bytes) => (
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"dupont.xlsx\""),
            ],
            bytes,
        )
            .into_response(),
        Err(message) => error_json(message),
    }
}
