#![cfg(feature = "web")]

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::Router;
use common::*;
use fsa_dashboard::app::{AppState, ReportSource, router};
use fsa_dashboard::config::DashboardConfig;
use fsa_dashboard::page::MISSING_SHEETS_HEADLINE;
use fsa_dashboard::workbook::Workbook;
use std::sync::Arc;
use tower::ServiceExt;

fn app_for(fixture: &Fixture) -> Router {
    let workbook = Workbook::open(&fixture.path).unwrap();
    let state = AppState::from_workbook(&workbook, &DashboardConfig::default()).unwrap();
    router(Arc::new(state))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

fn text(body: Vec<u8>) -> String {
    String::from_utf8(body).unwrap()
}

#[tokio::test]
async fn index_shows_the_first_company() {
    let fixture = standard_workbook();
    let (status, content_type, body) = get(app_for(&fixture), "/").await;
    let html = text(body);

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(html.contains("<option value=\"Acme Corp\" selected"));
    assert!(html.contains("Strong financial position with low risk of manipulation."));
}

#[tokio::test]
async fn index_follows_the_selection() {
    let fixture = standard_workbook();
    let (status, _, body) = get(app_for(&fixture), "/?company=Beta%20Ltd").await;
    let html = text(body);

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<option value=\"Beta Ltd\" selected"));
    assert!(html.contains("High risk of manipulation and financial distress."));
}

#[tokio::test]
async fn report_api_returns_json() {
    let fixture = standard_workbook();
    let (status, _, body) = get(app_for(&fixture), "/api/report?company=Acme%20Corp").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["company"], "Acme Corp");
    assert_eq!(json["verdict"]["kind"], "strong");
    assert_eq!(json["dupont"].as_array().unwrap().len(), 2);
    assert!(json["forensic_chart"].as_str().unwrap().contains("<svg"));
}

#[tokio::test]
async fn companies_api_lists_the_picker_choices() {
    let fixture = standard_workbook();
    let (status, _, body) = get(app_for(&fixture), "/api/companies").await;
    assert_eq!(status, StatusCode::OK);

    let companies: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(companies, ["Acme Corp", "Beta Ltd", "Gamma Inc"]);
}

#[tokio::test]
async fn dupont_exports_as_csv() {
    let fixture = standard_workbook();
    let (status, content_type, body) =
        get(app_for(&fixture), "/export/dupont.csv?company=Acme%20Corp").await;
    let csv = text(body);

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Year,Net Profit Margin,Asset Turnover,Equity Multiplier,ROE");
    assert!(lines[1].starts_with("2021,0.125,"));
}

#[tokio::test]
async fn dupont_exports_as_xlsx() {
    let fixture = standard_workbook();
    let (status, content_type, body) =
        get(app_for(&fixture), "/export/dupont.xlsx?company=Beta%20Ltd").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().contains("spreadsheetml"));
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn missing_sheets_keep_the_server_up() {
    let fixture = write_workbook(&[financial_sheet(), notes_sheet()]);
    let workbook = Workbook::open(&fixture.path).unwrap();
    let state = AppState::from_workbook(&workbook, &DashboardConfig::default()).unwrap();
    assert!(matches!(state.source(), ReportSource::Failed { .. }));
    let app = router(Arc::new(state));

    let (status, _, body) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text(body).contains(MISSING_SHEETS_HEADLINE));

    let (status, _, body) = get(app, "/api/companies").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("analysis"));
}
