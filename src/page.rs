use crate::downloader::DUPONT_HEADERS;
use crate::error::{DashboardError, Result};
use crate::report::{RenderedReport, SECTION_HEADERS};
use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;

/// Title shown in the browser tab and at the top of every page
pub const PAGE_TITLE: &str = "Financial & Forensic Dashboard";

/// Headline of the page shown when the sheets cannot be located
pub const MISSING_SHEETS_HEADLINE: &str =
    "Sheet names not detected correctly. Please check Excel sheet names.";

const REPORT_TEMPLATE: &str = include_str!("../templates/report.hbs");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.hbs");
const STYLESHEET: &str = include_str!("../templates/style.css");

// Four decimals for present values, blank for missing ones
handlebars_helper!(metric: |value: Json| match value.as_f64() {
    Some(v) => format!("{:.4}", v),
    None => String::new(),
});

/// Knobs for how the page links back to its host
#[derive(Clone, Debug)]
pub struct PageOptions {
    /// Path the company picker submits to
    pub base_path: String,

    /// Whether to show CSV/XLSX download links under the DuPont table
    pub downloads: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            downloads: true,
        }
    }
}

#[derive(Serialize)]
struct CompanyOption<'a> {
    name: &'a str,
    selected: bool,
}

#[derive(Serialize)]
struct Headers {
    financial: &'static str,
    efficiency: &'static str,
    forensic: &'static str,
    verdict: &'static str,
}

#[derive(Serialize)]
struct ReportContext<'a> {
    title: &'static str,
    css: &'static str,
    base_path: &'a str,
    headers: Headers,
    options: Vec<CompanyOption<'a>>,
    dupont_headers: [&'static str; 5],
    csv_link: Option<String>,
    xlsx_link: Option<String>,
    report: &'a RenderedReport,
    generated_at: String,
}

#[derive(Serialize)]
struct ErrorContext<'a> {
    title: &'static str,
    css: &'static str,
    headline: &'a str,
    detail: String,
}

fn templates() -> Result<Handlebars<'static>> {
    let mut hb = Handlebars::new();
    hb.register_helper("metric", Box::new(metric));
    hb.register_template_string("report", REPORT_TEMPLATE)?;
    hb.register_template_string("error", ERROR_TEMPLATE)?;
    Ok(hb)
}

fn export_link(base_path: &str, file: &str, company: &str) -> String {
    format!(
        "{}export/{}?company={}",
        base_path,
        file,
        urlencoding::encode(company)
    )
}

/// Renders a full HTML page for one report
///
/// Company names, table values and the verdict are HTML-escaped; chart SVG
/// is embedded as-is.
pub fn render_report(report: &RenderedReport, page: &PageOptions) -> Result<String> {
    let selected = report.company.as_deref();
    let options = report
        .companies
        .iter()
        .map(|name| CompanyOption {
            name,
            selected: Some(name.as_str()) == selected,
        })
        .collect();

    let link = |file: &str| {
        selected
            .filter(|_| page.downloads)
            .map(|company| export_link(&page.base_path, file, company))
    };

    let context = ReportContext {
        title: PAGE_TITLE,
        css: STYLESHEET,
        base_path: &page.base_path,
        headers: Headers {
            financial: SECTION_HEADERS[0],
            efficiency: SECTION_HEADERS[1],
            forensic: SECTION_HEADERS[2],
            verdict: SECTION_HEADERS[3],
        },
        options,
        dupont_headers: DUPONT_HEADERS,
        csv_link: link("dupont.csv"),
        xlsx_link: link("dupont.xlsx"),
        report,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    Ok(templates()?.render("report", &context)?)
}

/// Renders the page shown instead of a report when a render pass fails
pub fn render_error(err: &DashboardError) -> Result<String> {
    let headline = match err {
        DashboardError::MissingSheets { .. } => MISSING_SHEETS_HEADLINE,
        DashboardError::MissingColumns { .. } | DashboardError::InvalidCell { .. } => {
            "Workbook contents do not match the expected layout."
        }
        _ => "The report could not be rendered.",
    };

    let context = ErrorContext {
        title: PAGE_TITLE,
        css: STYLESHEET,
        headline,
        detail: err.to_string(),
    };

    Ok(templates()?.render("error", &context)?)
}
