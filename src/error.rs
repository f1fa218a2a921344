use std::path::PathBuf;
use thiserror::Error;

/// Every failure the dashboard pipeline can surface.
///
/// Errors split into two groups. Startup failures (`MissingFile`,
/// `SheetRead`) stop the process. Render failures (`MissingSheets`,
/// `MissingColumns`, `InvalidCell`) stop one render pass and are shown to
/// the user as a page instead of a report.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("cannot open workbook {}: {source}", .path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot read sheet '{sheet}': {source}")]
    SheetRead {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error(
        "no sheet matches keyword(s) {}; available sheets: {}",
        .missing.join(", "),
        .available.join(", ")
    )]
    MissingSheets {
        missing: Vec<&'static str>,
        available: Vec<String>,
    },

    #[error("sheet '{sheet}' is missing required column(s): {}", .columns.join(", "))]
    MissingColumns { sheet: String, columns: Vec<String> },

    #[error("sheet '{sheet}' row {row}: column '{column}' cannot hold '{found}'")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: String,
        found: String,
    },

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("page rendering failed: {0}")]
    Template(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// True when the error belongs to one render pass rather than to startup.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            DashboardError::MissingSheets { .. }
                | DashboardError::MissingColumns { .. }
                | DashboardError::InvalidCell { .. }
        )
    }
}

impl From<handlebars::RenderError> for DashboardError {
    fn from(err: handlebars::RenderError) -> Self {
        DashboardError::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for DashboardError {
    fn from(err: handlebars::TemplateError) -> Self {
        DashboardError::Template(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for DashboardError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        DashboardError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
