//! The render pipeline: resolved dataset in, finished report out.

use crate::downloader::DupontRow;
use crate::error::Result;
use crate::graph::{GraphOptions, GraphType, Series, create_graph};
use crate::tables::{AnalysisRow, Dataset, FinancialRow, ForensicRow};
use crate::verdict::Verdict;
use crate::workbook::Workbook;
use plotters::style::RGBColor;
use serde::Serialize;

/// Section headers, in the order the report lays them out
pub const SECTION_HEADERS: [&str; 4] = [
    "Financial Statement Analysis",
    "Efficiency & Liquidity",
    "Forensic Analysis",
    "Final Verdict",
];

const BLUE: RGBColor = RGBColor(31, 119, 180);
const ORANGE: RGBColor = RGBColor(255, 127, 14);
const GREEN: RGBColor = RGBColor(44, 160, 44);
const RED: RGBColor = RGBColor(214, 39, 40);

/// Everything the page needs to show one company
#[derive(Clone, Debug, Serialize)]
pub struct RenderedReport {
    /// Company the report was drawn for, `None` when there is nothing to pick
    pub company: Option<String>,

    /// Choices offered by the selection control
    pub companies: Vec<String>,

    /// Revenue, Profit and CFO over time
    pub snapshot_chart: String,

    /// DuPont decomposition, one row per year
    pub dupont: Vec<DupontRow>,

    /// DSO, DPO, DIO and CCC over time
    pub efficiency_chart: String,

    /// Working capital ratio and cash ratio over time
    pub liquidity_chart: String,

    /// Stacked M/F/Z scores with accruals overlaid
    pub forensic_chart: String,

    pub verdict: Verdict,
}

/// A validated dataset ready to be rendered for any company
#[derive(Clone, Debug)]
pub struct Dashboard {
    dataset: Dataset,
    chart_width: u32,
    chart_height: u32,
}

impl Dashboard {
    /// Resolves and validates the three sheets of the workbook
    ///
    /// # Errors
    /// * `DashboardError::MissingSheets` when a keyword lookup fails
    /// * schema errors from the typed tables
    pub fn new(workbook: &Workbook) -> Result<Self> {
        Ok(Self::from_dataset(Dataset::resolve(workbook)?))
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let defaults = GraphOptions::default();
        Self {
            dataset,
            chart_width: defaults.width,
            chart_height: defaults.height,
        }
    }

    /// Sets the pixel size of every chart
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = width;
        self.chart_height = height;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn companies(&self) -> Vec<String> {
        self.dataset.companies()
    }

    /// Rows of the DuPont table for one company
    pub fn dupont(&self, company: &str) -> Vec<DupontRow> {
        dupont_rows(self.dataset.analysis.filter(company).rows())
    }

    /// Renders the report for `company`
    ///
    /// Without a company the first selectable one is used. A company that
    /// is missing from some table simply leaves that table's charts empty.
    pub fn render(&self, company: Option<&str>) -> Result<RenderedReport> {
        let companies = self.companies();
        let selected = company
            .map(str::to_string)
            .or_else(|| companies.first().cloned());

        // blank ids are never stored, so "" selects nothing
        let view = self.dataset.filter(selected.as_deref().unwrap_or_default());

        log::debug!(
            "rendering '{}': {} financial, {} analysis, {} forensic row(s)",
            view.company,
            view.financials.len(),
            view.analysis.len(),
            view.forensic.len()
        );
        if view.financials.is_empty() || view.analysis.is_empty() || view.forensic.is_empty() {
            log::warn!("company '{}' has no rows in at least one sheet", view.company);
        }

        Ok(RenderedReport {
            company: selected,
            companies,
            snapshot_chart: self.snapshot_chart(view.financials.rows())?,
            dupont: dupont_rows(view.analysis.rows()),
            efficiency_chart: self.efficiency_chart(view.analysis.rows())?,
            liquidity_chart: self.liquidity_chart(view.analysis.rows())?,
            forensic_chart: self.forensic_chart(view.forensic.rows())?,
            verdict: Verdict::evaluate(view.forensic.rows()),
        })
    }

    fn options(&self, title: &str, graph_type: GraphType) -> GraphOptions {
        GraphOptions {
            title: title.to_string(),
            x_label: "Year".to_string(),
            y_label: String::new(),
            width: self.chart_width,
            height: self.chart_height,
            graph_type,
        }
    }

    fn snapshot_chart(&self, rows: &[FinancialRow]) -> Result<String> {
        let year = |r: &FinancialRow| r.year;
        let series = [
            Series::from_rows("Revenue", BLUE, rows, year, |r| r.revenue),
            Series::from_rows("Profit", ORANGE, rows, year, |r| r.profit),
            Series::from_rows("CFO", GREEN, rows, year, |r| r.cfo),
        ];
        create_graph(&series, &self.options("Company Snapshot", GraphType::Line))
    }

    fn efficiency_chart(&self, rows: &[AnalysisRow]) -> Result<String> {
        let year = |r: &AnalysisRow| r.year;
        let series = [
            Series::from_rows("DSO", BLUE, rows, year, |r| r.dso),
            Series::from_rows("DPO", ORANGE, rows, year, |r| r.dpo),
            Series::from_rows("DIO", GREEN, rows, year, |r| r.dio),
            Series::from_rows("CCC", RED, rows, year, |r| r.ccc),
        ];
        create_graph(&series, &self.options("Efficiency Ratios", GraphType::Line))
    }

    fn liquidity_chart(&self, rows: &[AnalysisRow]) -> Result<String> {
        let year = |r: &AnalysisRow| r.year;
        let series = [
            Series::from_rows("Working Capital Ratio", BLUE, rows, year, |r| r.wcr),
            Series::from_rows("Cash Ratio", ORANGE, rows, year, |r| r.cash_ratio),
        ];
        create_graph(&series, &self.options("Liquidity Ratios", GraphType::Line))
    }

    fn forensic_chart(&self, rows: &[ForensicRow]) -> Result<String> {
        let year = |r: &ForensicRow| r.year;
        let series = [
            Series::from_rows("M-Score", BLUE, rows, year, |r| r.m_score),
            Series::from_rows("F-Score", ORANGE, rows, year, |r| r.f_score),
            Series::from_rows("Z-Score", GREEN, rows, year, |r| r.z_score),
            Series::from_rows("Accruals", RED, rows, year, |r| r.accruals).overlay(0.6),
        ];
        create_graph(
            &series,
            &self.options("Forensic Scores", GraphType::StackedBar),
        )
    }
}

// rows without a year have no place in a per-year table
fn dupont_rows(rows: &[AnalysisRow]) -> Vec<DupontRow> {
    rows.iter()
        .filter_map(|r| r.year.map(|year| (year, r)))
        .map(|(year, r)| DupontRow {
            year,
            net_profit_margin: r.net_profit_margin,
            asset_turnover: r.asset_turnover,
            equity_multiplier: r.equity_multiplier,
            roe: r.roe,
        })
        .collect()
}

/// One complete pass of the pipeline over a loaded workbook
///
/// Resolves the sheets, validates them and renders the report for
/// `company`. Hosts that render many times should build a [`Dashboard`]
/// once instead.
pub fn render(workbook: &Workbook, company: Option<&str>) -> Result<RenderedReport> {
    Dashboard::new(workbook)?.render(company)
}
