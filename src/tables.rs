//! Typed views over the three sheets the dashboard reads.
//!
//! Each sheet is checked against its required header set once, when the
//! [`Dataset`] is resolved. After that every row is a plain struct with
//! named fields and nothing downstream looks columns up by string.

use crate::error::{DashboardError, Result};
use crate::workbook::{Cell, Sheet, Workbook};
use serde::Serialize;

/// Keyword locating the financial statements sheet
pub const FINANCIAL_KEYWORD: &str = "financial";

/// Keyword locating the ratio analysis sheet
pub const ANALYSIS_KEYWORD: &str = "analysis";

/// Keyword locating the forensic scores sheet
pub const FORENSIC_KEYWORD: &str = "forensic";

/// A row type that can be read out of a sheet
pub trait Record: Clone + Sized {
    /// Headers this row needs, besides the company column (always the first)
    const COLUMNS: &'static [&'static str];

    fn company(&self) -> Option<&str>;

    fn from_row(row: &RowReader<'_>) -> Result<Self>;
}

/// Access to one data row with the required columns already located
pub struct RowReader<'a> {
    sheet: &'a Sheet,
    row: usize,
    columns: &'a [usize],
    names: &'static [&'static str],
}

impl RowReader<'_> {
    fn required(&self, field: usize) -> &Cell {
        self.sheet.cell(self.row, self.columns[field])
    }

    fn invalid(&self, field: usize, cell: &Cell) -> DashboardError {
        DashboardError::InvalidCell {
            sheet: self.sheet.name().to_string(),
            // header is row 1
            row: self.row + 2,
            column: self.names[field].to_string(),
            found: cell.to_string(),
        }
    }

    /// Value of the first column as text, `None` when blank
    pub fn company(&self) -> Option<String> {
        match self.sheet.cell(self.row, 0) {
            Cell::Empty => None,
            cell => Some(cell.to_string()),
        }
    }

    /// Integer year at the `field`-th required column, `None` when blank
    pub fn year(&self, field: usize) -> Result<Option<i32>> {
        let cell = self.required(field);
        let value = match cell {
            Cell::Empty => return Ok(None),
            Cell::Text(s) if is_missing_marker(s) => return Ok(None),
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Bool(_) => None,
        };
        match value {
            Some(v) if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 => {
                Ok(Some(v as i32))
            }
            _ => Err(self.invalid(field, cell)),
        }
    }

    /// Numeric metric at the `field`-th required column
    ///
    /// Blank cells, missing-value markers such as `n/a` and non-finite
    /// numbers are all `None`.
    pub fn metric(&self, field: usize) -> Result<Option<f64>> {
        let cell = self.required(field);
        let value = match cell {
            Cell::Empty => return Ok(None),
            Cell::Text(s) if is_missing_marker(s) => return Ok(None),
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| self.invalid(field, cell))?,
            Cell::Bool(_) => return Err(self.invalid(field, cell)),
        };
        Ok(Some(value).filter(|v| v.is_finite()))
    }
}

/// Text a spreadsheet author uses for "no value", matched after trimming
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_marker(text: &str) -> bool {
    MISSING_MARKERS.contains(&text.trim())
}

/// Rows of one resolved sheet
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table<R> {
    sheet: String,
    rows: Vec<R>,
}

impl<R: Record> Table<R> {
    /// Validates the sheet's headers and converts every non-blank row
    ///
    /// # Errors
    /// * `DashboardError::MissingColumns` listing every absent header
    /// * `DashboardError::InvalidCell` for the first cell that cannot be typed
    pub fn from_sheet(sheet: &Sheet) -> Result<Self> {
        let mut columns = Vec::with_capacity(R::COLUMNS.len());
        let mut missing = Vec::new();
        for name in R::COLUMNS {
            match sheet.column_index(name) {
                Some(idx) => columns.push(idx),
                None => missing.push(name.to_string()),
            }
        }
        if sheet.headers().is_empty() {
            missing.insert(0, "company (first column)".to_string());
        }
        if !missing.is_empty() {
            return Err(DashboardError::MissingColumns {
                sheet: sheet.name().to_string(),
                columns: missing,
            });
        }

        let mut rows = Vec::new();
        for (idx, cells) in sheet.rows().iter().enumerate() {
            if cells.iter().all(Cell::is_empty) {
                continue;
            }
            let reader = RowReader {
                sheet,
                row: idx,
                columns: &columns,
                names: R::COLUMNS,
            };
            rows.push(R::from_row(&reader)?);
        }

        log::debug!("sheet '{}' validated with {} row(s)", sheet.name(), rows.len());
        Ok(Self {
            sheet: sheet.name().to_string(),
            rows,
        })
    }

    pub fn from_rows(sheet: impl Into<String>, rows: Vec<R>) -> Self {
        Self {
            sheet: sheet.into(),
            rows,
        }
    }

    /// Name of the sheet the rows came from
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose company equals `company` exactly
    pub fn filter(&self, company: &str) -> Self {
        Self {
            sheet: self.sheet.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.company() == Some(company))
                .cloned()
                .collect(),
        }
    }

    /// Distinct non-blank companies in first-seen order
    pub fn companies(&self) -> Vec<String> {
        let mut seen = Vec::<String>::new();
        for company in self.rows.iter().filter_map(|r| r.company()) {
            if !seen.iter().any(|c| c == company) {
                seen.push(company.to_string());
            }
        }
        seen
    }
}

/// One year of income statement and cash flow figures
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialRow {
    pub company: Option<String>,
    pub year: Option<i32>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    pub cfo: Option<f64>,
}

impl Record for FinancialRow {
    const COLUMNS: &'static [&'static str] = &["Year", "Revenue", "Profit", "CFO"];

    fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            company: row.company(),
            year: row.year(0)?,
            revenue: row.metric(1)?,
            profit: row.metric(2)?,
            cfo: row.metric(3)?,
        })
    }
}

/// One year of DuPont, efficiency and liquidity ratios
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub company: Option<String>,
    pub year: Option<i32>,
    pub net_profit_margin: Option<f64>,
    pub asset_turnover: Option<f64>,
    pub equity_multiplier: Option<f64>,
    pub roe: Option<f64>,
    pub dso: Option<f64>,
    pub dpo: Option<f64>,
    pub dio: Option<f64>,
    pub ccc: Option<f64>,
    pub wcr: Option<f64>,
    pub cash_ratio: Option<f64>,
}

impl Record for AnalysisRow {
    const COLUMNS: &'static [&'static str] = &[
        "Year",
        "Net Profit Margin",
        "Asset Turnover",
        "Equity Multiplier",
        "ROE",
        "DSO",
        "DPO",
        "DIO",
        "CCC",
        "WCR",
        "Cash Ratio",
    ];

    fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            company: row.company(),
            year: row.year(0)?,
            net_profit_margin: row.metric(1)?,
            asset_turnover: row.metric(2)?,
            equity_multiplier: row.metric(3)?,
            roe: row.metric(4)?,
            dso: row.metric(5)?,
            dpo: row.metric(6)?,
            dio: row.metric(7)?,
            ccc: row.metric(8)?,
            wcr: row.metric(9)?,
            cash_ratio: row.metric(10)?,
        })
    }
}

/// One year of manipulation and distress scores
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForensicRow {
    pub company: Option<String>,
    pub year: Option<i32>,
    pub m_score: Option<f64>,
    pub f_score: Option<f64>,
    pub z_score: Option<f64>,
    pub accruals: Option<f64>,
}

impl Record for ForensicRow {
    const COLUMNS: &'static [&'static str] = &["Year", "M_Score", "F_Score", "Z_Score", "Accruals"];

    fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            company: row.company(),
            year: row.year(0)?,
            m_score: row.metric(1)?,
            f_score: row.metric(2)?,
            z_score: row.metric(3)?,
            accruals: row.metric(4)?,
        })
    }
}

/// The three validated tables the report is drawn from
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub financials: Table<FinancialRow>,
    pub analysis: Table<AnalysisRow>,
    pub forensic: Table<ForensicRow>,
}

impl Dataset {
    /// Locates the three sheets by keyword and validates them
    ///
    /// # Errors
    /// * `DashboardError::MissingSheets` naming every keyword with no match
    /// * any schema error raised by [`Table::from_sheet`]
    pub fn resolve(workbook: &Workbook) -> Result<Self> {
        let financials = workbook.find_sheet(FINANCIAL_KEYWORD);
        let analysis = workbook.find_sheet(ANALYSIS_KEYWORD);
        let forensic = workbook.find_sheet(FORENSIC_KEYWORD);

        let (financials, analysis, forensic) = match (financials, analysis, forensic) {
            (Some(fin), Some(ana), Some(forn)) => (fin, ana, forn),
            (fin, ana, forn) => {
                let missing = [
                    (FINANCIAL_KEYWORD, fin.is_none()),
                    (ANALYSIS_KEYWORD, ana.is_none()),
                    (FORENSIC_KEYWORD, forn.is_none()),
                ]
                .into_iter()
                .filter_map(|(keyword, absent)| absent.then_some(keyword))
                .collect();
                return Err(DashboardError::MissingSheets {
                    missing,
                    available: workbook.sheet_names().iter().map(|n| n.to_string()).collect(),
                });
            }
        };

        log::info!(
            "resolved sheets: financial='{}', analysis='{}', forensic='{}'",
            financials.name(),
            analysis.name(),
            forensic.name()
        );

        Ok(Self {
            financials: Table::from_sheet(financials)?,
            analysis: Table::from_sheet(analysis)?,
            forensic: Table::from_sheet(forensic)?,
        })
    }

    /// Companies offered for selection, taken from the financial table
    pub fn companies(&self) -> Vec<String> {
        self.financials.companies()
    }

    /// The three tables narrowed to one company
    pub fn filter(&self, company: &str) -> CompanyView {
        CompanyView {
            company: company.to_string(),
            financials: self.financials.filter(company),
            analysis: self.analysis.filter(company),
            forensic: self.forensic.filter(company),
        }
    }
}

/// Per-company slice of a [`Dataset`]
#[derive(Clone, Debug, PartialEq)]
pub struct CompanyView {
    pub company: String,
    pub financials: Table<FinancialRow>,
    pub analysis: Table<AnalysisRow>,
    pub forensic: Table<ForensicRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(n: f64) -> Cell {
        Cell::Number(n)
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn forensic_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet::new(
            "Forensic",
            headers(&["Company", "Year", "M_Score", "F_Score", "Z_Score", "Accruals"]),
            rows,
        )
    }

    #[test]
    fn rows_are_typed_by_header_not_position() {
        let sheet = Sheet::new(
            "Financials",
            headers(&["Company", "CFO", "Year", "Profit", "Revenue", "Extra"]),
            vec![vec![text("Acme"), num(3.0), num(2021.0), num(2.0), num(10.0), text("x")]],
        );
        let table = Table::<FinancialRow>::from_sheet(&sheet).unwrap();
        assert_eq!(
            table.rows()[0],
            FinancialRow {
                company: Some("Acme".into()),
                year: Some(2021),
                revenue: Some(10.0),
                profit: Some(2.0),
                cfo: Some(3.0),
            }
        );
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let sheet = Sheet::new("Forensic", headers(&["Company", "Year", "M_Score"]), vec![]);
        match Table::<ForensicRow>::from_sheet(&sheet) {
            Err(DashboardError::MissingColumns { sheet, columns }) => {
                assert_eq!(sheet, "forensic");
                assert_eq!(columns, vec!["F_Score", "Z_Score", "Accruals"]);
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn blank_rows_are_skipped_and_blank_metrics_are_missing() {
        let sheet = forensic_sheet(vec![
            vec![text("Acme"), num(2020.0), num(-3.0), Cell::Empty, num(4.0), num(0.1)],
            vec![Cell::Empty; 6],
            vec![text("Acme"), text(" 2021 "), text("-2.5"), num(5.0), num(3.5), Cell::Empty],
        ]);
        let table = Table::<ForensicRow>::from_sheet(&sheet).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].f_score, None);
        assert_eq!(table.rows()[1].year, Some(2021));
        assert_eq!(table.rows()[1].m_score, Some(-2.5));
        assert_eq!(table.rows()[1].accruals, None);
    }

    #[test]
    fn non_numeric_metric_names_its_cell() {
        let sheet = forensic_sheet(vec![vec![
            text("Acme"),
            num(2020.0),
            text("restated"),
            num(1.0),
            num(1.0),
            num(1.0),
        ]]);
        match Table::<ForensicRow>::from_sheet(&sheet) {
            Err(DashboardError::InvalidCell { row, column, found, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "M_Score");
                assert_eq!(found, "restated");
            }
            other => panic!("expected invalid cell, got {:?}", other),
        }
    }

    #[test]
    fn missing_markers_read_as_blank() {
        let sheet = forensic_sheet(vec![
            vec![text("Acme"), num(2020.0), text("n/a"), text(" #N/A "), text("NA"), text("null")],
            vec![text("Acme"), num(2021.0), text("NaN"), text("inf"), text("-inf"), num(0.2)],
        ]);
        let table = Table::<ForensicRow>::from_sheet(&sheet).unwrap();
        let first = &table.rows()[0];
        assert_eq!(
            (first.m_score, first.f_score, first.z_score, first.accruals),
            (None, None, None, None)
        );
        let second = &table.rows()[1];
        assert_eq!(
            (second.m_score, second.f_score, second.z_score, second.accruals),
            (None, None, None, Some(0.2))
        );
    }

    #[test]
    fn blank_year_keeps_the_row() {
        let sheet = forensic_sheet(vec![
            vec![text("Acme"), Cell::Empty, num(-3.0), num(1.0), num(4.0), num(0.1)],
            vec![text("Acme"), text("N/A"), num(-2.0), num(1.0), num(3.0), num(0.1)],
        ]);
        let table = Table::<ForensicRow>::from_sheet(&sheet).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.rows().iter().all(|r| r.year.is_none()));
        assert_eq!(table.rows()[0].m_score, Some(-3.0));
    }

    #[test]
    fn fractional_year_is_rejected() {
        let sheet = forensic_sheet(vec![vec![
            text("Acme"),
            num(2020.5),
            num(1.0),
            num(1.0),
            num(1.0),
            num(1.0),
        ]]);
        assert!(matches!(
            Table::<ForensicRow>::from_sheet(&sheet),
            Err(DashboardError::InvalidCell { .. })
        ));
    }

    #[test]
    fn numeric_company_ids_render_as_integers() {
        let sheet = forensic_sheet(vec![vec![
            num(500325.0),
            num(2020.0),
            num(1.0),
            num(1.0),
            num(1.0),
            num(1.0),
        ]]);
        let table = Table::<ForensicRow>::from_sheet(&sheet).unwrap();
        assert_eq!(table.companies(), vec!["500325"]);
    }

    #[test]
    fn companies_are_distinct_in_first_seen_order() {
        let sheet = forensic_sheet(vec![
            vec![text("Beta"), num(2020.0), num(1.0), num(1.0), num(1.0), num(1.0)],
            vec![text("Acme"), num(2020.0), num(1.0), num(1.0), num(1.0), num(1.0)],
            vec![Cell::Empty, num(2020.0), num(1.0), num(1.0), num(1.0), num(1.0)],
            vec![text("Beta"), num(2021.0), num(1.0), num(1.0), num(1.0), num(1.0)],
        ]);
        let table = Table::<ForensicRow>::from_sheet(&sheet).unwrap();
        assert_eq!(table.companies(), vec!["Beta", "Acme"]);
    }

    #[test]
    fn filter_matches_exactly_and_is_idempotent() {
        let sheet = forensic_sheet(vec![
            vec![text("Acme"), num(2020.0), num(1.0), num(1.0), num(1.0), num(1.0)],
            vec![text("acme"), num(2020.0), num(1.0), num(1.0), num(1.0), num(1.0)],
            vec![text("Acme "), num(2020.0), num(1.0), num(1.0), num(1.0), num(1.0)],
            vec![text("Acme"), num(2021.0), num(1.0), num(1.0), num(1.0), num(1.0)],
        ]);
        let table = Table::<ForensicRow>::from_sheet(&sheet).unwrap();
        let once = table.filter("Acme");
        assert_eq!(once.len(), 2);
        assert!(once.len() <= table.len());
        assert!(once.rows().iter().all(|r| r.company() == Some("Acme")));
        assert_eq!(once.filter("Acme"), once);
        assert!(table.filter("Nobody").is_empty());
    }

    #[test]
    fn resolve_reports_every_missing_keyword() {
        let workbook = Workbook::from_sheets(vec![Sheet::new("Ratio Analysis", vec![], vec![])]);
        match Dataset::resolve(&workbook) {
            Err(DashboardError::MissingSheets { missing, available }) => {
                assert_eq!(missing, vec![FINANCIAL_KEYWORD, FORENSIC_KEYWORD]);
                assert_eq!(available, vec!["ratio analysis"]);
            }
            other => panic!("expected missing sheets, got {:?}", other),
        }
    }
}
