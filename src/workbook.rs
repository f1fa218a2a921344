use crate::error::{DashboardError, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A single spreadsheet value after loading
///
/// Workbook cells arrive in many shapes (integers, floats, strings, dates,
/// formula errors). The dashboard only cares about four of them, so every
/// value is folded into one of these variants at load time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Cell {
    /// Blank cell, whitespace-only text or a formula error
    Empty,

    /// Any numeric value
    Number(f64),

    /// Non-blank text
    Text(String),

    /// Boolean value
    Bool(bool),
}

const EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::Empty | Data::Error(_) => Cell::Empty,
            // Dates and durations keep their display form
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{:.0}", n),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// One named table of the workbook
///
/// The first row of the worksheet is taken as the header row. Names are
/// lower-cased when the sheet is built so lookups never depend on how the
/// author capitalised a tab.
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Creates a sheet from a header row and data rows
    ///
    /// # Examples
    /// ```
    /// use fsa_dashboard::workbook::{Cell, Sheet};
    ///
    /// let sheet = Sheet::new("Forensic Scores", vec!["Company".into()], vec![vec![Cell::Text("Acme".into())]]);
    /// assert_eq!(sheet.name(), "forensic scores");
    /// assert_eq!(sheet.column_index("Company"), Some(0));
    /// ```
    pub fn new(name: impl AsRef<str>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Builds a sheet from a calamine cell range
    pub fn from_range(name: impl AsRef<str>, range: &Range<Data>) -> Self {
        let mut grid = range.rows();

        let headers = grid
            .next()
            .map(|header| header.iter().map(|c| Cell::from(c).to_string()).collect())
            .unwrap_or_default();

        let rows = grid
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Self::new(name, headers, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Position of the column whose header is exactly `header`
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at a data row and column, `Cell::Empty` past the end of a short row
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// All sheets of one workbook, in the order the file lists them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Reads every sheet of a workbook file
    ///
    /// The format is picked from the file extension (xlsx, xlsm, xlsb,
    /// xls or ods). Sheets are not filtered: whatever the workbook holds is
    /// loaded.
    ///
    /// # Errors
    /// * `DashboardError::MissingFile` if the file cannot be opened
    /// * `DashboardError::SheetRead` if a worksheet inside it is unreadable
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook =
            open_workbook_auto(path).map_err(|source| DashboardError::MissingFile {
                path: path.to_path_buf(),
                source,
            })?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|source| DashboardError::SheetRead {
                    sheet: name.clone(),
                    source,
                })?;
            log::debug!(
                "read sheet '{}' ({} x {})",
                name,
                range.height(),
                range.width()
            );
            sheets.push(Sheet::from_range(&name, &range));
        }

        log::info!(
            "loaded workbook {} with {} sheet(s)",
            path.display(),
            sheets.len()
        );
        Ok(Self { sheets })
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Sheet whose lower-cased name equals `name` (case-insensitive)
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let name = name.to_lowercase();
        self.sheets.iter().find(|s| s.name == name)
    }

    /// First sheet, in workbook order, whose name contains `keyword`
    ///
    /// Matching is a case-insensitive substring test. When several sheets
    /// match, the one listed first in the workbook wins.
    ///
    /// # Examples
    /// ```
    /// use fsa_dashboard::workbook::{Sheet, Workbook};
    ///
    /// let workbook = Workbook::from_sheets(vec![
    ///     Sheet::new("Ratio Analysis", vec![], vec![]),
    ///     Sheet::new("Financials", vec![], vec![]),
    /// ]);
    /// assert_eq!(workbook.find_sheet("FINANCIAL").map(|s| s.name()), Some("financials"));
    /// assert!(workbook.find_sheet("forensic").is_none());
    /// ```
    pub fn find_sheet(&self, keyword: &str) -> Option<&Sheet> {
        let keyword = keyword.to_lowercase();
        self.sheets.iter().find(|s| s.name.contains(&keyword))
    }
}
