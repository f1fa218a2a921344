use crate::error::Result;
use serde::Serialize;

/// Column headers of the DuPont table, in display order
pub const DUPONT_HEADERS: [&str; 5] = [
    "Year",
    "Net Profit Margin",
    "Asset Turnover",
    "Equity Multiplier",
    "ROE",
];

/// One line of the DuPont decomposition
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DupontRow {
    pub year: i32,
    pub net_profit_margin: Option<f64>,
    pub asset_turnover: Option<f64>,
    pub equity_multiplier: Option<f64>,
    pub roe: Option<f64>,
}

impl DupontRow {
    fn metrics(&self) -> [Option<f64>; 4] {
        [
            self.net_profit_margin,
            self.asset_turnover,
            self.equity_multiplier,
            self.roe,
        ]
    }
}

/// Convert the DuPont table to CSV format
///
/// The first line holds the headers. Blank metrics become empty fields.
///
/// # Examples
/// ```
/// use fsa_dashboard::downloader::{dupont_to_csv, DupontRow};
///
/// let rows = vec![DupontRow {
///     year: 2021,
///     net_profit_margin: Some(0.12),
///     asset_turnover: Some(1.1),
///     equity_multiplier: None,
///     roe: Some(0.2),
/// }];
/// let csv = dupont_to_csv(&rows);
/// assert_eq!(csv.lines().nth(1), Some("2021,0.12,1.1,,0.2"));
/// ```
pub fn dupont_to_csv(rows: &[DupontRow]) -> String {
    let mut csv_content = String::new();

    let header: Vec<String> = DUPONT_HEADERS.iter().map(|h| escape_csv(h)).collect();
    csv_content.push_str(&header.join(","));
    csv_content.push('\n');

    for row in rows {
        csv_content.push_str(&row.year.to_string());
        for value in row.metrics() {
            csv_content.push(',');
            if let Some(v) = value {
                csv_content.push_str(&v.to_string());
            }
        }
        csv_content.push('\n');
    }

    csv_content
}

/// Convert the DuPont table to XLSX format
///
/// Produces a single worksheet named "DuPont" with a bold header row.
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
pub fn dupont_to_xlsx(rows: &[DupontRow]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("DuPont")?;

    let bold = Format::new().set_bold();
    for (c, header) in DUPONT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *header, &bold)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        worksheet.write_number(r, 0, f64::from(row.year))?;
        for (c, value) in row.metrics().into_iter().enumerate() {
            if let Some(v) = value {
                worksheet.write_number(r, (c + 1) as u16, v)?;
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

/// Quote a CSV field when it holds a comma, quote or newline
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
