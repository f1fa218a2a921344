#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use tempfile::TempDir;

/// A cell written into a fixture workbook
#[derive(Clone, Copy, Debug)]
pub enum Value {
    Text(&'static str),
    Num(f64),
    Blank,
}

pub use Value::{Blank, Num, Text};

pub struct SheetData {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

/// A workbook written to a temporary directory that lives as long as this value
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

pub fn write_workbook(sheets: &[SheetData]) -> Fixture {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("fixture.xlsx");

    let mut workbook = Workbook::new();
    for data in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(data.name).expect("sheet name");
        for (c, header) in data.headers.iter().enumerate() {
            sheet.write_string(0, c as u16, *header).expect("header");
        }
        for (r, row) in data.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = ((r + 1) as u32, c as u16);
                match value {
                    Text(s) => {
                        sheet.write_string(r, c, *s).expect("text cell");
                    }
                    Num(n) => {
                        sheet.write_number(r, c, *n).expect("number cell");
                    }
                    Blank => {}
                }
            }
        }
    }
    workbook.save(&path).expect("save workbook");

    Fixture { dir, path }
}

pub const FINANCIAL_HEADERS: [&str; 5] = ["Company", "Year", "Revenue", "Profit", "CFO"];

pub const ANALYSIS_HEADERS: [&str; 12] = [
    "Company",
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

pub const FORENSIC_HEADERS: [&str; 6] = ["Company", "Year", "M_Score", "F_Score", "Z_Score", "Accruals"];

pub fn financial_sheet() -> SheetData {
    SheetData {
        name: "Financial Statements",
        headers: FINANCIAL_HEADERS.to_vec(),
        rows: vec![
            vec![Text("Acme Corp"), Num(2021.0), Num(1200.0), Num(150.0), Num(180.0)],
            vec![Text("Acme Corp"), Num(2022.0), Num(1350.0), Num(170.0), Num(210.0)],
            vec![Text("Beta Ltd"), Num(2021.0), Num(800.0), Num(-20.0), Num(-5.0)],
            vec![Text("Beta Ltd"), Num(2022.0), Num(760.0), Num(-45.0), Num(-30.0)],
            vec![Text("Gamma Inc"), Num(2022.0), Num(300.0), Num(12.0), Blank],
            vec![Blank, Num(2022.0), Num(1.0), Num(1.0), Num(1.0)],
        ],
    }
}

pub fn analysis_sheet(name: &'static str) -> SheetData {
    let row = |company, year, npm, at, em, roe| {
        vec![
            Text(company),
            Num(year),
            Num(npm),
            Num(at),
            Num(em),
            Num(roe),
            Num(45.0),
            Num(60.0),
            Num(30.0),
            Num(15.0),
            Num(1.6),
            Num(0.4),
        ]
    };
    SheetData {
        name,
        headers: ANALYSIS_HEADERS.to_vec(),
        rows: vec![
            row("Acme Corp", 2021.0, 0.125, 1.1, 2.0, 0.275),
            row("Acme Corp", 2022.0, 0.126, 1.2, 1.9, 0.287),
            row("Beta Ltd", 2021.0, -0.025, 0.8, 3.1, -0.062),
        ],
    }
}

pub fn forensic_sheet() -> SheetData {
    SheetData {
        name: "Forensic Scores",
        headers: FORENSIC_HEADERS.to_vec(),
        rows: vec![
            vec![Text("Acme Corp"), Num(2021.0), Num(-3.0), Num(7.0), Num(4.0), Num(0.02)],
            vec![Text("Acme Corp"), Num(2022.0), Num(-2.8), Num(8.0), Num(3.6), Num(0.01)],
            vec![Text("Beta Ltd"), Num(2021.0), Num(-1.5), Num(3.0), Num(1.2), Num(0.09)],
            vec![Text("Beta Ltd"), Num(2022.0), Num(-1.1), Num(2.0), Num(1.0), Blank],
        ],
    }
}

pub fn notes_sheet() -> SheetData {
    SheetData {
        name: "Notes",
        headers: vec!["Comment"],
        rows: vec![vec![Text("Figures in INR crore")]],
    }
}

/// The complete workbook: three data sheets and an unrelated one
pub fn standard_workbook() -> Fixture {
    write_workbook(&[
        financial_sheet(),
        analysis_sheet("Ratio Analysis"),
        forensic_sheet(),
        notes_sheet(),
    ])
}
