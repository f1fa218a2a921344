/*!
# Financial & Forensic Dashboard

A single-page report over a workbook of company financials, ratio analysis
and forensic scores, built in Rust.

## Overview

The dashboard reads one spreadsheet workbook, locates the three sheets it
needs by keyword, lets the user pick a company and renders a fixed set of
charts, a DuPont table and a closing verdict derived from the company's
average M-Score and Z-Score.

## Architecture

The whole report is one synchronous pipeline, re-run for every selection:

### Loading
- **Workbook Loader** - Reads every sheet of the workbook (xlsx, xlsb, xls, ods)
- **Workbook Cache** - Parses a path once per process and shares it read-only

### Resolution
- **Sheet Resolver** - Finds the "financial", "analysis" and "forensic" sheets by
  case-insensitive substring, first match in workbook order
- **Typed Tables** - Validates required headers once and turns rows into structs

### Rendering
- **Company Filter** - Narrows each table to one company by exact match
- **Verdict Classifier** - Thresholds mean M-Score and mean Z-Score into three outcomes
- **Graph Renderer** - Draws line and stacked bar charts as SVG with plotters
- **Page Renderer** - Lays the report out as HTML with handlebars

### Hosting
- **Web Host** - axum server with the company picker, JSON API and exports
- **CLI** - Writes the report for one company to a standalone HTML file

## Modules

- **workbook**: Cell, Sheet and Workbook types, workbook loading and sheet lookup
- **cache**: Process-wide workbook cache with a reset hook
- **tables**: Typed rows, schema validation, company filtering
- **verdict**: Forensic verdict classification
- **graph**: SVG chart generation
- **downloader**: DuPont table export (CSV, XLSX)
- **report**: The render pipeline and its output
- **page**: HTML page rendering
- **app**: Routing and handlers (feature `web`)

## Expected workbook layout

| Sheet keyword | Columns (first column is always the company) |
|---------------|-----------------------------------------------|
| financial     | Year, Revenue, Profit, CFO |
| analysis      | Year, Net Profit Margin, Asset Turnover, Equity Multiplier, ROE, DSO, DPO, DIO, CCC, WCR, Cash Ratio |
| forensic      | Year, M_Score, F_Score, Z_Score, Accruals |

## REST API Endpoints

- `/?company={name}` - The report page
- `/api/report?company={name}` - The rendered report as JSON
- `/api/companies` - Companies offered by the picker
- `/export/dupont.csv?company={name}`, `/export/dupont.xlsx?company={name}` - DuPont table downloads
*/

#[cfg(feature = "web")]
pub mod app;
pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod graph;
pub mod page;
pub mod report;
pub mod tables;
pub mod verdict;
pub mod workbook;

pub use error::{DashboardError, Result};
pub use report::{Dashboard, RenderedReport, render};
