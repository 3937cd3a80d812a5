//! File data sources for line-item tables: CSV and spreadsheet workbooks.
//!
//! Expected shape: a `name` column, a `category` column (`ASSET` or
//! `LIABILITY`), and one column per period. Period cells that are empty or
//! not numeric load as missing values instead of failing the whole file.
//! Workbooks are read from their first worksheet.

use crate::core::line_item::{Category, LineItem, LineItemTable};
use crate::core::period::PeriodId;
use calamine::{open_workbook_auto, Reader};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const NAME_COLUMN: &str = "name";
pub const CATEGORY_COLUMN: &str = "category";

/// Extensions routed to the workbook reader by [`load_path`].
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Structural problems with an input table. Analysis does not proceed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read workbook '{path}': {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },
    #[error("workbook '{0}' has no worksheets")]
    NoWorksheet(String),
    #[error("unsupported file format '{0}', expected csv or a spreadsheet workbook")]
    UnsupportedFormat(String),
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid category '{value}', expected ASSET or LIABILITY")]
    InvalidCategory { row: usize, value: String },
    #[error("no period columns besides 'name' and 'category'")]
    NoPeriodColumns,
    #[error("table has no line items")]
    Empty,
}

/// Load a table from disk, choosing the reader by file extension.
///
/// `.csv` and extension-less paths are read as CSV; workbook extensions go
/// through [`load_workbook_path`].
pub fn load_path(path: impl AsRef<Path>) -> Result<LineItemTable, SchemaError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "" | "csv" => load_csv_path(path),
        e if WORKBOOK_EXTENSIONS.contains(&e) => load_workbook_path(path),
        _ => Err(SchemaError::UnsupportedFormat(ext)),
    }
}

/// Load a table from a CSV file on disk.
pub fn load_csv_path(path: impl AsRef<Path>) -> Result<LineItemTable, SchemaError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_csv(file)
}

/// Load a table from any CSV reader.
pub fn load_csv<R: Read>(reader: R) -> Result<LineItemTable, SchemaError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader.records().map(|record| {
        record
            .map(|r| r.iter().map(str::to_string).collect())
            .map_err(SchemaError::from)
    });
    build_table(&headers, rows)
}

/// Load a table from the first worksheet of a spreadsheet workbook
/// (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
///
/// The first row holds the headers. Cells are rendered to text and go
/// through the same coercion as CSV cells.
pub fn load_workbook_path(path: impl AsRef<Path>) -> Result<LineItemTable, SchemaError> {
    let path = path.as_ref();
    let workbook_error = |source: calamine::Error| SchemaError::Workbook {
        path: path.display().to_string(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SchemaError::NoWorksheet(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name).map_err(workbook_error)?;
    log::debug!("reading worksheet '{}' of '{}'", sheet_name, path.display());

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    build_table(&headers, rows.map(Ok))
}

/// Turn a header row and data rows into a table. Row numbers in errors are
/// 1-based with the header on line 1.
fn build_table<I>(headers: &[String], rows: I) -> Result<LineItemTable, SchemaError>
where
    I: Iterator<Item = Result<Vec<String>, SchemaError>>,
{
    let name_idx = column_index(headers, NAME_COLUMN)?;
    let category_idx = column_index(headers, CATEGORY_COLUMN)?;
    let period_columns: Vec<(usize, PeriodId)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != name_idx && *i != category_idx && !h.is_empty())
        .map(|(i, h)| (i, PeriodId::new(h.as_str())))
        .collect();
    if period_columns.is_empty() {
        return Err(SchemaError::NoPeriodColumns);
    }

    let mut table = LineItemTable::new(period_columns.iter().map(|(_, p)| p.clone()));

    for (row_idx, record) in rows.enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let row = row_idx + 2;
        let cell = |idx: usize| record.get(idx).map(String::as_str).unwrap_or_default();

        let category = Category::from_str(cell(category_idx)).map_err(|e| {
            SchemaError::InvalidCategory {
                row,
                value: e.0,
            }
        })?;

        let name = cell(name_idx);
        let mut item = LineItem::new(name, category);
        for (idx, period) in &period_columns {
            let value = parse_amount(cell(*idx));
            if value.is_none() {
                log::debug!("row {}: no numeric value for '{}' in '{}'", row, name, period);
            }
            item.set_value(period.clone(), value);
        }
        table.add(item);
    }

    if table.is_empty() {
        return Err(SchemaError::Empty);
    }
    log::debug!(
        "loaded {} line items over {} periods",
        table.len(),
        table.periods().len()
    );
    Ok(table)
}

fn column_index(headers: &[String], column: &'static str) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or(SchemaError::MissingColumn(column))
}

/// Coerce a cell to a number; anything unparseable is a missing value.
pub fn parse_amount(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

impl LineItemTable {
    /// Write the table back out in the shape [`load_csv`] accepts.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![NAME_COLUMN.to_string(), CATEGORY_COLUMN.to_string()];
        header.extend(self.periods().iter().map(|p| p.to_string()));
        writer.write_record(&header)?;

        for item in self.items() {
            let mut record = vec![item.name().to_string(), item.category().to_string()];
            record.extend(
                self.periods()
                    .iter()
                    .map(|p| item.value(p).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
