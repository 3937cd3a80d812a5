//! Built-in demo dataset.
//!
//! Ten line items over four actual quarters and one forecast quarter. The
//! CLI analyses it when no input file is given and writes it out as the
//! CSV template.

use crate::core::line_item::{Category, LineItem, LineItemTable};
use rust_decimal::Decimal;

pub const DEMO_PERIODS: [&str; 5] = [
    "Q1 2024 Actual",
    "Q2 2024 Actual",
    "Q3 2024 Actual",
    "Q4 2024 Actual",
    "Q1 2025 Forecast",
];

const DEMO_ROWS: [(&str, Category, [i64; 5]); 10] = [
    ("Cash and equivalents", Category::Asset, [500, 550, 520, 600, 620]),
    ("Accounts receivable", Category::Asset, [1200, 1300, 1250, 1400, 1450]),
    ("Raw materials", Category::Asset, [300, 320, 310, 350, 360]),
    ("Work in progress", Category::Asset, [200, 210, 205, 230, 240]),
    ("Finished goods", Category::Asset, [400, 420, 405, 450, 460]),
    ("Other current assets", Category::Asset, [50, 55, 52, 60, 65]),
    ("Accounts payable", Category::Liability, [700, 750, 720, 800, 820]),
    ("Short-term borrowings", Category::Liability, [400, 420, 410, 450, 460]),
    ("Taxes payable", Category::Liability, [50, 60, 55, 70, 75]),
    ("Other current liabilities", Category::Liability, [150, 160, 155, 170, 175]),
];

/// The demo table, in thousands of currency units.
///
/// # Examples
///
/// ```
/// use nwc_analysis::simulation::demo::demo_table;
///
/// let table = demo_table();
/// assert_eq!(table.len(), 10);
/// assert_eq!(table.periods().len(), 5);
/// ```
pub fn demo_table() -> LineItemTable {
    let mut table = LineItemTable::new(DEMO_PERIODS);
    for (name, category, values) in DEMO_ROWS {
        let mut item = LineItem::new(name, category);
        for (period, value) in DEMO_PERIODS.iter().zip(values) {
            item.set_value(*period, Some(Decimal::from(value)));
        }
        table.add(item);
    }
    table
}
