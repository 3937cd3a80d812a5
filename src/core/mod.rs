//! Data model: periods, line items, the three-state cell result, and the
//! CSV data source that produces line-item tables.

pub mod line_item;
pub mod loader;
pub mod metric;
pub mod period;
