//! # nwc-analysis
//!
//! Net working capital (NWC) composition and forecast analysis.
//!
//! Given a table of current-asset and current-liability line items over
//! several actual and forecast periods, this crate aggregates NWC totals,
//! scores each item's materiality, compares forecasts against actuals, and
//! computes how much forecast error each item can carry before NWC breaches
//! a deviation limit.
//!
//! ## Architecture
//!
//! - **core** — Data model: periods, line items, three-state cell results, CSV loading
//! - **analysis** — Totals, materiality, deviation and sensitivity engines, full-run report
//! - **config** — Analysis run configuration
//! - **simulation** — Demo dataset and random table generation

pub mod analysis;
pub mod config;
pub mod core;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::deviation::{compute_deviations, Deviation, DeviationReport};
    pub use crate::analysis::materiality::{compute_materiality, MaterialityMethod, MaterialityTable};
    pub use crate::analysis::report::{AnalysisReport, AnalysisWarning};
    pub use crate::analysis::sensitivity::{compute_allowed_error, SensitivityReport};
    pub use crate::analysis::totals::{aggregate_totals, Indicator, PeriodTotals, TotalsTable};
    pub use crate::config::AnalysisConfig;
    pub use crate::core::line_item::{Category, LineItem, LineItemTable};
    pub use crate::core::metric::Metric;
    pub use crate::core::period::{PeriodId, PeriodKeywords, PeriodKind};
}
