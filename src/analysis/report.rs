//! A full analysis run over one table: period selection, totals,
//! materiality, forecast deviations and sensitivity in one report.

use crate::analysis::deviation::{compute_deviations, DeviationReport};
use crate::analysis::materiality::{compute_materiality, MaterialityMethod, MaterialityTable};
use crate::analysis::sensitivity::{compute_allowed_error, SensitivityReport};
use crate::analysis::totals::{aggregate_totals, Indicator, TotalsTable};
use crate::config::{AnalysisConfig, ConfigError};
use crate::core::line_item::{Category, LineItemTable};
use crate::core::metric::Metric;
use crate::core::period::{PeriodId, PeriodKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Conditions an engine reports instead of failing.
///
/// These travel inside results so a run degrades to empty sections rather
/// than aborting.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    #[error("period '{period}' is not present in the table")]
    UnknownPeriod { period: PeriodId },
    #[error("forecast NWC for '{period}' is undefined, sensitivity cannot be computed")]
    UndefinedForecastNwc { period: PeriodId },
    #[error("NWC deviation budget for '{period}' overflows the decimal range, sensitivity cannot be computed")]
    BudgetOverflow { period: PeriodId },
    #[error("no actual periods selected, materiality analysis skipped")]
    NoActualPeriods,
    #[error("no baseline period selected, deviation analysis skipped")]
    NoBaselinePeriod,
    #[error("no forecast period selected, deviation and sensitivity analysis skipped")]
    NoForecastPeriod,
}

/// The periods a run works on, after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub actual: Vec<PeriodId>,
    pub baseline: Option<PeriodId>,
    pub forecast: Option<PeriodId>,
}

impl PeriodSelection {
    /// Apply the config's explicit choices, falling back to every actual
    /// period, the last actual period as baseline and the first forecast
    /// period.
    pub fn resolve(table: &LineItemTable, config: &AnalysisConfig) -> Self {
        let all_actual = table.periods_of_kind(PeriodKind::Actual, &config.keywords);
        let all_forecast = table.periods_of_kind(PeriodKind::Forecast, &config.keywords);

        Self {
            actual: config.actual_periods.clone().unwrap_or_else(|| all_actual.clone()),
            baseline: config
                .baseline_period
                .clone()
                .or_else(|| all_actual.last().cloned()),
            forecast: config
                .forecast_period
                .clone()
                .or_else(|| all_forecast.first().cloned()),
        }
    }

    /// Selected periods present in the table, in table order.
    pub fn active_periods(&self, table: &LineItemTable) -> Vec<PeriodId> {
        table
            .periods()
            .iter()
            .filter(|p| {
                self.actual.contains(p)
                    || self.baseline.as_ref() == Some(*p)
                    || self.forecast.as_ref() == Some(*p)
            })
            .cloned()
            .collect()
    }
}

/// Classification of one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub period: PeriodId,
    pub kind: PeriodKind,
}

/// A line item restricted to the active periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRow {
    pub name: String,
    pub category: Category,
    pub values: Vec<Option<Decimal>>,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: Option<String>,
    pub materiality_method: MaterialityMethod,
    pub nwc_limit_pct: Decimal,
    pub periods: Vec<PeriodInfo>,
    pub selection: PeriodSelection,
    pub active_periods: Vec<PeriodId>,
    pub line_items: Vec<LineItemRow>,
    pub totals: TotalsTable,
    pub materiality: Option<MaterialityTable>,
    pub deviations: Option<DeviationReport>,
    pub sensitivity: Option<SensitivityReport>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisReport {
    /// Run every engine over `table` with the given configuration.
    ///
    /// Only an invalid configuration is an error; data problems surface as
    /// [`AnalysisWarning`]s and undefined cells.
    pub fn run(table: &LineItemTable, config: &AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let selection = PeriodSelection::resolve(table, config);
        let active_periods = selection.active_periods(table);
        let mut warnings = Vec::new();

        log::info!(
            "analysing {} line items over {} active periods",
            table.len(),
            active_periods.len()
        );

        let totals = aggregate_totals(table, &active_periods);

        let materiality = if selection.actual.is_empty() {
            warnings.push(AnalysisWarning::NoActualPeriods);
            None
        } else {
            Some(compute_materiality(
                table,
                &totals,
                &selection.actual,
                config.materiality_method,
            ))
        };

        let deviations = match (&selection.forecast, &selection.baseline) {
            (Some(forecast), Some(baseline)) => {
                let report = compute_deviations(table, &totals, forecast, baseline);
                warnings.extend(report.warning.clone());
                Some(report)
            }
            (Some(_), None) => {
                warnings.push(AnalysisWarning::NoBaselinePeriod);
                None
            }
            // Reported with the sensitivity section below.
            (None, _) => None,
        };

        let sensitivity = match &selection.forecast {
            Some(forecast) => {
                let report = compute_allowed_error(
                    table,
                    forecast,
                    totals.nwc(forecast),
                    config.nwc_limit_pct,
                );
                if let Some(w) = &report.warning {
                    if !warnings.contains(w) {
                        warnings.push(w.clone());
                    }
                }
                Some(report)
            }
            None => {
                warnings.push(AnalysisWarning::NoForecastPeriod);
                None
            }
        };

        let periods = table
            .periods()
            .iter()
            .map(|p| PeriodInfo {
                period: p.clone(),
                kind: config.keywords.classify(p),
            })
            .collect();

        let line_items = table
            .items()
            .iter()
            .map(|item| LineItemRow {
                name: item.name().to_string(),
                category: item.category(),
                values: active_periods.iter().map(|p| item.value(p)).collect(),
            })
            .collect();

        Ok(Self {
            generated_at: Utc::now(),
            source: None,
            materiality_method: config.materiality_method,
            nwc_limit_pct: config.nwc_limit_pct,
            periods,
            selection,
            active_periods,
            line_items,
            totals,
            materiality,
            deviations,
            sensitivity,
            warnings,
        })
    }

    /// Label the data source (file path, "demo", ...).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== NWC Analysis ===")?;
        if let Some(source) = &self.source {
            writeln!(f, "Source:         {}", source)?;
        }
        writeln!(f, "Generated:      {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Method:         {}", self.materiality_method)?;
        writeln!(f, "NWC limit:      ±{}%", self.nwc_limit_pct)?;

        writeln!(f, "\n=== Line Items ===")?;
        write!(f, "{:<36} {:<10}", "Line item", "Category")?;
        for period in &self.active_periods {
            write!(f, " {:>18}", period.to_string())?;
        }
        writeln!(f)?;
        for row in &self.line_items {
            write!(f, "{:<36} {:<10}", row.name, row.category.to_string())?;
            for value in &row.values {
                write!(f, " {:>18}", Metric::from_option(*value).display_amount())?;
            }
            writeln!(f)?;
        }

        write!(f, "\n{:<47}", "")?;
        for period in &self.active_periods {
            write!(f, " {:>18}", period.to_string())?;
        }
        writeln!(f)?;
        for indicator in Indicator::ALL {
            write!(f, "{:<47}", indicator.to_string())?;
            for period in &self.active_periods {
                let value = self.totals.get(period).map(|t| t.indicator(indicator));
                write!(f, " {:>18}", Metric::from_option(value).display_amount())?;
            }
            writeln!(f)?;
        }

        if let Some(materiality) = &self.materiality {
            writeln!(f)?;
            write!(f, "{}", materiality)?;
        }
        if let Some(deviations) = &self.deviations {
            writeln!(f)?;
            write!(f, "{}", deviations)?;
        }
        if let Some(sensitivity) = &self.sensitivity {
            writeln!(f)?;
            write!(f, "{}", sensitivity)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "\n=== Warnings ===")?;
            for warning in &self.warnings {
                writeln!(f, "  - {}", warning)?;
            }
        }
        Ok(())
    }
}
