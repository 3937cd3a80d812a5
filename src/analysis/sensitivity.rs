use crate::analysis::report::AnalysisWarning;
use crate::core::line_item::LineItemTable;
use crate::core::metric::Metric;
use crate::core::period::PeriodId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error budget of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemErrorBudget {
    pub name: String,
    pub forecast: Option<Decimal>,
    /// Largest relative error (±%) this item's forecast can carry, all other
    /// items held exact, before NWC moves by more than the limit.
    pub max_error_pct: Metric,
}

/// Per-item error budgets for one forecast period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub forecast_period: PeriodId,
    pub limit_pct: Decimal,
    pub forecast_nwc: Option<Decimal>,
    /// `|forecast NWC * limit / 100|`, the absolute NWC deviation allowed.
    pub max_abs_nwc_deviation: Metric,
    pub items: Vec<ItemErrorBudget>,
    pub warning: Option<AnalysisWarning>,
}

impl SensitivityReport {
    pub fn item(&self, name: &str) -> Option<&ItemErrorBudget> {
        self.items.iter().find(|i| i.name == name)
    }
}

/// How much relative error each line item's forecast can absorb, in
/// isolation, before NWC deviates by more than `limit_pct` percent.
///
/// This is a first-order budget: errors in different items are not combined.
/// A zero or missing forecast value has no finite bound. When the forecast
/// period is missing or `forecast_nwc` is undefined the report carries a
/// warning, no items, and an undefined budget.
///
/// `limit_pct` is not range-checked here.
///
/// # Examples
///
/// ```
/// use nwc_analysis::analysis::sensitivity::compute_allowed_error;
/// use nwc_analysis::core::line_item::{Category, LineItem, LineItemTable};
/// use nwc_analysis::core::metric::Metric;
/// use nwc_analysis::core::period::PeriodId;
/// use rust_decimal_macros::dec;
///
/// let table = LineItemTable::new(["F"])
///     .with_item(LineItem::new("Stock", Category::Asset).with_value("F", Some(dec!(30))));
///
/// let report = compute_allowed_error(&table, &PeriodId::new("F"), Some(dec!(60)), dec!(5));
/// assert_eq!(report.max_abs_nwc_deviation, Metric::Defined(dec!(3)));
/// assert_eq!(report.item("Stock").unwrap().max_error_pct, Metric::Defined(dec!(10)));
/// ```
pub fn compute_allowed_error(
    table: &LineItemTable,
    forecast_period: &PeriodId,
    forecast_nwc: Option<Decimal>,
    limit_pct: Decimal,
) -> SensitivityReport {
    let mut report = SensitivityReport {
        forecast_period: forecast_period.clone(),
        limit_pct,
        forecast_nwc,
        max_abs_nwc_deviation: Metric::Undefined,
        items: Vec::new(),
        warning: None,
    };

    let warning = if !table.has_period(forecast_period) {
        Some(AnalysisWarning::UnknownPeriod {
            period: forecast_period.clone(),
        })
    } else if forecast_nwc.is_none() {
        Some(AnalysisWarning::UndefinedForecastNwc {
            period: forecast_period.clone(),
        })
    } else {
        None
    };
    if let Some(warning) = warning {
        log::warn!("sensitivity analysis skipped: {}", warning);
        report.warning = Some(warning);
        return report;
    }

    let budget = forecast_nwc.and_then(|nwc| error_budget(nwc, limit_pct));
    let Some(budget) = budget else {
        let warning = AnalysisWarning::BudgetOverflow {
            period: forecast_period.clone(),
        };
        log::warn!("sensitivity analysis skipped: {}", warning);
        report.warning = Some(warning);
        return report;
    };
    report.max_abs_nwc_deviation = Metric::Defined(budget);

    log::debug!(
        "sensitivity: '{}' budget {} at limit {}%",
        forecast_period,
        budget,
        limit_pct
    );

    report.items = table
        .items()
        .iter()
        .map(|item| {
            let forecast = item.value(forecast_period);
            let max_error_pct = match forecast {
                Some(v) if !v.is_zero() => Metric::percent_of(budget, v.abs()),
                _ => Metric::Unbounded,
            };
            ItemErrorBudget {
                name: item.name().to_string(),
                forecast,
                max_error_pct,
            }
        })
        .collect();

    report
}

fn error_budget(forecast_nwc: Decimal, limit_pct: Decimal) -> Option<Decimal> {
    forecast_nwc
        .checked_mul(limit_pct)?
        .checked_div(Decimal::ONE_HUNDRED)
        .map(|v| v.abs())
}

impl fmt::Display for SensitivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Forecast Sensitivity: {} (NWC limit ±{}%) ===",
            self.forecast_period, self.limit_pct
        )?;
        if let Some(warning) = &self.warning {
            return writeln!(f, "  {}", warning);
        }
        writeln!(
            f,
            "Forecast NWC:          {}",
            Metric::from_option(self.forecast_nwc).display_amount()
        )?;
        writeln!(
            f,
            "Max NWC deviation:     ±{}",
            self.max_abs_nwc_deviation
                .value()
                .map(|v| v.round_dp(2).to_string())
                .unwrap_or_else(|| self.max_abs_nwc_deviation.to_string())
        )?;
        writeln!(f, "{:<36} {:>12} {:>16}", "Line item", "Forecast", "Max error ±%")?;
        for item in &self.items {
            writeln!(
                f,
                "{:<36} {:>12} {:>16}",
                item.name,
                Metric::from_option(item.forecast).display_amount(),
                item.max_error_pct.display_percent()
            )?;
        }
        Ok(())
    }
}
