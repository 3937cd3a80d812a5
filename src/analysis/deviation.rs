use crate::analysis::report::AnalysisWarning;
use crate::analysis::totals::{Indicator, TotalsTable};
use crate::core::line_item::LineItemTable;
use crate::core::metric::Metric;
use crate::core::period::PeriodId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Forecast-minus-baseline movement of one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deviation {
    /// `forecast - baseline`.
    pub absolute: Metric,
    /// `absolute / baseline * 100`.
    pub relative: Metric,
}

impl Deviation {
    /// Compare a forecast value against its baseline.
    ///
    /// - either side missing: both measures undefined;
    /// - zero baseline and zero forecast: relative deviation is exactly zero;
    /// - zero baseline, non-zero forecast: relative deviation undefined.
    ///
    /// # Examples
    ///
    /// ```
    /// use nwc_analysis::analysis::deviation::Deviation;
    /// use nwc_analysis::core::metric::Metric;
    /// use rust_decimal_macros::dec;
    ///
    /// let d = Deviation::between(Some(dec!(110)), Some(dec!(100)));
    /// assert_eq!(d.absolute, Metric::Defined(dec!(10)));
    /// assert_eq!(d.relative, Metric::Defined(dec!(10)));
    ///
    /// let d = Deviation::between(Some(dec!(5)), Some(dec!(0)));
    /// assert_eq!(d.relative, Metric::Undefined);
    /// ```
    pub fn between(forecast: Option<Decimal>, baseline: Option<Decimal>) -> Self {
        let (Some(forecast), Some(baseline)) = (forecast, baseline) else {
            return Self {
                absolute: Metric::Undefined,
                relative: Metric::Undefined,
            };
        };
        let Some(absolute) = forecast.checked_sub(baseline) else {
            return Self {
                absolute: Metric::Undefined,
                relative: Metric::Undefined,
            };
        };
        let relative = if !baseline.is_zero() {
            Metric::percent_of(absolute, baseline)
        } else if forecast.is_zero() {
            Metric::Defined(Decimal::ZERO)
        } else {
            Metric::Undefined
        };
        Self {
            absolute: Metric::Defined(absolute),
            relative,
        }
    }
}

/// Deviation of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeviation {
    pub name: String,
    pub forecast: Option<Decimal>,
    pub baseline: Option<Decimal>,
    #[serde(flatten)]
    pub deviation: Deviation,
}

/// Deviation of one aggregate indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDeviation {
    pub indicator: Indicator,
    pub forecast: Option<Decimal>,
    pub baseline: Option<Decimal>,
    #[serde(flatten)]
    pub deviation: Deviation,
}

/// Forecast period compared against a baseline actual period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviationReport {
    pub forecast_period: PeriodId,
    pub baseline_period: PeriodId,
    pub items: Vec<ItemDeviation>,
    pub aggregates: Vec<AggregateDeviation>,
    /// Set when the comparison could not be made; `items` and `aggregates`
    /// are then empty.
    pub warning: Option<AnalysisWarning>,
}

impl DeviationReport {
    pub fn item(&self, name: &str) -> Option<&ItemDeviation> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn aggregate(&self, indicator: Indicator) -> Option<&AggregateDeviation> {
        self.aggregates.iter().find(|a| a.indicator == indicator)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.aggregates.is_empty()
    }
}

/// Compare `forecast_period` against `baseline_period`, per line item and for
/// the three aggregate indicators.
///
/// If either period is missing from the table the report carries an
/// [`AnalysisWarning::UnknownPeriod`] and no rows.
pub fn compute_deviations(
    table: &LineItemTable,
    totals: &TotalsTable,
    forecast_period: &PeriodId,
    baseline_period: &PeriodId,
) -> DeviationReport {
    let mut report = DeviationReport {
        forecast_period: forecast_period.clone(),
        baseline_period: baseline_period.clone(),
        items: Vec::new(),
        aggregates: Vec::new(),
        warning: None,
    };

    if let Some(missing) = [baseline_period, forecast_period]
        .into_iter()
        .find(|p| !table.has_period(p))
    {
        let warning = AnalysisWarning::UnknownPeriod {
            period: missing.clone(),
        };
        log::warn!("deviation analysis skipped: {}", warning);
        report.warning = Some(warning);
        return report;
    }

    log::debug!(
        "deviation: '{}' against baseline '{}'",
        forecast_period,
        baseline_period
    );

    report.items = table
        .items()
        .iter()
        .map(|item| {
            let forecast = item.value(forecast_period);
            let baseline = item.value(baseline_period);
            ItemDeviation {
                name: item.name().to_string(),
                forecast,
                baseline,
                deviation: Deviation::between(forecast, baseline),
            }
        })
        .collect();

    let forecast_totals = totals.get(forecast_period);
    let baseline_totals = totals.get(baseline_period);
    report.aggregates = Indicator::ALL
        .into_iter()
        .map(|indicator| {
            let forecast = forecast_totals.map(|t| t.indicator(indicator));
            let baseline = baseline_totals.map(|t| t.indicator(indicator));
            AggregateDeviation {
                indicator,
                forecast,
                baseline,
                deviation: Deviation::between(forecast, baseline),
            }
        })
        .collect();

    report
}

fn amount(value: Option<Decimal>) -> String {
    Metric::from_option(value).display_amount()
}

impl fmt::Display for DeviationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Forecast Deviation: {} vs {} ===",
            self.forecast_period, self.baseline_period
        )?;
        if let Some(warning) = &self.warning {
            return writeln!(f, "  {}", warning);
        }
        writeln!(
            f,
            "{:<36} {:>12} {:>12} {:>12} {:>12}",
            "Line item", "Forecast", "Baseline", "Abs. dev.", "Rel. dev."
        )?;
        for item in &self.items {
            writeln!(
                f,
                "{:<36} {:>12} {:>12} {:>12} {:>12}",
                item.name,
                amount(item.forecast),
                amount(item.baseline),
                item.deviation.absolute.display_amount(),
                item.deviation.relative.display_percent()
            )?;
        }
        writeln!(f)?;
        for agg in &self.aggregates {
            writeln!(
                f,
                "{:<36} {:>12} {:>12} {:>12} {:>12}",
                agg.indicator.to_string(),
                amount(agg.forecast),
                amount(agg.baseline),
                agg.deviation.absolute.display_amount(),
                agg.deviation.relative.display_percent()
            )?;
        }
        Ok(())
    }
}
