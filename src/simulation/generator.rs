//! Random line-item tables for benchmarks and the `generate` command.

use crate::core::line_item::{Category, LineItem, LineItemTable};
use crate::core::period::PeriodId;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random table.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Number of line items; roughly 60% are assets.
    pub item_count: usize,
    pub actual_periods: usize,
    pub forecast_periods: usize,
    /// Minimum value of a cell.
    pub min_value: Decimal,
    /// Maximum value of a cell.
    pub max_value: Decimal,
    /// Probability that a cell is left missing.
    pub missing_ratio: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            item_count: 10,
            actual_periods: 4,
            forecast_periods: 1,
            min_value: Decimal::ZERO,
            max_value: Decimal::from(10_000),
            missing_ratio: 0.0,
        }
    }
}

impl TableConfig {
    /// Period labels: `P01 Actual`, `P02 Actual`, ..., then `Pnn Forecast`.
    pub fn period_labels(&self) -> Vec<PeriodId> {
        (0..self.actual_periods + self.forecast_periods)
            .map(|i| {
                let kind = if i < self.actual_periods { "Actual" } else { "Forecast" };
                PeriodId::new(format!("P{:02} {}", i + 1, kind))
            })
            .collect()
    }
}

/// Generate a random table. Values are whole units in `[min_value, max_value]`.
pub fn generate_random_table(config: &TableConfig) -> LineItemTable {
    let mut rng = rand::thread_rng();
    let periods = config.period_labels();
    let mut table = LineItemTable::new(periods.clone());

    let min = config.min_value.to_i64().unwrap_or(0);
    let max = config.max_value.to_i64().unwrap_or(min).max(min);
    let asset_count = (config.item_count * 3).div_ceil(5);

    for i in 0..config.item_count {
        let category = if i < asset_count {
            Category::Asset
        } else {
            Category::Liability
        };
        let mut item = LineItem::new(format!("ITEM-{:03}", i), category);
        for period in &periods {
            let value = if rng.gen_bool(config.missing_ratio.clamp(0.0, 1.0)) {
                None
            } else {
                Some(Decimal::from(rng.gen_range(min..=max)))
            };
            item.set_value(period.clone(), value);
        }
        table.add(item);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::AnalysisReport;
    use crate::config::AnalysisConfig;

    #[test]
    fn test_random_table_shape() {
        let config = TableConfig {
            item_count: 12,
            actual_periods: 3,
            forecast_periods: 2,
            ..Default::default()
        };
        let table = generate_random_table(&config);
        assert_eq!(table.len(), 12);
        assert_eq!(table.periods().len(), 5);
        assert_eq!(table.items_in(Category::Asset).count(), 8);
        for item in table.items() {
            for period in table.periods() {
                let v = item.value(period).unwrap();
                assert!(v >= config.min_value && v <= config.max_value);
            }
        }
    }

    #[test]
    fn test_random_table_analyses_cleanly() {
        let config = TableConfig {
            missing_ratio: 0.2,
            ..Default::default()
        };
        let table = generate_random_table(&config);
        let report = AnalysisReport::run(&table, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.active_periods.len(), 5);
        assert!(report.deviations.is_some());
    }
}
