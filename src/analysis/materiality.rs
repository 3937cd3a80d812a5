//! Materiality: each line item's weight relative to a base value, per period.
//!
//! Three models share one contract. Each only decides which base value a
//! row is measured against; the ratio and the missing/zero handling are
//! common to all of them.

use crate::analysis::totals::TotalsTable;
use crate::core::line_item::{Category, LineItemTable};
use crate::core::metric::Metric;
use crate::core::period::PeriodId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selector for a materiality model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialityMethod {
    /// `|item| / |NWC|`: the item's leverage on NWC. Not bounded by 100%.
    #[default]
    #[serde(rename = "vs_CHOK")]
    VsNwc,
    /// `|item| / Σ|all items|`: share of total component volume. Sums to 100%.
    #[serde(rename = "vs_TotalComponents")]
    VsTotalComponents,
    /// `|item| / |own category total|`: structure within assets and within liabilities.
    #[serde(rename = "within_OA_CO")]
    WithinCategory,
}

impl MaterialityMethod {
    pub const ALL: [MaterialityMethod; 3] = [
        MaterialityMethod::VsNwc,
        MaterialityMethod::VsTotalComponents,
        MaterialityMethod::WithinCategory,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            MaterialityMethod::VsNwc => "vs_CHOK",
            MaterialityMethod::VsTotalComponents => "vs_TotalComponents",
            MaterialityMethod::WithinCategory => "within_OA_CO",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MaterialityMethod::VsNwc => "leverage on NWC, |item| / |NWC|",
            MaterialityMethod::VsTotalComponents => {
                "share of total components, |item| / sum of |all items|"
            }
            MaterialityMethod::WithinCategory => {
                "structure within assets / liabilities, |item| / |category total|"
            }
        }
    }

    fn model(&self) -> &'static dyn MaterialityModel {
        match self {
            MaterialityMethod::VsNwc => &VsNwc,
            MaterialityMethod::VsTotalComponents => &VsTotalComponents,
            MaterialityMethod::WithinCategory => &WithinCategory,
        }
    }
}

impl fmt::Display for MaterialityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown materiality method '{0}', expected one of vs_CHOK, vs_TotalComponents, within_OA_CO")]
pub struct ParseMethodError(pub String);

impl FromStr for MaterialityMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialityMethod::ALL
            .into_iter()
            .find(|m| m.tag() == s)
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

/// Base values for one period, one per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryBase {
    pub asset: Option<Decimal>,
    pub liability: Option<Decimal>,
}

impl CategoryBase {
    fn uniform(base: Option<Decimal>) -> Self {
        Self {
            asset: base,
            liability: base,
        }
    }

    fn for_category(&self, category: Category) -> Option<Decimal> {
        match category {
            Category::Asset => self.asset,
            Category::Liability => self.liability,
        }
    }
}

/// One materiality model.
///
/// Implementors pick the base value a row is measured against in a period;
/// [`MaterialityModel::compute`] applies the shared ratio and edge-case rules.
pub trait MaterialityModel {
    fn method(&self) -> MaterialityMethod;

    /// Base values for `period`. `None` means no base is available and every
    /// cell of that category becomes undefined.
    fn base(&self, table: &LineItemTable, totals: &TotalsTable, period: &PeriodId) -> CategoryBase;

    fn compute(
        &self,
        table: &LineItemTable,
        totals: &TotalsTable,
        periods: &[PeriodId],
    ) -> MaterialityTable {
        let periods: Vec<PeriodId> = periods
            .iter()
            .filter(|p| table.has_period(p))
            .cloned()
            .collect();
        let bases: Vec<CategoryBase> = periods
            .iter()
            .map(|p| self.base(table, totals, p))
            .collect();

        let rows = table
            .items()
            .iter()
            .map(|item| MaterialityRow {
                name: item.name().to_string(),
                values: periods
                    .iter()
                    .zip(&bases)
                    .map(|(period, base)| {
                        materiality_cell(item.value(period), base.for_category(item.category()))
                    })
                    .collect(),
            })
            .collect();

        MaterialityTable {
            method: self.method(),
            periods,
            rows,
        }
    }
}

/// Measures every row against the period's NWC.
pub struct VsNwc;

impl MaterialityModel for VsNwc {
    fn method(&self) -> MaterialityMethod {
        MaterialityMethod::VsNwc
    }

    fn base(&self, _table: &LineItemTable, totals: &TotalsTable, period: &PeriodId) -> CategoryBase {
        CategoryBase::uniform(totals.nwc(period))
    }
}

/// Measures every row against the sum of absolute values of all rows.
pub struct VsTotalComponents;

impl MaterialityModel for VsTotalComponents {
    fn method(&self) -> MaterialityMethod {
        MaterialityMethod::VsTotalComponents
    }

    fn base(&self, table: &LineItemTable, _totals: &TotalsTable, period: &PeriodId) -> CategoryBase {
        let volume = table
            .items()
            .iter()
            .filter_map(|item| item.value(period))
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v.abs()));
        if volume.is_none() {
            log::warn!("materiality: component volume of '{}' overflows", period);
        }
        CategoryBase::uniform(volume)
    }
}

/// Measures asset rows against total assets and liability rows against
/// total liabilities.
pub struct WithinCategory;

impl MaterialityModel for WithinCategory {
    fn method(&self) -> MaterialityMethod {
        MaterialityMethod::WithinCategory
    }

    fn base(&self, _table: &LineItemTable, totals: &TotalsTable, period: &PeriodId) -> CategoryBase {
        let totals = totals.get(period);
        CategoryBase {
            asset: totals.map(|t| t.category_total(Category::Asset)),
            liability: totals.map(|t| t.category_total(Category::Liability)),
        }
    }
}

fn materiality_cell(value: Option<Decimal>, base: Option<Decimal>) -> Metric {
    match (value, base) {
        (Some(value), Some(base)) => Metric::percent_of(value.abs(), base.abs()),
        _ => Metric::Undefined,
    }
}

/// Score each line item's weight per period with the selected model.
///
/// Periods absent from the table are skipped. A missing item value or a
/// zero base leaves that cell undefined.
pub fn compute_materiality(
    table: &LineItemTable,
    totals: &TotalsTable,
    periods: &[PeriodId],
    method: MaterialityMethod,
) -> MaterialityTable {
    log::debug!(
        "materiality: method {} over {} periods",
        method,
        periods.len()
    );
    method.model().compute(table, totals, periods)
}

/// One row of a materiality table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialityRow {
    pub name: String,
    /// One cell per analysed period, aligned with [`MaterialityTable::periods`].
    pub values: Vec<Metric>,
}

/// Materiality percentages: one row per line item, one column per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialityTable {
    pub method: MaterialityMethod,
    pub periods: Vec<PeriodId>,
    pub rows: Vec<MaterialityRow>,
}

impl MaterialityTable {
    /// Column headers, one per period, naming the full period label.
    pub fn column_labels(&self) -> Vec<String> {
        self.periods
            .iter()
            .map(|p| format!("Materiality {} (%)", p))
            .collect()
    }

    /// Cell for a line item and period.
    pub fn get(&self, name: &str, period: &PeriodId) -> Option<Metric> {
        let col = self.periods.iter().position(|p| p == period)?;
        self.rows
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.values.get(col).copied())
    }

    /// Sum of defined cells in a period column, optionally restricted to rows.
    pub fn column_sum<'a>(
        &self,
        period: &PeriodId,
        rows: impl IntoIterator<Item = &'a str>,
    ) -> Decimal {
        let Some(col) = self.periods.iter().position(|p| p == period) else {
            return Decimal::ZERO;
        };
        let wanted: Vec<&str> = rows.into_iter().collect();
        self.rows
            .iter()
            .filter(|r| wanted.contains(&r.name.as_str()))
            .filter_map(|r| r.values.get(col).and_then(Metric::value))
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }
}

impl fmt::Display for MaterialityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Materiality ({}: {}) ===", self.method, self.method.description())?;
        write!(f, "{:<36}", "Line item")?;
        for period in &self.periods {
            write!(f, " {:>20}", period.to_string())?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<36}", row.name)?;
            for cell in &row.values {
                write!(f, " {:>20}", cell.display_percent())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::totals::aggregate_totals;
    use crate::core::line_item::LineItem;
    use rust_decimal_macros::dec;

    fn p(label: &str) -> PeriodId {
        PeriodId::new(label)
    }

    fn table() -> LineItemTable {
        LineItemTable::new(["P1", "P2"])
            .with_item(
                LineItem::new("Cash", Category::Asset)
                    .with_value("P1", Some(dec!(100)))
                    .with_value("P2", Some(dec!(50))),
            )
            .with_item(
                LineItem::new("Stock", Category::Asset)
                    .with_value("P1", Some(dec!(300)))
                    .with_value("P2", None),
            )
            .with_item(
                LineItem::new("Payables", Category::Liability)
                    .with_value("P1", Some(dec!(200)))
                    .with_value("P2", Some(dec!(50))),
            )
    }

    fn run(method: MaterialityMethod) -> MaterialityTable {
        let table = table();
        let periods = [p("P1"), p("P2")];
        let totals = aggregate_totals(&table, &periods);
        compute_materiality(&table, &totals, &periods, method)
    }

    #[test]
    fn test_vs_nwc() {
        let m = run(MaterialityMethod::VsNwc);
        // NWC P1 = 400 - 200 = 200
        assert_eq!(m.get("Cash", &p("P1")), Some(Metric::Defined(dec!(50))));
        assert_eq!(m.get("Stock", &p("P1")), Some(Metric::Defined(dec!(150))));
        assert_eq!(m.get("Payables", &p("P1")), Some(Metric::Defined(dec!(100))));
    }

    #[test]
    fn test_vs_nwc_zero_base_is_undefined() {
        // NWC P2 = 50 - 50 = 0
        let m = run(MaterialityMethod::VsNwc);
        assert_eq!(m.get("Cash", &p("P2")), Some(Metric::Undefined));
        assert_eq!(m.get("Payables", &p("P2")), Some(Metric::Undefined));
    }

    #[test]
    fn test_overflowing_period_is_undefined_for_every_method() {
        let table = LineItemTable::new(["P1"])
            .with_item(LineItem::new("A", Category::Asset).with_value("P1", Some(Decimal::MAX)))
            .with_item(LineItem::new("B", Category::Asset).with_value("P1", Some(Decimal::MAX)))
            .with_item(LineItem::new("C", Category::Liability).with_value("P1", Some(dec!(1))));
        let periods = [p("P1")];
        let totals = aggregate_totals(&table, &periods);
        assert!(totals.is_empty());

        for method in MaterialityMethod::ALL {
            let m = compute_materiality(&table, &totals, &periods, method);
            for name in ["A", "B", "C"] {
                assert_eq!(m.get(name, &p("P1")), Some(Metric::Undefined), "{method} {name}");
            }
        }
    }

    #[test]
    fn test_vs_total_components_sums_to_hundred() {
        let m = run(MaterialityMethod::VsTotalComponents);
        let cash = m.get("Cash", &p("P1")).and_then(|c| c.value()).unwrap();
        assert!((cash - dec!(16.6667)).abs() < dec!(0.0001));
        let sum = m.column_sum(&p("P1"), ["Cash", "Stock", "Payables"]);
        assert!((sum - dec!(100)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_within_category() {
        let m = run(MaterialityMethod::WithinCategory);
        assert_eq!(m.get("Cash", &p("P1")), Some(Metric::Defined(dec!(25))));
        assert_eq!(m.get("Stock", &p("P1")), Some(Metric::Defined(dec!(75))));
        assert_eq!(m.get("Payables", &p("P1")), Some(Metric::Defined(dec!(100))));
    }

    #[test]
    fn test_missing_value_is_undefined() {
        for method in MaterialityMethod::ALL {
            let m = run(method);
            assert_eq!(m.get("Stock", &p("P2")), Some(Metric::Undefined), "{method}");
        }
    }

    #[test]
    fn test_unknown_period_column_skipped() {
        let table = table();
        let periods = [p("P1"), p("Nope")];
        let totals = aggregate_totals(&table, &periods);
        let m = compute_materiality(&table, &totals, &periods, MaterialityMethod::VsNwc);
        assert_eq!(m.periods, vec![p("P1")]);
        assert!(m.rows.iter().all(|r| r.values.len() == 1));
    }

    #[test]
    fn test_period_without_totals_is_undefined() {
        let table = table();
        let totals = aggregate_totals(&table, &[p("P1")]);
        let m = compute_materiality(&table, &totals, &[p("P2")], MaterialityMethod::WithinCategory);
        assert_eq!(m.get("Cash", &p("P2")), Some(Metric::Undefined));
    }

    #[test]
    fn test_column_labels_keep_full_period() {
        let table = LineItemTable::new(["Q1 2024 Actual", "Q1 2025 Actual"]);
        let totals = TotalsTable::default();
        let m = compute_materiality(
            &table,
            &totals,
            &[p("Q1 2024 Actual"), p("Q1 2025 Actual")],
            MaterialityMethod::VsNwc,
        );
        let labels = m.column_labels();
        assert_ne!(labels[0], labels[1]);
        assert_eq!(labels[0], "Materiality Q1 2024 Actual (%)");
    }

    #[test]
    fn test_method_tags() {
        for method in MaterialityMethod::ALL {
            assert_eq!(method.tag().parse::<MaterialityMethod>(), Ok(method));
        }
        assert!("vs_chok".parse::<MaterialityMethod>().is_err());
        assert_eq!(
            serde_json::to_string(&MaterialityMethod::WithinCategory).unwrap(),
            r#""within_OA_CO""#
        );
    }
}
