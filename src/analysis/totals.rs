use crate::core::line_item::{Category, LineItemTable};
use crate::core::period::PeriodId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate indicators derived from a period's line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    AssetTotal,
    LiabilityTotal,
    Nwc,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::AssetTotal, Indicator::LiabilityTotal, Indicator::Nwc];
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Indicator::AssetTotal => "Total assets",
            Indicator::LiabilityTotal => "Total liabilities",
            Indicator::Nwc => "NWC",
        };
        f.write_str(s)
    }
}

/// Asset, liability and NWC totals of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub asset_total: Decimal,
    pub liability_total: Decimal,
    /// Always `asset_total - liability_total`.
    pub nwc_total: Decimal,
}

impl PeriodTotals {
    /// `None` when the NWC difference overflows.
    pub fn new(asset_total: Decimal, liability_total: Decimal) -> Option<Self> {
        Some(Self {
            asset_total,
            liability_total,
            nwc_total: asset_total.checked_sub(liability_total)?,
        })
    }

    pub fn indicator(&self, indicator: Indicator) -> Decimal {
        match indicator {
            Indicator::AssetTotal => self.asset_total,
            Indicator::LiabilityTotal => self.liability_total,
            Indicator::Nwc => self.nwc_total,
        }
    }

    pub fn category_total(&self, category: Category) -> Decimal {
        match category {
            Category::Asset => self.asset_total,
            Category::Liability => self.liability_total,
        }
    }
}

/// Totals keyed by period, in the order the periods were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsTable {
    entries: Vec<(PeriodId, PeriodTotals)>,
}

impl TotalsTable {
    pub fn get(&self, period: &PeriodId) -> Option<&PeriodTotals> {
        self.entries
            .iter()
            .find(|(p, _)| p == period)
            .map(|(_, totals)| totals)
    }

    pub fn nwc(&self, period: &PeriodId) -> Option<Decimal> {
        self.get(period).map(|t| t.nwc_total)
    }

    pub fn periods(&self) -> impl Iterator<Item = &PeriodId> {
        self.entries.iter().map(|(p, _)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeriodId, &PeriodTotals)> {
        self.entries.iter().map(|(p, t)| (p, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reduce the table to per-period asset, liability and NWC totals.
///
/// Missing cells contribute nothing to a sum. Periods the table does not
/// contain are skipped without an entry; repeated periods are computed once.
/// A period whose sums overflow the decimal range gets no entry either.
///
/// # Examples
///
/// ```
/// use nwc_analysis::analysis::totals::aggregate_totals;
/// use nwc_analysis::core::line_item::{Category, LineItem, LineItemTable};
/// use nwc_analysis::core::period::PeriodId;
/// use rust_decimal_macros::dec;
///
/// let table = LineItemTable::new(["P1"])
///     .with_item(LineItem::new("Cash", Category::Asset).with_value("P1", Some(dec!(100))))
///     .with_item(LineItem::new("Payables", Category::Liability).with_value("P1", Some(dec!(40))));
///
/// let totals = aggregate_totals(&table, &[PeriodId::new("P1")]);
/// assert_eq!(totals.nwc(&PeriodId::new("P1")), Some(dec!(60)));
/// ```
pub fn aggregate_totals(table: &LineItemTable, periods: &[PeriodId]) -> TotalsTable {
    let mut entries: Vec<(PeriodId, PeriodTotals)> = Vec::with_capacity(periods.len());

    for period in periods {
        if !table.has_period(period) {
            log::debug!("totals: skipping unknown period '{}'", period);
            continue;
        }
        if entries.iter().any(|(p, _)| p == period) {
            continue;
        }
        let totals = category_sum(table, Category::Asset, period).and_then(|assets| {
            let liabilities = category_sum(table, Category::Liability, period)?;
            PeriodTotals::new(assets, liabilities)
        });
        match totals {
            Some(totals) => entries.push((period.clone(), totals)),
            None => log::warn!("totals: '{}' overflows the decimal range, skipped", period),
        }
    }

    TotalsTable { entries }
}

fn category_sum(table: &LineItemTable, category: Category, period: &PeriodId) -> Option<Decimal> {
    table
        .items_in(category)
        .filter_map(|item| item.value(period))
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

impl fmt::Display for TotalsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Period Totals ===")?;
        for (period, totals) in &self.entries {
            writeln!(f, "\n--- {} ---", period)?;
            for indicator in Indicator::ALL {
                writeln!(
                    f,
                    "  {:<18} {:>14}",
                    indicator.to_string(),
                    totals.indicator(indicator).round_dp(0).to_string()
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::line_item::LineItem;
    use rust_decimal_macros::dec;

    fn table() -> LineItemTable {
        LineItemTable::new(["P1", "P2"])
            .with_item(
                LineItem::new("Cash", Category::Asset)
                    .with_value("P1", Some(dec!(100)))
                    .with_value("P2", Some(dec!(120))),
            )
            .with_item(
                LineItem::new("Receivables", Category::Asset)
                    .with_value("P1", None)
                    .with_value("P2", Some(dec!(30))),
            )
            .with_item(
                LineItem::new("Payables", Category::Liability)
                    .with_value("P1", Some(dec!(40)))
                    .with_value("P2", Some(dec!(200))),
            )
    }

    #[test]
    fn test_totals_basic() {
        let totals = aggregate_totals(&table(), &[PeriodId::new("P1")]);
        let p1 = totals.get(&PeriodId::new("P1")).unwrap();
        assert_eq!(p1.asset_total, dec!(100));
        assert_eq!(p1.liability_total, dec!(40));
        assert_eq!(p1.nwc_total, dec!(60));
    }

    #[test]
    fn test_negative_nwc() {
        let totals = aggregate_totals(&table(), &[PeriodId::new("P2")]);
        assert_eq!(totals.nwc(&PeriodId::new("P2")), Some(dec!(-50)));
    }

    #[test]
    fn test_unknown_period_skipped() {
        let periods = [PeriodId::new("P1"), PeriodId::new("Missing"), PeriodId::new("P2")];
        let totals = aggregate_totals(&table(), &periods);
        assert_eq!(totals.len(), 2);
        assert!(totals.get(&PeriodId::new("Missing")).is_none());
        let order: Vec<&PeriodId> = totals.periods().collect();
        assert_eq!(order, vec![&PeriodId::new("P1"), &PeriodId::new("P2")]);
    }

    #[test]
    fn test_all_missing_sums_to_zero() {
        let table = LineItemTable::new(["P1"])
            .with_item(LineItem::new("Cash", Category::Asset).with_value("P1", None));
        let totals = aggregate_totals(&table, &[PeriodId::new("P1")]);
        assert_eq!(totals.get(&PeriodId::new("P1")).unwrap().asset_total, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_period_is_skipped() {
        let table = LineItemTable::new(["P1", "P2"])
            .with_item(
                LineItem::new("A", Category::Asset)
                    .with_value("P1", Some(Decimal::MAX))
                    .with_value("P2", Some(dec!(10))),
            )
            .with_item(
                LineItem::new("B", Category::Asset)
                    .with_value("P1", Some(Decimal::MAX))
                    .with_value("P2", Some(dec!(5))),
            );
        let totals = aggregate_totals(&table, &[PeriodId::new("P1"), PeriodId::new("P2")]);
        assert!(totals.get(&PeriodId::new("P1")).is_none());
        assert_eq!(totals.nwc(&PeriodId::new("P2")), Some(dec!(15)));
    }

    #[test]
    fn test_nwc_difference_overflow() {
        assert!(PeriodTotals::new(Decimal::MAX, Decimal::MIN).is_none());
        assert_eq!(
            PeriodTotals::new(dec!(10), dec!(4)).map(|t| t.nwc_total),
            Some(dec!(6))
        );
    }

    #[test]
    fn test_idempotent() {
        let periods = [PeriodId::new("P1"), PeriodId::new("P2")];
        assert_eq!(aggregate_totals(&table(), &periods), aggregate_totals(&table(), &periods));
    }
}
