use crate::core::period::{PeriodId, PeriodKeywords, PeriodKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Side of the balance sheet a line item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Current asset.
    Asset,
    /// Current (short-term) liability.
    Liability,
}

impl Category {
    pub fn token(&self) -> &'static str {
        match self {
            Category::Asset => "ASSET",
            Category::Liability => "LIABILITY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid category token '{0}', expected ASSET or LIABILITY")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ASSET" => Ok(Category::Asset),
            "LIABILITY" => Ok(Category::Liability),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// One component of net working capital.
///
/// # Examples
///
/// ```
/// use nwc_analysis::core::line_item::{Category, LineItem};
/// use rust_decimal_macros::dec;
///
/// let cash = LineItem::new("Cash", Category::Asset)
///     .with_value("Q1 2024 Actual", Some(dec!(500)));
/// assert_eq!(cash.value(&"Q1 2024 Actual".into()), Some(dec!(500)));
/// assert_eq!(cash.value(&"Q2 2024 Actual".into()), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    name: String,
    category: Category,
    /// Period -> value. `None` marks a missing or non-numeric cell.
    values: HashMap<PeriodId, Option<Decimal>>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            values: HashMap::new(),
        }
    }

    /// Set the value for a period.
    pub fn with_value(mut self, period: impl Into<PeriodId>, value: Option<Decimal>) -> Self {
        self.set_value(period, value);
        self
    }

    pub fn set_value(&mut self, period: impl Into<PeriodId>, value: Option<Decimal>) {
        self.values.insert(period.into(), value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_asset(&self) -> bool {
        self.category == Category::Asset
    }

    /// Value in a period; `None` when missing or when the period is unknown.
    pub fn value(&self, period: &PeriodId) -> Option<Decimal> {
        self.values.get(period).copied().flatten()
    }
}

/// Ordered line items sharing one set of period columns.
///
/// The table is an immutable snapshot as far as the analysis engines are
/// concerned: every engine borrows it and returns fresh results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemTable {
    periods: Vec<PeriodId>,
    items: Vec<LineItem>,
}

impl LineItemTable {
    /// Create an empty table with the given period columns, in display order.
    /// Duplicate labels keep their first position.
    pub fn new<I, P>(periods: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PeriodId>,
    {
        let mut ordered: Vec<PeriodId> = Vec::new();
        for p in periods {
            let p = p.into();
            if !ordered.contains(&p) {
                ordered.push(p);
            }
        }
        Self {
            periods: ordered,
            items: Vec::new(),
        }
    }

    pub fn add(&mut self, item: LineItem) {
        self.items.push(item);
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.add(item);
        self
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn periods(&self) -> &[PeriodId] {
        &self.periods
    }

    pub fn has_period(&self, period: &PeriodId) -> bool {
        self.periods.contains(period)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items of one category, in table order.
    pub fn items_in(&self, category: Category) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(move |i| i.category() == category)
    }

    /// Periods of one kind, in table order.
    pub fn periods_of_kind(&self, kind: PeriodKind, keywords: &PeriodKeywords) -> Vec<PeriodId> {
        self.periods
            .iter()
            .filter(|p| keywords.classify(p) == kind)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_table() -> LineItemTable {
        LineItemTable::new(["Q1 Actual", "Q2 Actual", "Q3 Forecast", "Budget"])
            .with_item(LineItem::new("Cash", Category::Asset).with_value("Q1 Actual", Some(dec!(10))))
            .with_item(LineItem::new("Payables", Category::Liability))
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("ASSET".parse::<Category>(), Ok(Category::Asset));
        assert_eq!(" LIABILITY ".parse::<Category>(), Ok(Category::Liability));
        assert!("asset".parse::<Category>().is_err());
        assert!("EQUITY".parse::<Category>().is_err());
    }

    #[test]
    fn test_missing_value_and_unknown_period() {
        let table = sample_table();
        let cash = &table.items()[0];
        assert_eq!(cash.value(&"Q1 Actual".into()), Some(dec!(10)));
        assert_eq!(cash.value(&"Q2 Actual".into()), None);
        assert_eq!(cash.value(&"Nope".into()), None);
    }

    #[test]
    fn test_periods_of_kind_keeps_table_order() {
        let table = sample_table();
        let kw = PeriodKeywords::default();
        assert_eq!(
            table.periods_of_kind(PeriodKind::Actual, &kw),
            vec![PeriodId::new("Q1 Actual"), PeriodId::new("Q2 Actual")]
        );
        assert_eq!(
            table.periods_of_kind(PeriodKind::Unclassified, &kw),
            vec![PeriodId::new("Budget")]
        );
    }

    #[test]
    fn test_duplicate_periods_collapse() {
        let table = LineItemTable::new(["P1", "P2", "P1"]);
        assert_eq!(table.periods().len(), 2);
    }

    #[test]
    fn test_items_in_category() {
        let table = sample_table();
        assert_eq!(table.items_in(Category::Asset).count(), 1);
        assert_eq!(table.items_in(Category::Liability).count(), 1);
    }
}
