use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a reporting period (a column of the line-item table).
///
/// The label is opaque: no date parsing happens, and ordering for display
/// is the insertion order of the source table.
///
/// # Examples
///
/// ```
/// use nwc_analysis::core::period::PeriodId;
///
/// let q1 = PeriodId::new("Q1 2024 Actual");
/// let q2 = PeriodId::new("Q2 2024 Actual");
/// assert_ne!(q1, q2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(String);

impl PeriodId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeriodId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// How a period label was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Realized figures.
    Actual,
    /// Supplied forecast figures.
    Forecast,
    /// Neither keyword present. Shown in the raw table, skipped by analysis.
    Unclassified,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeriodKind::Actual => "actual",
            PeriodKind::Forecast => "forecast",
            PeriodKind::Unclassified => "unclassified",
        };
        f.write_str(s)
    }
}

/// Keywords used to recognise actual and forecast period labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodKeywords {
    pub actual: String,
    pub forecast: String,
}

impl Default for PeriodKeywords {
    fn default() -> Self {
        Self {
            actual: "actual".to_string(),
            forecast: "forecast".to_string(),
        }
    }
}

impl PeriodKeywords {
    pub fn new(actual: impl Into<String>, forecast: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            forecast: forecast.into(),
        }
    }

    /// Classify a period label by case-insensitive substring match.
    ///
    /// The actual keyword wins when a label happens to contain both.
    pub fn classify(&self, period: &PeriodId) -> PeriodKind {
        let label = period.as_str().to_lowercase();
        if contains_keyword(&label, &self.actual) {
            PeriodKind::Actual
        } else if contains_keyword(&label, &self.forecast) {
            PeriodKind::Forecast
        } else {
            PeriodKind::Unclassified
        }
    }
}

fn contains_keyword(label: &str, keyword: &str) -> bool {
    !keyword.is_empty() && label.contains(&keyword.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_default_keywords() {
        let kw = PeriodKeywords::default();
        assert_eq!(kw.classify(&"Q1 2024 Actual".into()), PeriodKind::Actual);
        assert_eq!(kw.classify(&"q1 2025 FORECAST".into()), PeriodKind::Forecast);
        assert_eq!(kw.classify(&"Budget 2025".into()), PeriodKind::Unclassified);
    }

    #[test]
    fn test_classify_custom_keywords() {
        let kw = PeriodKeywords::new("Факт", "Прогноз");
        assert_eq!(kw.classify(&"Q1 2024 факт".into()), PeriodKind::Actual);
        assert_eq!(kw.classify(&"Q1 2025 ПРОГНОЗ".into()), PeriodKind::Forecast);
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let kw = PeriodKeywords::new("", "forecast");
        assert_eq!(kw.classify(&"anything".into()), PeriodKind::Unclassified);
    }

    #[test]
    fn test_period_display() {
        let p = PeriodId::new("Q4 2024 Actual");
        assert_eq!(format!("{}", p), "Q4 2024 Actual");
    }
}
