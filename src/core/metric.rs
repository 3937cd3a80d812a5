use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Outcome of a single computed cell.
///
/// Missing inputs and division by zero never abort a computation; they
/// degrade only the affected cell to [`Metric::Undefined`]. A sensitivity
/// budget with no finite bound is [`Metric::Unbounded`], which renders
/// differently from missing data.
///
/// # Examples
///
/// ```
/// use nwc_analysis::core::metric::Metric;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(Metric::percent_of(dec!(40), dec!(80)), Metric::Defined(dec!(50)));
/// assert_eq!(Metric::percent_of(dec!(40), dec!(0)), Metric::Undefined);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Defined(Decimal),
    Undefined,
    Unbounded,
}

impl Metric {
    /// `numerator / denominator * 100`, undefined on a zero denominator or overflow.
    pub fn percent_of(numerator: Decimal, denominator: Decimal) -> Self {
        if denominator.is_zero() {
            return Metric::Undefined;
        }
        numerator
            .checked_div(denominator)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Metric::Undefined, Metric::Defined)
    }

    pub fn from_option(value: Option<Decimal>) -> Self {
        value.map_or(Metric::Undefined, Metric::Defined)
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Metric::Defined(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Metric::Undefined)
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Metric::Unbounded)
    }

    /// Lossy conversion for plotting and tolerance checks.
    /// Unbounded maps to `f64::INFINITY`, undefined to `None`.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Metric::Defined(v) => v.to_f64(),
            Metric::Undefined => None,
            Metric::Unbounded => Some(f64::INFINITY),
        }
    }

    /// Render as a percentage with two decimals.
    pub fn display_percent(&self) -> String {
        match self {
            Metric::Defined(v) => format!("{:.2}%", v.round_dp(2)),
            other => other.to_string(),
        }
    }

    /// Render as a whole currency amount.
    pub fn display_amount(&self) -> String {
        match self {
            Metric::Defined(v) => format!("{}", v.round_dp(0)),
            other => other.to_string(),
        }
    }
}

impl From<Decimal> for Metric {
    fn from(value: Decimal) -> Self {
        Metric::Defined(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Defined(v) => write!(f, "{}", v),
            Metric::Undefined => f.write_str("N/A"),
            Metric::Unbounded => f.write_str("unbounded"),
        }
    }
}

// JSON shape: defined values as decimal strings, undefined as null,
// unbounded as the literal string "unbounded".
impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Defined(v) => Serialize::serialize(v, serializer),
            Metric::Undefined => serializer.serialize_none(),
            Metric::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None => Ok(Metric::Undefined),
            Some("unbounded") => Ok(Metric::Unbounded),
            Some(s) => s
                .parse::<Decimal>()
                .map(Metric::Defined)
                .map_err(serde::de::Error::custom),
        }
    }
}
