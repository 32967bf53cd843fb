//! Country records as delivered by the ingestion layer

use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column holding the country's display name
pub const NATION_NAME_COLUMN: &str = "Nation Name";

/// One row of the input dataset, keyed by column name.
///
/// Values stay textual. Interpretation happens at scoring time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryRecord {
    fields: HashMap<String, String>,
}

impl CountryRecord {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Build a record from `(column, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw text of a column, if present
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// The nation name, or `None` when missing or empty.
    ///
    /// Records without a name are excluded from scoring.
    pub fn nation_name(&self) -> Option<&str> {
        self.get(NATION_NAME_COLUMN).filter(|name| !name.is_empty())
    }

    /// Numeric value of a metric with the zero fallback applied
    pub fn metric_value(&self, metric: Metric) -> f64 {
        self.get(metric.column()).map(parse_metric_value).unwrap_or(0.0)
    }
}

/// Parse a metric cell.
///
/// Leading whitespace is skipped and the longest leading decimal number is
/// used, so `"7.5%"` is 7.5 and `"33,000"` is 33. A cell with no leading
/// number (blank, text, `NaN`) or one that is not finite yields `0.0`.
pub fn parse_metric_value(raw: &str) -> f64 {
    match leading_number(raw.trim_start()).parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// `[sign] digits [. digits] [e [sign] digits]` at the start of `s`, or `""`
fn leading_number(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - (end + 1);
        if digits > 0 || frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric_value() {
        assert_eq!(parse_metric_value("42.5"), 42.5);
        assert_eq!(parse_metric_value(" -3 "), -3.0);
        assert_eq!(parse_metric_value("1e3"), 1000.0);
        assert_eq!(parse_metric_value(""), 0.0);
        assert_eq!(parse_metric_value("not_a_number"), 0.0);
        assert_eq!(parse_metric_value("NaN"), 0.0);
        assert_eq!(parse_metric_value("inf"), 0.0);
        assert_eq!(parse_metric_value("Infinity"), 0.0);
        assert_eq!(parse_metric_value("1e999"), 0.0);
    }

    #[test]
    fn test_parse_leading_number_of_mixed_cell() {
        assert_eq!(parse_metric_value("7.5%"), 7.5);
        assert_eq!(parse_metric_value("33,000"), 33.0);
        assert_eq!(parse_metric_value("12abc"), 12.0);
        assert_eq!(parse_metric_value("  .5 points"), 0.5);
        assert_eq!(parse_metric_value("5."), 5.0);
        assert_eq!(parse_metric_value("-2.5e2x"), -250.0);
        assert_eq!(parse_metric_value("3e"), 3.0);
        assert_eq!(parse_metric_value("4e+"), 4.0);
        assert_eq!(parse_metric_value("0x1A"), 0.0);
        assert_eq!(parse_metric_value("-"), 0.0);
        assert_eq!(parse_metric_value("."), 0.0);
        assert_eq!(parse_metric_value("$100"), 0.0);
    }

    #[test]
    fn test_nation_name_requires_text() {
        let named = CountryRecord::from_pairs([(NATION_NAME_COLUMN, "Chile")]);
        assert_eq!(named.nation_name(), Some("Chile"));

        let empty = CountryRecord::from_pairs([(NATION_NAME_COLUMN, "")]);
        assert_eq!(empty.nation_name(), None);

        let missing = CountryRecord::from_pairs([("HDI", "0.9")]);
        assert_eq!(missing.nation_name(), None);
    }

    #[test]
    fn test_missing_metric_column_is_zero() {
        let record = CountryRecord::from_pairs([(NATION_NAME_COLUMN, "Peru"), ("HDI", "0.76")]);
        assert_eq!(record.metric_value(Metric::Hdi), 0.76);
        assert_eq!(record.metric_value(Metric::Cpi), 0.0);
    }
}
