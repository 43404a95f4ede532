//! Scalar cell values and value-substitution tables.
//!
//! Raw CSV cells are typed once at ingest time: anything that parses as a
//! finite or infinite number becomes [`Value::Number`], the usual missing-value
//! tokens become [`Value::Missing`], and everything else stays text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tokens read as missing, in addition to the empty string.
const MISSING_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "#N/A", "#NA", "<NA>",
    "None",
];

/// The tokens [`Value::parse`] reads as missing, for layouts that list
/// their own.
pub fn default_na_values() -> Vec<String> {
    MISSING_TOKENS.iter().map(|token| (*token).to_string()).collect()
}

/// A single cell of a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Value {
    /// Types a raw CSV cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use credit_model::Value;
    ///
    /// assert_eq!(Value::parse(" 30 "), Value::Number(30.0));
    /// assert_eq!(Value::parse("GOOD"), Value::Text("GOOD".to_string()));
    /// assert_eq!(Value::parse("NA"), Value::Missing);
    /// assert_eq!(Value::parse(""), Value::Missing);
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self::parse_cell(raw, |token| MISSING_TOKENS.contains(&token))
    }

    /// Types a raw CSV cell, reading only `na_values` (and empty cells) as
    /// missing.
    pub fn parse_with(raw: &str, na_values: &[String]) -> Self {
        Self::parse_cell(raw, |token| na_values.iter().any(|na| na == token))
    }

    fn parse_cell(raw: &str, is_na: impl Fn(&str) -> bool) -> Self {
        let trimmed = raw.trim().trim_matches('\u{feff}');
        if trimmed.is_empty() || is_na(trimmed) {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if !number.is_nan() => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Builds a numeric value, mapping NaN to missing.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Number(value)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_numeric(*value)),
            Self::Text(value) => f.write_str(value),
            Self::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Formats a floating-point number without trailing zeros.
///
/// # Examples
///
/// ```
/// use credit_model::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// assert_eq!(format_numeric(-300.0), "-300");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ordered value-substitution table.
///
/// Keys are written as strings in spec files and typed with [`Value::parse`],
/// so `"0"` matches the numeric cell `0` and `"GOOD"` matches the text cell
/// `GOOD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Value>",
    into = "BTreeMap<String, Value>"
)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the substitution for `from`.
    pub fn insert(&mut self, from: Value, to: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == from) {
            entry.1 = to;
        } else {
            self.entries.push((from, to));
        }
    }

    #[must_use]
    pub fn with(mut self, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.insert(from.into(), to.into());
        self
    }

    pub fn get(&self, value: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == value)
            .map(|(_, target)| target)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn targets(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl From<BTreeMap<String, Value>> for ValueMap {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut map = Self::new();
        for (key, value) in raw {
            map.insert(Value::parse(&key), value);
        }
        map
    }
}

impl From<ValueMap> for BTreeMap<String, Value> {
    fn from(map: ValueMap) -> Self {
        map.entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// Human-readable name of a coded value (e.g. `1.0 -> "Good"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub value: f64,
    pub label: String,
}

impl ValueLabel {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_types_cells() {
        assert_eq!(Value::parse("-2"), Value::Number(-2.0));
        assert_eq!(Value::parse("0.5"), Value::Number(0.5));
        assert_eq!(Value::parse("nan"), Value::Missing);
        assert_eq!(Value::parse("  "), Value::Missing);
        assert_eq!(Value::parse("A11"), Value::text("A11"));
    }

    #[test]
    fn parse_with_reads_only_listed_tokens_as_missing() {
        assert_eq!(Value::parse_with("NA", &[]), Value::text("NA"));
        assert_eq!(Value::parse_with(" ", &[]), Value::Missing);
        assert_eq!(Value::parse_with("?", &["?".to_string()]), Value::Missing);
        assert_eq!(Value::parse_with("NA", &default_na_values()), Value::Missing);
        assert_eq!(Value::parse_with("7", &[]), Value::Number(7.0));
    }

    #[test]
    fn display_matches_source_spelling() {
        assert_eq!(Value::Number(300.0).to_string(), "300");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::text("BAD").to_string(), "BAD");
        assert_eq!(Value::Missing.to_string(), "");
    }

    #[test]
    fn value_map_matches_numeric_and_text_keys() {
        let map: ValueMap = BTreeMap::from([
            ("0".to_string(), Value::Number(1.0)),
            ("1".to_string(), Value::Number(2.0)),
            ("GOOD".to_string(), Value::Number(1.0)),
        ])
        .into();

        assert_eq!(map.get(&Value::Number(0.0)), Some(&Value::Number(1.0)));
        assert_eq!(map.get(&Value::Number(1.0)), Some(&Value::Number(2.0)));
        assert_eq!(map.get(&Value::text("GOOD")), Some(&Value::Number(1.0)));
        assert_eq!(map.get(&Value::text("UNKNOWN")), None);
        assert_eq!(map.get(&Value::Missing), None);
    }

    #[test]
    fn value_map_insert_replaces() {
        let map = ValueMap::new().with(1.0, "Male").with(1.0, "M");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::Number(1.0)), Some(&Value::text("M")));
    }

    #[test]
    fn format_numeric_keeps_integers_intact() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(1e21), "1000000000000000000000");
    }
}
