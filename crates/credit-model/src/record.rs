//! Raw and canonical record sets.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::value::{Value, ValueLabel};

/// Rows exactly as read from a source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RawRecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a record set from rows that must all match the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut records = Self::new(columns);
        for row in rows {
            records.push_row(row)?;
        }
        Ok(records)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column; names are case-sensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Column layout of a canonical record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSchema {
    pub protected_attribute: String,
    pub label: String,
    /// Kept features in declared order.
    pub features: Vec<String>,
    /// Subset of `features` to be one-hot encoded downstream.
    pub categorical_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

impl CanonicalSchema {
    /// All output columns: features, protected attribute, label, then score.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.features.clone();
        names.push(self.protected_attribute.clone());
        names.push(self.label.clone());
        if let Some(score) = &self.score {
            names.push(score.clone());
        }
        names
    }
}

/// Group and outcome declarations the fairness consumer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessMetadata {
    pub favorable_labels: Vec<f64>,
    pub privileged_protected: Vec<f64>,
    pub unprivileged_protected: Vec<f64>,
    #[serde(default)]
    pub label_map: Vec<ValueLabel>,
    #[serde(default)]
    pub protected_attribute_map: Vec<ValueLabel>,
}

impl FairnessMetadata {
    /// The declared finite set of protected-attribute values.
    pub fn protected_domain(&self) -> Vec<f64> {
        let mut domain = self.unprivileged_protected.clone();
        domain.extend(self.privileged_protected.iter().copied());
        domain
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub features: Vec<Value>,
    pub protected: f64,
    pub label: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Normalized output handed to the fairness consumer.
///
/// Every row has a protected-attribute value from the declared domain and a
/// non-missing label. Row order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecordSet {
    pub dataset: String,
    pub schema: CanonicalSchema,
    pub metadata: FairnessMetadata,
    pub rows: Vec<CanonicalRow>,
}

impl CanonicalRecordSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.column_names()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.schema.features.iter().position(|feature| feature == name)
    }

    /// Value of `column` (feature, protected attribute, label or score) in `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<Value> {
        let record = self.rows.get(row)?;
        if column == self.schema.protected_attribute {
            return Some(Value::Number(record.protected));
        }
        if column == self.schema.label {
            return Some(record.label.clone());
        }
        if self.schema.score.as_deref() == Some(column) {
            return Some(record.score.map_or(Value::Missing, Value::number));
        }
        let index = self.feature_index(column)?;
        record.features.get(index).cloned()
    }

    /// Flattens the set back into raw rows using [`Self::column_names`].
    pub fn to_raw(&self) -> RawRecordSet {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.features.clone();
                values.push(Value::Number(row.protected));
                values.push(row.label.clone());
                if self.schema.score.is_some() {
                    values.push(row.score.map_or(Value::Missing, Value::number));
                }
                values
            })
            .collect();
        RawRecordSet {
            columns: self.column_names(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> CanonicalRecordSet {
        CanonicalRecordSet {
            dataset: "german".to_string(),
            schema: CanonicalSchema {
                protected_attribute: "AGE".to_string(),
                label: "TARGET".to_string(),
                features: vec!["CREDIT_AMNT".to_string(), "purpose".to_string()],
                categorical_features: vec!["purpose".to_string()],
                score: None,
            },
            metadata: FairnessMetadata {
                favorable_labels: vec![1.0],
                privileged_protected: vec![1.0],
                unprivileged_protected: vec![0.0],
                label_map: vec![ValueLabel::new(1.0, "Good"), ValueLabel::new(2.0, "Bad")],
                protected_attribute_map: vec![],
            },
            rows: vec![CanonicalRow {
                features: vec![Value::Number(1169.0), Value::text("A43")],
                protected: 1.0,
                label: Value::Number(1.0),
                score: None,
            }],
        }
    }

    #[test]
    fn push_row_checks_width() {
        let mut raw = RawRecordSet::new(vec!["A".to_string(), "B".to_string()]);
        raw.push_row(vec![Value::Number(1.0), Value::Missing]).unwrap();
        let error = raw.push_row(vec![Value::Number(1.0)]).unwrap_err();
        assert!(matches!(
            error,
            ModelError::RowWidth {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn canonical_value_lookup_covers_all_columns() {
        let set = canonical();
        assert_eq!(set.value(0, "AGE"), Some(Value::Number(1.0)));
        assert_eq!(set.value(0, "TARGET"), Some(Value::Number(1.0)));
        assert_eq!(set.value(0, "purpose"), Some(Value::text("A43")));
        assert_eq!(set.value(0, "missing"), None);
        assert_eq!(set.value(1, "AGE"), None);
    }

    #[test]
    fn to_raw_uses_canonical_column_order() {
        let raw = canonical().to_raw();
        assert_eq!(raw.columns(), &["CREDIT_AMNT", "purpose", "AGE", "TARGET"]);
        assert_eq!(raw.value(0, "AGE"), Some(&Value::Number(1.0)));
    }
}
