//! Declarative per-dataset transformation description.
//!
//! A [`FieldSpec`] holds everything that differs between credit sources:
//! raw column names, derived columns, the protected-attribute rule, row
//! filters, value-substitution tables and the feature lists. The normalizer
//! itself has no dataset-specific code paths.
//!
//! Specs are usually written in TOML:
//!
//! ```toml
//! name = "uk"
//! features = ["CREDIT_AMNT", "Curadd"]
//! categorical = []
//!
//! [[derive]]
//! kind = "copy"
//! target = "CREDIT_AMNT"
//! source = "Amount"
//!
//! [protected]
//! name = "AGE"
//! source = "Age"
//! privileged = [1.0]
//! rule = { kind = "threshold", threshold = 25.0 }
//!
//! [label]
//! name = "TARGET"
//! source = "BAD"
//! favorable = [1.0]
//! map = { GOOD = 1.0, BAD = 2.0 }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::value::{Value, ValueLabel, ValueMap, default_na_values};

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

fn default_privileged_value() -> f64 {
    1.0
}

/// Full description of one dataset's normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Dataset identifier used in logs and outputs.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// How the raw file is laid out.
    #[serde(default)]
    pub source: SourceLayout,
    /// Columns computed from raw columns before anything else runs.
    #[serde(default, rename = "derive", skip_serializing_if = "Vec::is_empty")]
    pub derivations: Vec<Derivation>,
    pub protected: ProtectedSpec,
    /// Rows failing any filter are dropped silently.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<RowFilter>,
    /// Feature value substitutions (category names, sentinel folding).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recode: Vec<FeatureRecode>,
    pub label: LabelSpec,
    /// Optional model-score column carried into the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    /// Feature columns to keep, excluding the protected attribute and label.
    pub features: Vec<String>,
    /// Features to be one-hot encoded downstream.
    #[serde(default)]
    pub categorical: Vec<String>,
    /// Whether the source's row order should be randomized.
    #[serde(default)]
    pub shuffle: bool,
}

/// Raw file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceLayout {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_true")]
    pub has_headers: bool,
    /// First column is a row index and carries no data.
    #[serde(default)]
    pub index_column: bool,
    /// Names for columns addressed by position (header-less sources).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<PositionalName>,
    /// Cell spellings read as missing; empty cells always are.
    #[serde(
        default = "default_na_values",
        skip_serializing_if = "is_default_na_values"
    )]
    pub na_values: Vec<String>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_headers: true,
            index_column: false,
            positional: Vec::new(),
            na_values: default_na_values(),
        }
    }
}

fn is_default_na_values(values: &[String]) -> bool {
    values == default_na_values().as_slice()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionalName {
    pub name: String,
    pub position: ColumnPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    /// Zero-based index from the first column.
    Index(usize),
    /// One-based offset from the last column (`1` is the last column).
    FromEnd(usize),
}

impl ColumnPosition {
    /// Resolves the position against a row width.
    pub fn resolve(self, width: usize) -> Option<usize> {
        match self {
            Self::Index(index) => (index < width).then_some(index),
            Self::FromEnd(offset) => {
                (offset >= 1 && offset <= width).then(|| width - offset)
            }
        }
    }
}

/// A computed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Derivation {
    /// `target = source`, value kept as-is.
    Copy { target: String, source: String },
    /// `target = minuend - subtrahend`.
    Difference {
        target: String,
        minuend: String,
        subtrahend: String,
    },
    /// `target = source / divisor`.
    Ratio {
        target: String,
        source: String,
        divisor: f64,
    },
}

impl Derivation {
    pub fn target(&self) -> &str {
        match self {
            Self::Copy { target, .. }
            | Self::Difference { target, .. }
            | Self::Ratio { target, .. } => target,
        }
    }

    /// Raw columns the derivation reads.
    pub fn sources(&self) -> Vec<&str> {
        match self {
            Self::Copy { source, .. } | Self::Ratio { source, .. } => vec![source.as_str()],
            Self::Difference {
                minuend,
                subtrahend,
                ..
            } => vec![minuend.as_str(), subtrahend.as_str()],
        }
    }
}

/// Protected attribute definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtectedSpec {
    /// Output column name (e.g. `AGE`).
    pub name: String,
    /// Column the rule reads, raw or derived.
    pub source: String,
    pub rule: ProtectedRule,
    /// Values forming the privileged group.
    pub privileged: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<ValueLabel>,
}

impl ProtectedSpec {
    /// The finite set of values the protected attribute may take.
    pub fn domain(&self) -> Vec<f64> {
        self.rule.domain()
    }

    pub fn unprivileged(&self) -> Vec<f64> {
        self.domain()
            .into_iter()
            .filter(|value| !self.privileged.contains(value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ProtectedRule {
    /// `value > threshold` maps to the privileged value, anything else
    /// numeric (including the threshold itself) to the unprivileged value.
    Threshold {
        threshold: f64,
        #[serde(default = "default_privileged_value")]
        privileged_value: f64,
        #[serde(default)]
        unprivileged_value: f64,
    },
    /// Categorical lookup with an optional value for unlisted categories.
    Lookup {
        table: ValueMap,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    /// Column already holds coded values from `domain`.
    Passthrough { domain: Vec<f64> },
}

impl ProtectedRule {
    pub fn threshold(threshold: f64) -> Self {
        Self::Threshold {
            threshold,
            privileged_value: default_privileged_value(),
            unprivileged_value: 0.0,
        }
    }

    pub fn domain(&self) -> Vec<f64> {
        let candidates: Vec<f64> = match self {
            Self::Threshold {
                privileged_value,
                unprivileged_value,
                ..
            } => vec![*unprivileged_value, *privileged_value],
            Self::Lookup { table, default } => table
                .targets()
                .filter_map(Value::as_f64)
                .chain(*default)
                .collect(),
            Self::Passthrough { domain } => domain.clone(),
        };
        let mut values = Vec::with_capacity(candidates.len());
        for value in candidates {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values
    }
}

/// Keep rows where `column <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: f64,
}

impl RowFilter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: f64) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// Non-numeric and missing cells never pass.
    pub fn keeps(&self, cell: &Value) -> bool {
        cell.as_f64().is_some_and(|v| self.op.test(v, self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl FilterOp {
    pub fn test(self, left: f64, right: f64) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Eq => left == right,
            Self::Ne => left != right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// Substitution applied to one or more feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRecode {
    pub columns: Vec<String>,
    pub map: ValueMap,
    /// Replacement for values the map does not list, missing included.
    /// Without it unlisted values are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Target label definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelSpec {
    /// Output column name (e.g. `TARGET`).
    pub name: String,
    pub source: String,
    /// Raw value -> canonical value. Empty means no re-coding.
    #[serde(default, skip_serializing_if = "ValueMap::is_empty")]
    pub map: ValueMap,
    /// Canonical values counted as the favorable outcome.
    pub favorable: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<ValueLabel>,
}

impl FieldSpec {
    /// Checks internal consistency; the raw schema is checked at
    /// normalization time.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(ModelError::invalid_spec(&self.name, message));

        if self.name.trim().is_empty() {
            return Err(ModelError::invalid_spec("<unnamed>", "name is empty"));
        }
        if self.protected.name.trim().is_empty() || self.protected.source.trim().is_empty() {
            return fail("protected attribute needs a name and a source column".to_string());
        }
        if self.label.name.trim().is_empty() || self.label.source.trim().is_empty() {
            return fail("label needs a name and a source column".to_string());
        }
        if self.protected.name == self.label.name {
            return fail(format!(
                "protected attribute and label share the name `{}`",
                self.label.name
            ));
        }
        if self.features.is_empty() {
            return fail("feature list is empty".to_string());
        }

        let mut seen = BTreeSet::new();
        for feature in &self.features {
            if feature == &self.protected.name || feature == &self.label.name {
                return fail(format!(
                    "feature `{feature}` repeats the protected attribute or label"
                ));
            }
            if self.score.as_deref() == Some(feature.as_str()) {
                return fail(format!("feature `{feature}` repeats the score column"));
            }
            if !seen.insert(feature.as_str()) {
                return fail(format!("feature `{feature}` is listed twice"));
            }
        }

        match &self.protected.rule {
            ProtectedRule::Threshold {
                threshold,
                privileged_value,
                unprivileged_value,
            } => {
                if !threshold.is_finite() {
                    return fail("protected threshold must be finite".to_string());
                }
                if privileged_value == unprivileged_value {
                    return fail(
                        "privileged and unprivileged values must differ".to_string(),
                    );
                }
            }
            ProtectedRule::Lookup { table, .. } => {
                if table.is_empty() {
                    return fail("protected lookup table is empty".to_string());
                }
                if let Some((key, _)) = table.iter().find(|(_, value)| value.as_f64().is_none())
                {
                    return fail(format!(
                        "protected lookup value for `{key}` must be numeric"
                    ));
                }
            }
            ProtectedRule::Passthrough { domain } => {
                if domain.is_empty() {
                    return fail("protected passthrough domain is empty".to_string());
                }
            }
        }

        let domain = self.protected.domain();
        if self.protected.privileged.is_empty() {
            return fail("no privileged protected-attribute value declared".to_string());
        }
        if let Some(value) = self
            .protected
            .privileged
            .iter()
            .find(|value| !domain.contains(*value))
        {
            return fail(format!(
                "privileged value {value} is outside the protected domain {domain:?}"
            ));
        }

        for derivation in &self.derivations {
            if let Derivation::Ratio { divisor, .. } = derivation
                && (*divisor == 0.0 || !divisor.is_finite())
            {
                return fail(format!(
                    "ratio for `{}` needs a finite non-zero divisor",
                    derivation.target()
                ));
            }
        }

        if !self.source.delimiter.is_ascii() {
            return fail(format!(
                "delimiter `{}` is not a single-byte ASCII character",
                self.source.delimiter
            ));
        }

        for positional in &self.source.positional {
            if let ColumnPosition::FromEnd(0) = positional.position {
                return fail(format!(
                    "positional column `{}` uses from_end = 0; offsets start at 1",
                    positional.name
                ));
            }
        }

        Ok(())
    }

    /// Categorical names that are also kept features, in feature order.
    pub fn categorical_features(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|feature| self.categorical.contains(*feature))
            .cloned()
            .collect()
    }

    /// Categorical names that are not kept features.
    pub fn ignored_categorical(&self) -> Vec<String> {
        self.categorical
            .iter()
            .filter(|name| !self.features.contains(*name))
            .cloned()
            .collect()
    }

    /// Re-points the label at another raw column.
    #[must_use]
    pub fn with_label_source(mut self, source: impl Into<String>) -> Self {
        self.label.source = source.into();
        self
    }

}
