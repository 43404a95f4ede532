use std::fmt;

use serde::{Deserialize, Serialize};

/// A value outside a declared substitution table or domain.
///
/// Non-fatal: the load still succeeds, but every occurrence needs manual
/// review because the value may have been mis-coded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedValueWarning {
    pub column: String,
    pub value: String,
    /// Number of rows carrying the value.
    pub rows: usize,
    pub outcome: UnmappedOutcome,
}

/// What happened to the rows carrying an unmapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedOutcome {
    /// Value kept unchanged in the output.
    PassedThrough,
    /// Rows dropped because the value has no place in the protected domain.
    Dropped,
    /// Rows kept with the lookup's default code.
    Defaulted,
}

impl fmt::Display for UnmappedValueWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.value.is_empty() {
            "<missing>"
        } else {
            self.value.as_str()
        };
        let outcome = match self.outcome {
            UnmappedOutcome::PassedThrough => "passed through unchanged",
            UnmappedOutcome::Dropped => "rows dropped",
            UnmappedOutcome::Defaulted => "coded with the default",
        };
        write!(
            f,
            "{}: value `{}` is not in the declared mapping ({} rows, {})",
            self.column, value, self.rows, outcome
        )
    }
}

/// Per-reason counts of rows removed during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    /// Protected-attribute source was missing or not numeric.
    pub missing_protected: usize,
    /// Protected value had no place in the declared domain.
    pub protected_out_of_domain: usize,
    /// A row filter rejected the row.
    pub filtered: usize,
    pub missing_label: usize,
    /// A kept feature was missing.
    pub incomplete_features: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing_protected
            + self.protected_out_of_domain
            + self.filtered
            + self.missing_label
            + self.incomplete_features
    }
}

/// What a normalization run did to its input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub dataset: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub dropped: DropCounts,
    pub warnings: Vec<UnmappedValueWarning>,
    /// Categorical names ignored because they are not kept features.
    pub ignored_categorical: Vec<String>,
    pub shuffled: bool,
}

impl NormalizeReport {
    pub fn new(dataset: impl Into<String>, input_rows: usize) -> Self {
        Self {
            dataset: dataset.into(),
            input_rows,
            ..Self::default()
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warning_rows(&self) -> usize {
        self.warnings.iter().map(|warning| warning.rows).sum()
    }
}
