use std::fmt;

use credit_common::FrameError;
use credit_model::ModelError;
use polars::prelude::PolarsError;

/// Pipeline step that needed a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Derive,
    Protected,
    Filter,
    Label,
    Score,
    Select,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Derive => "column derivation",
            Self::Protected => "protected attribute",
            Self::Filter => "row filter",
            Self::Label => "label",
            Self::Score => "score",
            Self::Select => "feature selection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Required source columns are absent from the raw input.
    #[error("{dataset}: missing column(s) {} required by {step}", .columns.join(", "))]
    Schema {
        dataset: String,
        step: Step,
        columns: Vec<String>,
    },

    /// Every row was dropped; there is no partial result.
    #[error("{dataset}: no rows left after normalization ({input_rows} input rows)")]
    EmptyResult { dataset: String, input_rows: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),
}

impl From<FrameError> for NormalizeError {
    fn from(error: FrameError) -> Self {
        match error {
            FrameError::Polars(error) => Self::Polars(error),
            FrameError::Model(error) => Self::Model(error),
        }
    }
}

impl NormalizeError {
    pub(crate) fn schema(dataset: &str, step: Step, columns: Vec<String>) -> Self {
        Self::Schema {
            dataset: dataset.to_string(),
            step,
            columns,
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
