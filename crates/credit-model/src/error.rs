use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown dataset `{key}` (expected one of: {expected})")]
    UnknownDataset { key: String, expected: String },

    #[error("invalid field spec `{spec}`: {message}")]
    InvalidSpec { spec: String, message: String },

    #[error("row {row} has {actual} values but the record set has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl ModelError {
    pub(crate) fn invalid_spec(spec: &str, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            spec: spec.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
