use std::path::PathBuf;

use credit_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("delimiter `{delimiter}` is not a single-byte ASCII character")]
    Delimiter { delimiter: char },

    #[error("no data in {path}")]
    Empty { path: PathBuf },

    #[error("positional column `{name}` is outside the {width} columns of {path}")]
    PositionOutOfRange {
        path: PathBuf,
        name: String,
        width: usize,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
