use std::path::PathBuf;

use credit_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse field spec {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize field spec `{name}`: {source}")]
    Serialize {
        name: String,
        #[source]
        source: toml::ser::Error,
    },

    #[error("built-in spec `{origin}` is named `{found}`")]
    NameMismatch { origin: String, found: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
