use credit_model::ModelError;
use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
