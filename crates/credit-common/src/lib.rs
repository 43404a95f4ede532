//! Shared utilities for the credit normalizer crates.
//!
//! Holds the polars conversions between typed [`credit_model::Value`] cells
//! and `DataFrame` columns, used by the transform steps and the output
//! hand-off alike.

pub mod error;
pub mod polars;

pub use error::{FrameError, Result};
pub use polars::{
    any_to_value, column_values, dataframe_from_raw, raw_from_dataframe, value_column,
};
