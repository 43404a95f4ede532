//! Spec-driven normalization of raw credit datasets.
//!
//! - **pipeline**: [`normalize`] and friends
//! - **executors**: one function per pipeline step
//! - **options**: shuffle and missing-feature policies
//! - **frame**: the polars `DataFrame` steps operate on

pub mod error;
mod executors;
mod frame;
pub mod options;
pub mod pipeline;

pub use error::{NormalizeError, Result, Step};
pub use options::{MissingFeaturePolicy, NormalizeOptions, ShufflePolicy};
pub use pipeline::{Normalized, check_schema, identity_spec, normalize, normalize_with_options};
