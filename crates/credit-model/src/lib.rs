//! Data model for credit dataset normalization.
//!
//! - **value**: typed cells and value-substitution tables
//! - **record**: raw and canonical record sets
//! - **spec**: the declarative [`FieldSpec`] driving the normalizer
//! - **dataset**: dataset keys accepted by the loader dispatch
//! - **report**: drop counts and unmapped-value warnings

pub mod dataset;
pub mod error;
pub mod record;
pub mod report;
pub mod spec;
pub mod value;

pub use dataset::DatasetKind;
pub use error::{ModelError, Result};
pub use record::{CanonicalRecordSet, CanonicalRow, CanonicalSchema, FairnessMetadata, RawRecordSet};
pub use report::{DropCounts, NormalizeReport, UnmappedOutcome, UnmappedValueWarning};
pub use spec::{
    ColumnPosition, Derivation, FeatureRecode, FieldSpec, FilterOp, LabelSpec, PositionalName,
    ProtectedRule, ProtectedSpec, RowFilter, SourceLayout,
};
pub use value::{Value, ValueLabel, ValueMap, default_na_values, format_numeric};
