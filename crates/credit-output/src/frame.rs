//! polars `DataFrame` hand-off.

use polars::prelude::*;

use credit_common::dataframe_from_raw;
use credit_model::CanonicalRecordSet;

use crate::error::Result;

/// Builds a `DataFrame` with one column per canonical column.
///
/// Columns holding only numbers (or missing cells) become `Float64`;
/// anything with text becomes `String`.
pub fn to_dataframe(records: &CanonicalRecordSet) -> Result<DataFrame> {
    Ok(dataframe_from_raw(&records.to_raw())?)
}
