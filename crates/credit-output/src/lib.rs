//! Output side of the credit normalizer.
//!
//! - **table**: canonical CSV
//! - **descriptor**: JSON description for the fairness consumer
//! - **frame**: polars `DataFrame` hand-off (`dataframe` feature)
//! - **capability**: what this build can do

pub mod capability;
pub mod descriptor;
pub mod error;
#[cfg(feature = "dataframe")]
pub mod frame;
pub mod table;
pub mod writer;

pub use capability::{Capabilities, Capability, CapabilityStatus, Unavailable};
pub use descriptor::{DescriptorMetadata, SourceInfo, StandardDescriptor};
pub use error::{OutputError, Result};
#[cfg(feature = "dataframe")]
pub use credit_common::raw_from_dataframe;
#[cfg(feature = "dataframe")]
pub use frame::to_dataframe;
pub use table::{write_canonical_csv, write_canonical_csv_to};
pub use writer::{OutputPaths, write_outputs};

use credit_model::CanonicalRecordSet;

/// Renders the first `rows` rows as a table.
///
/// Needs the `dataframe` capability.
pub fn preview_table(records: &CanonicalRecordSet, rows: usize) -> Result<String> {
    Capabilities::detect().require(Capability::DataFrame)?;
    render_preview(records, rows)
}

#[cfg(feature = "dataframe")]
fn render_preview(records: &CanonicalRecordSet, rows: usize) -> Result<String> {
    let df = to_dataframe(records)?;
    Ok(df.head(Some(rows)).to_string())
}

#[cfg(not(feature = "dataframe"))]
fn render_preview(_records: &CanonicalRecordSet, _rows: usize) -> Result<String> {
    Err(Unavailable::new(Capability::DataFrame).into())
}
