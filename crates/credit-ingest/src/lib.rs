//! Reading raw credit datasets.
//!
//! Delimited files are parsed with the `csv` crate into a
//! [`credit_model::RawRecordSet`]. Cells are typed on the way in, header
//! names are cleaned up, and header-less sources get positional names.

pub mod csv_table;
pub mod error;
pub mod hash;

pub use csv_table::{IngestOptions, SourceFile, read_raw_records_from_reader, read_source};
pub use error::IngestError;
pub use hash::bytes_fingerprint;
