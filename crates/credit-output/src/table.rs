//! Canonical CSV writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use credit_model::CanonicalRecordSet;

use crate::error::{OutputError, Result};

/// Writes the canonical columns (features, protected attribute, label,
/// score) with a header row. Missing cells are left empty.
pub fn write_canonical_csv(path: &Path, records: &CanonicalRecordSet) -> Result<()> {
    let file = File::create(path).map_err(|error| OutputError::io(path, error))?;
    write_canonical_csv_to(BufWriter::new(file), records)
        .map_err(|error| OutputError::csv(path, error))
}

pub fn write_canonical_csv_to<W: Write>(
    writer: W,
    records: &CanonicalRecordSet,
) -> std::result::Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(records.column_names())?;
    let raw = records.to_raw();
    for row in raw.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}
