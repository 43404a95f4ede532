//! Writes every artifact of a normalization run into one directory.

use std::path::{Path, PathBuf};

use tracing::info;

use credit_model::CanonicalRecordSet;

use crate::descriptor::StandardDescriptor;
use crate::error::{OutputError, Result};
use crate::table::write_canonical_csv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub descriptor: PathBuf,
}

fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|error| OutputError::io(path, error))
}

/// Writes `<dataset>.csv` and `<dataset>.descriptor.json` into `output_dir`.
pub fn write_outputs(
    output_dir: &Path,
    records: &CanonicalRecordSet,
    descriptor: &StandardDescriptor,
) -> Result<OutputPaths> {
    ensure_output_dir(output_dir)?;
    let stem = records.dataset.to_lowercase();
    let paths = OutputPaths {
        csv: output_dir.join(format!("{stem}.csv")),
        descriptor: output_dir.join(format!("{stem}.descriptor.json")),
    };
    write_canonical_csv(&paths.csv, records)?;
    descriptor.write_json(&paths.descriptor)?;
    info!(
        csv = %paths.csv.display(),
        descriptor = %paths.descriptor.display(),
        rows = records.len(),
        "outputs written"
    );
    Ok(paths)
}
