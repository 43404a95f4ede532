use std::path::PathBuf;

use credit_model::NormalizeReport;
use credit_output::OutputPaths;

#[derive(Debug)]
pub struct LoadResult {
    pub dataset: String,
    pub input: PathBuf,
    pub source_sha256: String,
    pub report: NormalizeReport,
    /// `None` on a dry run.
    pub outputs: Option<OutputPaths>,
}
