//! Load stages shared by the `load` and `preview` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, trace};

use credit_ingest::{IngestOptions, read_source};
use credit_model::{DatasetKind, FieldSpec};
use credit_standards::{builtin_spec, load_spec_file};
use credit_transform::{
    MissingFeaturePolicy, NormalizeOptions, Normalized, ShufflePolicy, normalize_with_options,
};

use crate::logging::redact_value;

/// Everything needed to load one dataset.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub input: PathBuf,
    pub dataset: Option<DatasetKind>,
    /// Custom spec file; takes precedence over `dataset`.
    pub spec_path: Option<PathBuf>,
    pub label_column: Option<String>,
    pub options: NormalizeOptions,
}

impl LoadRequest {
    pub fn builtin(input: impl Into<PathBuf>, dataset: DatasetKind) -> Self {
        Self {
            input: input.into(),
            dataset: Some(dataset),
            spec_path: None,
            label_column: None,
            options: NormalizeOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_label_column(mut self, column: Option<String>) -> Self {
        self.label_column = column;
        self
    }
}

#[derive(Debug)]
pub struct LoadedDataset {
    pub spec: FieldSpec,
    pub normalized: Normalized,
    /// SHA-256 of the raw input file.
    pub source_sha256: String,
}

/// Maps the shuffle/incomplete-row flags onto [`NormalizeOptions`].
pub fn normalize_options(no_shuffle: bool, seed: Option<u64>, keep_incomplete: bool) -> NormalizeOptions {
    let mut options = NormalizeOptions::new();
    if no_shuffle {
        options = options.with_shuffle(ShufflePolicy::Never);
    }
    if let Some(seed) = seed {
        options = options.with_seed(seed);
    }
    if keep_incomplete {
        options = options.with_missing_features(MissingFeaturePolicy::Keep);
    }
    options
}

pub fn resolve_spec(request: &LoadRequest) -> Result<FieldSpec> {
    let spec = match (&request.spec_path, request.dataset) {
        (Some(path), _) => load_spec_file(path)
            .with_context(|| format!("load field spec {}", path.display()))?,
        (None, Some(kind)) => {
            builtin_spec(kind).with_context(|| format!("load built-in spec for {kind}"))?
        }
        (None, None) => bail!("either a dataset key or a field spec file is required"),
    };
    Ok(match &request.label_column {
        Some(column) => spec.with_label_source(column.clone()),
        None => spec,
    })
}

/// Resolves the field spec, reads and fingerprints the input, then normalizes it.
pub fn load_dataset(request: &LoadRequest) -> Result<LoadedDataset> {
    let spec = resolve_spec(request)?;
    let span = info_span!("load", dataset = %spec.name, input = %request.input.display());
    let _guard = span.enter();

    let options = IngestOptions::try_from(&spec.source)
        .with_context(|| format!("source layout of {}", spec.name))?;
    let source = read_source(&request.input, &options)
        .with_context(|| format!("read {}", request.input.display()))?;
    let source_sha256 = source.sha256;
    let normalized = normalize_with_options(&source.records, &spec, &request.options)
        .with_context(|| format!("normalize {}", spec.name))?;

    for warning in &normalized.report.warnings {
        trace!(
            column = %warning.column,
            value = %redact_value(&warning.value),
            rows = warning.rows,
            "unmapped value detail"
        );
    }
    info!(
        rows = normalized.records.len(),
        sha256 = %source_sha256,
        "dataset loaded"
    );
    Ok(LoadedDataset {
        spec,
        normalized,
        source_sha256,
    })
}

/// `<INPUT directory>/normalized`, used when no output directory is given.
pub fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join("normalized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_options() {
        let options = normalize_options(true, None, true);
        assert_eq!(options.shuffle, ShufflePolicy::Never);
        assert_eq!(options.missing_features, MissingFeaturePolicy::Keep);

        let options = normalize_options(false, Some(7), false);
        assert_eq!(options.shuffle, ShufflePolicy::FromSpec);
        assert_eq!(options.seed, Some(7));
    }

    #[test]
    fn default_output_dir_sits_next_to_input() {
        assert_eq!(
            default_output_dir(Path::new("data/german.csv")),
            PathBuf::from("data/normalized")
        );
        assert_eq!(
            default_output_dir(Path::new("german.csv")),
            PathBuf::from("./normalized")
        );
    }
}
