use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::debug;

use credit_model::DatasetKind;
use credit_output::{Capabilities, Capability, StandardDescriptor, preview_table, write_outputs};
use credit_standards::{SpecRegistry, builtin_source};

use credit_cli::pipeline::{
    LoadRequest, LoadedDataset, default_output_dir, load_dataset, normalize_options,
};

use crate::cli::{LoadArgs, PreviewArgs, SourceArgs, SpecArgs};
use crate::summary::apply_table_style;
use crate::types::LoadResult;

fn load_request(args: &SourceArgs) -> Result<LoadRequest> {
    let dataset = args
        .dataset
        .as_deref()
        .map(str::parse::<DatasetKind>)
        .transpose()?;
    Ok(LoadRequest {
        input: args.input.clone(),
        dataset,
        spec_path: args.spec.clone(),
        label_column: args.label_column.clone(),
        options: normalize_options(args.no_shuffle, args.seed, args.keep_incomplete),
    })
}

pub fn run_load(args: &LoadArgs) -> Result<LoadResult> {
    let request = load_request(&args.source)?;
    let LoadedDataset {
        normalized,
        source_sha256,
        ..
    } = load_dataset(&request)?;

    let outputs = if args.dry_run {
        debug!("dry run, no outputs written");
        None
    } else {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&request.input));
        let descriptor = StandardDescriptor::new(&normalized.records, &normalized.report)
            .with_source(&request.input, source_sha256.clone());
        let paths = write_outputs(&output_dir, &normalized.records, &descriptor)
            .with_context(|| format!("write outputs to {}", output_dir.display()))?;
        Some(paths)
    };

    Ok(LoadResult {
        dataset: normalized.records.dataset.clone(),
        input: request.input,
        source_sha256,
        report: normalized.report,
        outputs,
    })
}

pub fn run_preview(args: &PreviewArgs) -> Result<String> {
    Capabilities::detect().require(Capability::DataFrame)?;
    let request = load_request(&args.source)?;
    let loaded = load_dataset(&request)?;
    let table = preview_table(&loaded.normalized.records, args.rows)?;
    Ok(table)
}

pub fn run_datasets() -> Result<()> {
    let registry = SpecRegistry::builtin().context("load built-in specs")?;
    let mut table = Table::new();
    table.set_header(vec![
        "Key",
        "Dataset",
        "Protected",
        "Label",
        "Features",
        "Shuffle",
    ]);
    apply_table_style(&mut table);
    for (kind, spec) in registry.iter() {
        table.add_row(vec![
            kind.key().to_string(),
            kind.display_name().to_string(),
            format!("{} <- {}", spec.protected.name, spec.protected.source),
            format!("{} <- {}", spec.label.name, spec.label.source),
            spec.features.len().to_string(),
            if spec.shuffle { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_spec(args: &SpecArgs) -> Result<()> {
    let kind: DatasetKind = args.dataset.parse()?;
    print!("{}", builtin_source(kind));
    Ok(())
}

pub fn run_capabilities() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Capability", "Feature", "Available"]);
    apply_table_style(&mut table);
    for status in Capabilities::detect().statuses() {
        table.add_row(vec![
            status.capability.to_string(),
            status.feature.to_string(),
            if status.available { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

