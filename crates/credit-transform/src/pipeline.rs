//! The normalizer.
//!
//! One generic pipeline, parameterized by a [`FieldSpec`]:
//!
//! 1. derive columns
//! 2. code the protected attribute
//! 3. filter rows
//! 4. recode features
//! 5. recode the label
//! 6. select features (dropping incomplete rows by default)
//! 7. tag categorical features
//! 8. shuffle, when asked to
//!
//! The whole raw schema is checked before any step runs, so a missing
//! column fails the load without doing partial work.

use std::collections::BTreeSet;

use tracing::{debug, info, info_span};

use credit_model::{
    CanonicalRecordSet, CanonicalSchema, FairnessMetadata, FieldSpec, LabelSpec,
    NormalizeReport, ProtectedRule, ProtectedSpec, RawRecordSet, SourceLayout,
};

use crate::error::{NormalizeError, Result, Step};
use crate::executors::{
    Selection, apply_derivations, apply_feature_recodes, apply_filters, apply_label,
    apply_protected, select_rows, shuffle_rows,
};
use crate::frame::WorkingFrame;
use crate::options::NormalizeOptions;

/// Canonical records together with what normalization did to get them.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub records: CanonicalRecordSet,
    pub report: NormalizeReport,
}

/// Normalizes `raw` with default options.
pub fn normalize(raw: &RawRecordSet, spec: &FieldSpec) -> Result<Normalized> {
    normalize_with_options(raw, spec, &NormalizeOptions::default())
}

pub fn normalize_with_options(
    raw: &RawRecordSet,
    spec: &FieldSpec,
    options: &NormalizeOptions,
) -> Result<Normalized> {
    let span = info_span!("normalize", dataset = %spec.name, input_rows = raw.len());
    let _guard = span.enter();

    spec.validate()?;
    check_schema(raw, spec)?;

    let mut report = NormalizeReport::new(&spec.name, raw.len());
    let mut frame = WorkingFrame::from_raw(&spec.name, raw)?;

    apply_derivations(&mut frame, &spec.derivations)?;
    apply_protected(&mut frame, &spec.protected, &mut report)?;
    apply_filters(&mut frame, &spec.filters, &mut report)?;
    apply_feature_recodes(&mut frame, &spec.recode)?;
    apply_label(&mut frame, &spec.label, &mut report)?;

    let selection = Selection::resolve(
        &frame,
        &spec.features,
        &spec.protected.name,
        &spec.label.name,
        spec.score.as_deref(),
    )?;
    let mut rows = select_rows(&frame, &selection, options.missing_features, &mut report)?;

    let categorical_features = spec.categorical_features();
    report.ignored_categorical = spec.ignored_categorical();
    if !report.ignored_categorical.is_empty() {
        debug!(
            ignored = ?report.ignored_categorical,
            "categorical names that are not kept features ignored"
        );
    }

    if rows.is_empty() {
        return Err(NormalizeError::EmptyResult {
            dataset: spec.name.clone(),
            input_rows: raw.len(),
        });
    }

    if options.should_shuffle(spec.shuffle) {
        shuffle_rows(&mut rows, options.seed);
        report.shuffled = true;
    }

    report.output_rows = rows.len();
    info!(
        output_rows = report.output_rows,
        dropped = report.dropped.total(),
        warnings = report.warnings.len(),
        "dataset normalized"
    );

    let records = CanonicalRecordSet {
        dataset: spec.name.clone(),
        schema: CanonicalSchema {
            protected_attribute: spec.protected.name.clone(),
            label: spec.label.name.clone(),
            features: spec.features.clone(),
            categorical_features,
            score: spec.score.clone(),
        },
        metadata: FairnessMetadata {
            favorable_labels: spec.label.favorable.clone(),
            privileged_protected: spec.protected.privileged.clone(),
            unprivileged_protected: spec.protected.unprivileged(),
            label_map: spec.label.labels.clone(),
            protected_attribute_map: spec.protected.labels.clone(),
        },
        rows,
    };
    Ok(Normalized { records, report })
}

/// Checks that every column a step reads exists by the time it runs.
///
/// Columns produced by derivations and by the protected/label steps count
/// as present for later steps.
pub fn check_schema(raw: &RawRecordSet, spec: &FieldSpec) -> Result<()> {
    let mut available: BTreeSet<&str> = raw.columns().iter().map(String::as_str).collect();
    let fail = |step: Step, columns: Vec<String>| {
        Err(NormalizeError::schema(&spec.name, step, columns))
    };

    let mut missing: Vec<String> = Vec::new();
    for derivation in &spec.derivations {
        for source in derivation.sources() {
            if !available.contains(source) && !missing.iter().any(|name| name == source) {
                missing.push(source.to_string());
            }
        }
        available.insert(derivation.target());
    }
    if !missing.is_empty() {
        return fail(Step::Derive, missing);
    }

    if !available.contains(spec.protected.source.as_str()) {
        return fail(Step::Protected, vec![spec.protected.source.clone()]);
    }
    available.insert(spec.protected.name.as_str());

    let missing = absent(&available, spec.filters.iter().map(|filter| filter.column.as_str()));
    if !missing.is_empty() {
        return fail(Step::Filter, missing);
    }

    if !available.contains(spec.label.source.as_str()) {
        return fail(Step::Label, vec![spec.label.source.clone()]);
    }
    available.insert(spec.label.name.as_str());

    if let Some(score) = &spec.score
        && !available.contains(score.as_str())
    {
        return fail(Step::Score, vec![score.clone()]);
    }

    let missing = absent(&available, spec.features.iter().map(String::as_str));
    if !missing.is_empty() {
        return fail(Step::Select, missing);
    }
    Ok(())
}

fn absent<'a>(available: &BTreeSet<&str>, names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in names {
        if !available.contains(name) && !missing.iter().any(|seen| seen == name) {
            missing.push(name.to_string());
        }
    }
    missing
}

/// Spec that maps a canonical record set onto itself.
///
/// Normalizing `set.to_raw()` with it reproduces `set`: no derivations,
/// filters or recodes, a pass-through protected rule over the declared
/// domain and no label table. Its layout reads only empty cells as missing,
/// so the canonical CSV reads back with text such as `NA` intact.
pub fn identity_spec(set: &CanonicalRecordSet) -> FieldSpec {
    let schema = &set.schema;
    let metadata = &set.metadata;
    FieldSpec {
        name: set.dataset.clone(),
        description: None,
        source: SourceLayout {
            na_values: Vec::new(),
            ..SourceLayout::default()
        },
        derivations: Vec::new(),
        protected: ProtectedSpec {
            name: schema.protected_attribute.clone(),
            source: schema.protected_attribute.clone(),
            rule: ProtectedRule::Passthrough {
                domain: metadata.protected_domain(),
            },
            privileged: metadata.privileged_protected.clone(),
            labels: metadata.protected_attribute_map.clone(),
        },
        filters: Vec::new(),
        recode: Vec::new(),
        label: LabelSpec {
            name: schema.label.clone(),
            source: schema.label.clone(),
            map: Default::default(),
            favorable: metadata.favorable_labels.clone(),
            labels: metadata.label_map.clone(),
        },
        score: schema.score.clone(),
        features: schema.features.clone(),
        categorical: schema.categorical_features.clone(),
        shuffle: false,
    }
}
