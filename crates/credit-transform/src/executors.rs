//! Step executors.
//!
//! Each function runs one pipeline step over a [`WorkingFrame`] and records
//! what it dropped or could not map in the [`NormalizeReport`].

use std::collections::BTreeMap;

use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use credit_model::{
    CanonicalRow, Derivation, FeatureRecode, LabelSpec, NormalizeReport, ProtectedRule,
    ProtectedSpec, RowFilter, UnmappedOutcome, UnmappedValueWarning, Value,
};

use crate::error::{NormalizeError, Result, Step};
use crate::frame::WorkingFrame;
use crate::options::MissingFeaturePolicy;

/// Computes derived columns in declaration order.
pub(crate) fn apply_derivations(frame: &mut WorkingFrame, derivations: &[Derivation]) -> Result<()> {
    for derivation in derivations {
        let target = derivation.target();
        let column = match derivation {
            Derivation::Copy { source, .. } => frame
                .require(source, Step::Derive)?
                .clone()
                .with_name(target.into()),
            Derivation::Difference {
                minuend,
                subtrahend,
                ..
            } => {
                let left = frame.numeric(minuend, Step::Derive)?;
                let right = frame.numeric(subtrahend, Step::Derive)?;
                Column::from((&left - &right).with_name(target.into()).into_series())
            }
            Derivation::Ratio {
                source, divisor, ..
            } => {
                let values = frame.numeric(source, Step::Derive)?;
                Column::from((&values / *divisor).with_name(target.into()).into_series())
            }
        };
        frame.put(column)?;
        debug!(target_column = target, "derived column");
    }
    Ok(())
}

enum Coded {
    Value(f64),
    /// Unlisted value coded with the lookup's default.
    Defaulted(f64, String),
    Missing,
    OutOfDomain(String),
}

fn code_protected(rule: &ProtectedRule, cell: &Value) -> Coded {
    if cell.is_missing() {
        return Coded::Missing;
    }
    match rule {
        ProtectedRule::Threshold {
            threshold,
            privileged_value,
            unprivileged_value,
        } => match cell.as_f64() {
            Some(value) if value > *threshold => Coded::Value(*privileged_value),
            Some(_) => Coded::Value(*unprivileged_value),
            None => Coded::OutOfDomain(cell.to_string()),
        },
        ProtectedRule::Lookup { table, default } => {
            match (table.get(cell).and_then(Value::as_f64), default) {
                (Some(coded), _) => Coded::Value(coded),
                (None, Some(value)) => Coded::Defaulted(*value, cell.to_string()),
                (None, None) => Coded::OutOfDomain(cell.to_string()),
            }
        }
        ProtectedRule::Passthrough { domain } => match cell.as_f64() {
            Some(value) if domain.contains(&value) => Coded::Value(value),
            _ => Coded::OutOfDomain(cell.to_string()),
        },
    }
}

fn push_warnings(
    report: &mut NormalizeReport,
    column: &str,
    counts: BTreeMap<String, usize>,
    outcome: UnmappedOutcome,
) {
    for (value, rows) in counts {
        warn!(column, rows, ?outcome, "value outside the declared mapping");
        report.warnings.push(UnmappedValueWarning {
            column: column.to_string(),
            value,
            rows,
            outcome,
        });
    }
}

/// Binarizes (or looks up) the protected attribute into `protected.name`.
///
/// Rows without a source value, or with a value that has no place in the
/// declared domain, are dropped. Unlisted lookup values with a default are
/// kept and reported.
pub(crate) fn apply_protected(
    frame: &mut WorkingFrame,
    protected: &ProtectedSpec,
    report: &mut NormalizeReport,
) -> Result<()> {
    let cells = frame.values(&protected.source, Step::Protected)?;
    let mut coded: Vec<Option<f64>> = Vec::with_capacity(cells.len());
    let mut keep: Vec<bool> = Vec::with_capacity(cells.len());
    let mut out_of_domain: BTreeMap<String, usize> = BTreeMap::new();
    let mut defaulted: BTreeMap<String, usize> = BTreeMap::new();

    for cell in &cells {
        let value = match code_protected(&protected.rule, cell) {
            Coded::Value(value) => Some(value),
            Coded::Defaulted(value, raw) => {
                *defaulted.entry(raw).or_default() += 1;
                Some(value)
            }
            Coded::Missing => {
                report.dropped.missing_protected += 1;
                None
            }
            Coded::OutOfDomain(raw) => {
                report.dropped.protected_out_of_domain += 1;
                *out_of_domain.entry(raw).or_default() += 1;
                None
            }
        };
        keep.push(value.is_some());
        coded.push(value);
    }

    frame.put(Column::new(protected.name.as_str().into(), coded))?;
    let mask: BooleanChunked = keep.into_iter().collect();
    let dropped = frame.retain(&mask)?;
    push_warnings(report, &protected.name, out_of_domain, UnmappedOutcome::Dropped);
    push_warnings(report, &protected.name, defaulted, UnmappedOutcome::Defaulted);
    debug!(
        source = %protected.source,
        column = %protected.name,
        dropped,
        "protected attribute coded"
    );
    Ok(())
}

/// Drops rows failing any filter.
pub(crate) fn apply_filters(
    frame: &mut WorkingFrame,
    filters: &[RowFilter],
    report: &mut NormalizeReport,
) -> Result<()> {
    for filter in filters {
        let values = frame.numeric(&filter.column, Step::Filter)?;
        let mask: BooleanChunked = values
            .into_iter()
            .map(|cell| filter.keeps(&cell.map_or(Value::Missing, Value::number)))
            .collect();
        let dropped = frame.retain(&mask)?;
        report.dropped.filtered += dropped;
        debug!(
            column = %filter.column,
            op = filter.op.symbol(),
            value = filter.value,
            dropped,
            "row filter applied"
        );
    }
    Ok(())
}

/// Applies feature substitution tables.
///
/// Columns absent from the frame are skipped: a recode only matters for
/// columns that are kept, and kept columns are checked by selection.
pub(crate) fn apply_feature_recodes(
    frame: &mut WorkingFrame,
    recodes: &[FeatureRecode],
) -> Result<()> {
    for recode in recodes {
        for column in &recode.columns {
            if !frame.has_column(column) {
                debug!(column = %column, "recode column absent, skipped");
                continue;
            }
            let mut changed = 0usize;
            let cells: Vec<Value> = frame
                .values(column, Step::Select)?
                .into_iter()
                .map(|cell| {
                    let replacement = recode.map.get(&cell).or(recode.default.as_ref());
                    match replacement {
                        Some(replacement) if *replacement != cell => {
                            changed += 1;
                            replacement.clone()
                        }
                        _ => cell,
                    }
                })
                .collect();
            frame.put_values(column, &cells)?;
            debug!(column = %column, changed, "feature recoded");
        }
    }
    Ok(())
}

/// Maps raw labels into the canonical label domain.
///
/// Missing labels drop the row. Values the table does not list are kept
/// as they are and reported.
pub(crate) fn apply_label(
    frame: &mut WorkingFrame,
    label: &LabelSpec,
    report: &mut NormalizeReport,
) -> Result<()> {
    let cells = frame.values(&label.source, Step::Label)?;
    let mut keep: Vec<bool> = Vec::with_capacity(cells.len());
    let mut unmapped: BTreeMap<String, usize> = BTreeMap::new();

    let mapped: Vec<Value> = cells
        .into_iter()
        .map(|cell| {
            keep.push(!cell.is_missing());
            if cell.is_missing() {
                report.dropped.missing_label += 1;
                return cell;
            }
            if label.map.is_empty() {
                return cell;
            }
            match label.map.get(&cell) {
                Some(target) => target.clone(),
                None => {
                    *unmapped.entry(cell.to_string()).or_default() += 1;
                    cell
                }
            }
        })
        .collect();

    frame.put_values(&label.name, &mapped)?;
    let mask: BooleanChunked = keep.into_iter().collect();
    let dropped = frame.retain(&mask)?;
    push_warnings(report, &label.name, unmapped, UnmappedOutcome::PassedThrough);
    debug!(source = %label.source, column = %label.name, dropped, "label recoded");
    Ok(())
}

/// Frame columns making up the canonical output.
pub(crate) struct Selection<'a> {
    pub(crate) features: &'a [String],
    pub(crate) protected: &'a str,
    pub(crate) label: &'a str,
    pub(crate) score: Option<&'a str>,
}

impl<'a> Selection<'a> {
    pub(crate) fn resolve(
        frame: &WorkingFrame,
        features: &'a [String],
        protected: &'a str,
        label: &'a str,
        score: Option<&'a str>,
    ) -> Result<Self> {
        let missing: Vec<String> = features
            .iter()
            .filter(|feature| !frame.has_column(feature))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(NormalizeError::schema(
                frame.dataset(),
                Step::Select,
                missing,
            ));
        }
        frame.require(protected, Step::Protected)?;
        frame.require(label, Step::Label)?;
        if let Some(score) = score {
            frame.require(score, Step::Score)?;
        }
        Ok(Self {
            features,
            protected,
            label,
            score,
        })
    }
}

/// Builds canonical rows, applying the missing-feature policy.
pub(crate) fn select_rows(
    frame: &WorkingFrame,
    selection: &Selection<'_>,
    policy: MissingFeaturePolicy,
    report: &mut NormalizeReport,
) -> Result<Vec<CanonicalRow>> {
    let features = selection
        .features
        .iter()
        .map(|feature| frame.values(feature, Step::Select))
        .collect::<Result<Vec<_>>>()?;
    let protected = frame.numeric(selection.protected, Step::Protected)?;
    let labels = frame.values(selection.label, Step::Label)?;
    let scores: Option<Vec<Option<f64>>> = selection
        .score
        .map(|score| frame.numeric(score, Step::Score))
        .transpose()?
        .map(|values| values.into_iter().collect());

    let mut rows = Vec::with_capacity(frame.height());
    for (index, (protected, label)) in protected.into_iter().zip(labels).enumerate() {
        let cells: Vec<Value> = features.iter().map(|column| column[index].clone()).collect();
        if policy == MissingFeaturePolicy::Drop && cells.iter().any(Value::is_missing) {
            report.dropped.incomplete_features += 1;
            continue;
        }
        let Some(protected) = protected else {
            report.dropped.missing_protected += 1;
            continue;
        };
        rows.push(CanonicalRow {
            features: cells,
            protected,
            label,
            score: scores.as_ref().and_then(|scores| scores[index]),
        });
    }
    debug!(
        kept = rows.len(),
        incomplete = report.dropped.incomplete_features,
        "features selected"
    );
    Ok(rows)
}

/// Shuffles rows in place; a seed makes the order reproducible.
pub(crate) fn shuffle_rows(rows: &mut [CanonicalRow], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rows.shuffle(&mut rng);
    debug!(rows = rows.len(), seeded = seed.is_some(), "rows shuffled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_model::{RawRecordSet, ValueMap};

    fn frame(columns: &[&str], rows: Vec<Vec<Value>>) -> WorkingFrame {
        let raw = RawRecordSet::from_rows(
            columns.iter().map(|name| name.to_string()).collect(),
            rows,
        )
        .unwrap();
        WorkingFrame::from_raw("test", &raw).unwrap()
    }

    fn age_spec(rule: ProtectedRule) -> ProtectedSpec {
        ProtectedSpec {
            name: "AGE".to_string(),
            source: "age".to_string(),
            rule,
            privileged: vec![1.0],
            labels: Vec::new(),
        }
    }

    #[test]
    fn difference_with_missing_operand_is_missing() {
        let mut frame = frame(
            &["BILL", "PAY"],
            vec![
                vec![Value::Number(500.0), Value::Number(200.0)],
                vec![Value::Number(500.0), Value::Missing],
            ],
        );
        apply_derivations(
            &mut frame,
            &[Derivation::Difference {
                target: "AMT".to_string(),
                minuend: "BILL".to_string(),
                subtrahend: "PAY".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(
            frame.values("AMT", Step::Derive).unwrap(),
            vec![Value::Number(300.0), Value::Missing]
        );
    }

    #[test]
    fn ratio_and_copy_derive_new_columns() {
        let mut frame = frame(
            &["DAYS"],
            vec![vec![Value::Number(360.0)], vec![Value::text("n/a")]],
        );
        apply_derivations(
            &mut frame,
            &[
                Derivation::Ratio {
                    target: "AGE".to_string(),
                    source: "DAYS".to_string(),
                    divisor: 12.0,
                },
                Derivation::Copy {
                    target: "AGE_COPY".to_string(),
                    source: "AGE".to_string(),
                },
            ],
        )
        .unwrap();
        let expected = vec![Value::Number(30.0), Value::Missing];
        assert_eq!(frame.values("AGE", Step::Derive).unwrap(), expected);
        assert_eq!(frame.values("AGE_COPY", Step::Derive).unwrap(), expected);
    }

    #[test]
    fn threshold_boundary_is_unprivileged() {
        let rule = ProtectedRule::threshold(25.0);
        assert!(matches!(
            code_protected(&rule, &Value::Number(25.0)),
            Coded::Value(v) if v == 0.0
        ));
        assert!(matches!(
            code_protected(&rule, &Value::Number(25.5)),
            Coded::Value(v) if v == 1.0
        ));
        assert!(matches!(
            code_protected(&rule, &Value::Missing),
            Coded::Missing
        ));
    }

    #[test]
    fn threshold_text_is_reported_not_silently_missing() {
        let mut frame = frame(
            &["age"],
            vec![
                vec![Value::Number(30.0)],
                vec![Value::text("abc")],
                vec![Value::Missing],
            ],
        );
        let mut report = NormalizeReport::new("test", 3);
        apply_protected(&mut frame, &age_spec(ProtectedRule::threshold(25.0)), &mut report)
            .unwrap();

        assert_eq!(frame.height(), 1);
        assert_eq!(report.dropped.missing_protected, 1);
        assert_eq!(report.dropped.protected_out_of_domain, 1);
        assert_eq!(
            report.warnings,
            vec![UnmappedValueWarning {
                column: "AGE".to_string(),
                value: "abc".to_string(),
                rows: 1,
                outcome: UnmappedOutcome::Dropped,
            }]
        );
    }

    #[test]
    fn lookup_default_covers_unlisted_values() {
        let rule = ProtectedRule::Lookup {
            table: ValueMap::new().with("New England", 2.0),
            default: Some(1.0),
        };
        assert!(matches!(
            code_protected(&rule, &Value::text("Las Vegas")),
            Coded::Defaulted(v, raw) if v == 1.0 && raw == "Las Vegas"
        ));
        assert!(matches!(
            code_protected(&rule, &Value::Missing),
            Coded::Missing
        ));
        let strict = ProtectedRule::Lookup {
            table: ValueMap::new().with("New England", 2.0),
            default: None,
        };
        assert!(matches!(
            code_protected(&strict, &Value::text("Las Vegas")),
            Coded::OutOfDomain(raw) if raw == "Las Vegas"
        ));
    }

    #[test]
    fn defaulted_lookup_rows_are_kept_and_reported() {
        let mut frame = frame(
            &["team"],
            vec![
                vec![Value::text("New England")],
                vec![Value::text("Las Vegas")],
                vec![Value::text("Las Vegas")],
            ],
        );
        let spec = ProtectedSpec {
            name: "team".to_string(),
            source: "team".to_string(),
            rule: ProtectedRule::Lookup {
                table: ValueMap::new().with("New England", 2.0),
                default: Some(1.0),
            },
            privileged: vec![2.0],
            labels: Vec::new(),
        };
        let mut report = NormalizeReport::new("test", 3);
        apply_protected(&mut frame, &spec, &mut report).unwrap();

        assert_eq!(report.dropped.total(), 0);
        assert_eq!(
            frame.values("team", Step::Protected).unwrap(),
            vec![Value::Number(2.0), Value::Number(1.0), Value::Number(1.0)]
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].rows, 2);
        assert_eq!(report.warnings[0].outcome, UnmappedOutcome::Defaulted);
    }

    #[test]
    fn filters_drop_text_and_missing_cells() {
        let mut frame = frame(
            &["age"],
            vec![
                vec![Value::Number(24.0)],
                vec![Value::Number(-1.0)],
                vec![Value::text("unknown")],
                vec![Value::Missing],
            ],
        );
        let mut report = NormalizeReport::new("test", 4);
        apply_filters(
            &mut frame,
            &[RowFilter::new("age", credit_model::FilterOp::Gt, -1.0)],
            &mut report,
        )
        .unwrap();
        assert_eq!(report.dropped.filtered, 3);
        assert_eq!(
            frame.values("age", Step::Filter).unwrap(),
            vec![Value::Number(24.0)]
        );
    }

    #[test]
    fn recode_default_replaces_unlisted_and_missing() {
        let mut frame = frame(
            &["EDUCATION"],
            vec![
                vec![Value::Number(1.0)],
                vec![Value::Number(6.0)],
                vec![Value::Missing],
            ],
        );
        apply_feature_recodes(
            &mut frame,
            &[FeatureRecode {
                columns: vec!["EDUCATION".to_string(), "ABSENT".to_string()],
                map: ValueMap::new().with(1.0, "graduate_school"),
                default: Some(Value::text("others")),
            }],
        )
        .unwrap();
        assert_eq!(
            frame.values("EDUCATION", Step::Select).unwrap(),
            vec![
                Value::text("graduate_school"),
                Value::text("others"),
                Value::text("others"),
            ]
        );
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let rows: Vec<CanonicalRow> = (0..20_u32)
            .map(|i| CanonicalRow {
                features: vec![Value::Number(f64::from(i))],
                protected: 1.0,
                label: Value::Number(1.0),
                score: None,
            })
            .collect();
        let mut first = rows.clone();
        let mut second = rows.clone();
        shuffle_rows(&mut first, Some(7));
        shuffle_rows(&mut second, Some(7));
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort_by(|a, b| {
            a.features[0]
                .as_f64()
                .partial_cmp(&b.features[0].as_f64())
                .unwrap()
        });
        assert_eq!(sorted, rows);
    }
}
