use proptest::prelude::*;

use credit_model::{DatasetKind, RawRecordSet, Value};
use credit_standards::builtin_spec;
use credit_transform::{NormalizeError, NormalizeOptions, normalize_with_options};

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => (-5.0f64..80.0).prop_map(Value::Number),
        1 => Just(Value::Missing),
        1 => "[A-Z]{1,4}".prop_map(Value::Text),
    ]
}

fn label() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => Just(Value::text("GOOD")),
        4 => Just(Value::text("BAD")),
        1 => Just(Value::text("UNKNOWN")),
        1 => Just(Value::Missing),
    ]
}

/// Rows for the UK layout: Age, Amount, BAD plus every other feature.
fn uk_rows() -> impl Strategy<Value = Vec<(Value, Value, Value, Vec<Value>)>> {
    prop::collection::vec(
        (cell(), cell(), label(), prop::collection::vec(cell(), 12)),
        0..40,
    )
}

const UK_FEATURES: [&str; 12] = [
    "Curadd", "Curremp", "Custgend", "Depchild", "Freqpaid", "Homephon", "Insprem", "Loantype",
    "Marstat", "Term", "Homeowns", "Purpose",
];

fn uk_raw(rows: Vec<(Value, Value, Value, Vec<Value>)>) -> RawRecordSet {
    let mut columns = vec!["Age".to_string(), "Amount".to_string(), "BAD".to_string()];
    columns.extend(UK_FEATURES.iter().map(|name| name.to_string()));
    let rows = rows
        .into_iter()
        .map(|(age, amount, bad, rest)| {
            let mut row = vec![age, amount, bad];
            row.extend(rest);
            row
        })
        .collect();
    RawRecordSet::from_rows(columns, rows).expect("raw records")
}

proptest! {
    #[test]
    fn output_never_exceeds_input(rows in uk_rows()) {
        let spec = builtin_spec(DatasetKind::Uk).expect("uk spec");
        let raw = uk_raw(rows);
        match normalize_with_options(&raw, &spec, &NormalizeOptions::new()) {
            Ok(normalized) => {
                prop_assert!(normalized.records.len() <= raw.len());
                prop_assert_eq!(
                    normalized.report.output_rows + normalized.report.dropped.total(),
                    raw.len()
                );
            }
            Err(NormalizeError::EmptyResult { input_rows, .. }) => {
                prop_assert_eq!(input_rows, raw.len());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn protected_values_stay_in_domain(rows in uk_rows(), seed in any::<u64>()) {
        let spec = builtin_spec(DatasetKind::Uk).expect("uk spec");
        let domain = spec.protected.domain();
        let raw = uk_raw(rows);
        let options = NormalizeOptions::new().with_seed(seed);
        if let Ok(normalized) = normalize_with_options(&raw, &spec, &options) {
            for row in &normalized.records.rows {
                prop_assert!(domain.contains(&row.protected));
                prop_assert!(!row.label.is_missing());
            }
        }
    }
}
