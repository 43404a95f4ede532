//! Polars conversions for typed cells.
//!
//! A column holding only numbers (or missing cells) is stored as `Float64`.
//! Any text makes it a `String` column, with numbers written in their
//! [`format_numeric`](credit_model::format_numeric) spelling. Reading a
//! column back reverses this exactly: a string cell is a number only when
//! it is written the way numbers are written, so text such as `NA` or
//! `1.50` stays text.

use polars::prelude::*;

use credit_model::{RawRecordSet, Value, format_numeric};

use crate::error::Result;

/// Builds a column from typed cells.
///
/// # Examples
///
/// ```
/// use credit_common::value_column;
/// use credit_model::Value;
/// use polars::prelude::DataType;
///
/// let numeric = value_column("AGE", &[Value::Number(30.0), Value::Missing]);
/// assert_eq!(numeric.dtype(), &DataType::Float64);
///
/// let mixed = value_column("SEX", &[Value::Number(1.0), Value::text("NA")]);
/// assert_eq!(mixed.dtype(), &DataType::String);
/// ```
pub fn value_column(name: &str, cells: &[Value]) -> Column {
    let numeric = cells.iter().all(|cell| !matches!(cell, Value::Text(_)));
    if numeric {
        let values: Vec<Option<f64>> = cells.iter().map(Value::as_f64).collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| (!cell.is_missing()).then(|| cell.to_string()))
            .collect();
        Column::new(name.into(), values)
    }
}

/// Reads every cell of a column back as a typed value.
pub fn column_values(column: &Column) -> PolarsResult<Vec<Value>> {
    match column.dtype() {
        DataType::Float64 => Ok(column
            .f64()?
            .into_iter()
            .map(|cell| cell.map_or(Value::Missing, Value::number))
            .collect()),
        DataType::String => Ok(column
            .str()?
            .into_iter()
            .map(|cell| cell.map_or(Value::Missing, string_cell))
            .collect()),
        _ => (0..column.len())
            .map(|index| column.get(index).map(any_to_value))
            .collect(),
    }
}

/// A string cell is a number only when it is that number's own spelling.
fn string_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Missing;
    }
    match cell.parse::<f64>() {
        Ok(number) if !number.is_nan() && format_numeric(number) == cell => {
            Value::Number(number)
        }
        _ => Value::text(cell),
    }
}

/// Converts a polars cell into a typed value.
///
/// Only nulls (and NaN) are missing; strings are never matched against
/// missing-value tokens.
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Missing,
        AnyValue::Boolean(b) => Value::Number(if b { 1.0 } else { 0.0 }),
        AnyValue::Int8(v) => Value::Number(f64::from(v)),
        AnyValue::Int16(v) => Value::Number(f64::from(v)),
        AnyValue::Int32(v) => Value::Number(f64::from(v)),
        AnyValue::Int64(v) => Value::Number(v as f64),
        AnyValue::UInt8(v) => Value::Number(f64::from(v)),
        AnyValue::UInt16(v) => Value::Number(f64::from(v)),
        AnyValue::UInt32(v) => Value::Number(f64::from(v)),
        AnyValue::UInt64(v) => Value::Number(v as f64),
        AnyValue::Float32(v) => Value::number(f64::from(v)),
        AnyValue::Float64(v) => Value::number(v),
        AnyValue::String(s) => string_cell(s),
        AnyValue::StringOwned(s) => string_cell(&s),
        other => string_cell(&other.to_string()),
    }
}

/// One column per raw column, typed with [`value_column`].
pub fn dataframe_from_raw(raw: &RawRecordSet) -> PolarsResult<DataFrame> {
    let columns = raw
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let cells: Vec<Value> = raw.rows().iter().map(|row| row[index].clone()).collect();
            value_column(name, &cells)
        })
        .collect::<Vec<_>>();
    DataFrame::new(columns)
}

/// Converts a `DataFrame` back into raw records.
pub fn raw_from_dataframe(df: &DataFrame) -> Result<RawRecordSet> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_string())
        .collect();
    let columns = df
        .get_columns()
        .iter()
        .map(column_values)
        .collect::<PolarsResult<Vec<_>>>()?;
    let rows = (0..df.height())
        .map(|index| columns.iter().map(|cells| cells[index].clone()).collect())
        .collect();
    Ok(RawRecordSet::from_rows(names, rows)?)
}
