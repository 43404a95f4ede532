use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use credit_model::{PositionalName, RawRecordSet, SourceLayout, Value, default_na_values};

use crate::error::IngestError;
use crate::hash::bytes_fingerprint;

/// How a delimited file is turned into a [`RawRecordSet`].
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub delimiter: u8,
    pub has_headers: bool,
    /// Drop the first column (a row index written by the exporting tool).
    pub index_column: bool,
    pub positional: Vec<PositionalName>,
    /// Cell spellings read as missing besides the empty cell.
    pub na_values: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            index_column: false,
            positional: Vec::new(),
            na_values: default_na_values(),
        }
    }
}

impl TryFrom<&SourceLayout> for IngestOptions {
    type Error = IngestError;

    fn try_from(layout: &SourceLayout) -> Result<Self, Self::Error> {
        let delimiter = u8::try_from(layout.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(IngestError::Delimiter {
                delimiter: layout.delimiter,
            })?;
        Ok(Self {
            delimiter,
            has_headers: layout.has_headers,
            index_column: layout.index_column,
            positional: layout.positional.clone(),
            na_values: layout.na_values.clone(),
        })
    }
}

/// Typed records together with the SHA-256 of the bytes they were read from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub records: RawRecordSet,
    pub sha256: String,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Names blank headers `Unnamed: <idx>` and suffixes repeats with `.1`,
/// `.2`, ... so every column stays addressable.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while headers.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        headers.push(candidate);
    }
    headers
}

fn apply_positional_names(
    headers: &mut [String],
    positional: &[PositionalName],
    source: &Path,
) -> Result<(), IngestError> {
    let width = headers.len();
    for entry in positional {
        let Some(index) = entry.position.resolve(width) else {
            return Err(IngestError::PositionOutOfRange {
                path: source.to_path_buf(),
                name: entry.name.clone(),
                width,
            });
        };
        headers[index] = entry.name.clone();
    }
    Ok(())
}

/// Reads a delimited file into typed raw records.
///
/// The file is read once; the fingerprint covers exactly the parsed bytes.
pub fn read_source(path: &Path, options: &IngestOptions) -> Result<SourceFile, IngestError> {
    let bytes = std::fs::read(path).map_err(|error| IngestError::io(path, error))?;
    let sha256 = bytes_fingerprint(&bytes);
    let records = read_raw_records_from_reader(bytes.as_slice(), path, options)?;
    Ok(SourceFile { records, sha256 })
}

/// Reads delimited text from any reader; `source` is only used in errors.
pub fn read_raw_records_from_reader<R: Read>(
    reader: R,
    source: &Path,
    options: &IngestOptions,
) -> Result<RawRecordSet, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|error| IngestError::csv(source, error))?;
        let row: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }

    let mut rows = raw_rows.into_iter();
    let mut headers: Vec<String> = if options.has_headers {
        let Some(header_row) = rows.next() else {
            return Err(IngestError::Empty {
                path: source.to_path_buf(),
            });
        };
        dedupe_headers(header_row.iter().map(|value| normalize_header(value)).collect())
    } else {
        Vec::new()
    };

    let body: Vec<Vec<String>> = rows.collect();
    if !options.has_headers {
        let Some(first) = body.first() else {
            return Err(IngestError::Empty {
                path: source.to_path_buf(),
            });
        };
        headers = (0..first.len()).map(|idx| idx.to_string()).collect();
    }

    let skip = usize::from(options.index_column && !headers.is_empty());
    let mut columns: Vec<String> = headers.into_iter().skip(skip).collect();
    apply_positional_names(&mut columns, &options.positional, source)?;

    let mut records = RawRecordSet::new(columns);
    let width = records.columns().len();
    for row in body {
        let mut values: Vec<Value> = row
            .iter()
            .skip(skip)
            .map(|cell| Value::parse_with(cell, &options.na_values))
            .collect();
        if values.len() < width {
            values.resize(width, Value::Missing);
        }
        records.push_row(values)?;
    }

    debug!(
        source = %source.display(),
        rows = records.len(),
        columns = records.columns().len(),
        "csv ingested"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_header_collapses_whitespace() {
        assert_eq!(normalize_header("  Curr  add "), "Curr add");
        assert_eq!(normalize_header("\u{feff}ID"), "ID");
    }

    #[test]
    fn dedupe_headers_names_blank_and_repeated_columns() {
        let headers = dedupe_headers(vec![
            String::new(),
            "BAD".to_string(),
            "BAD".to_string(),
            "BAD".to_string(),
        ]);
        assert_eq!(headers, vec!["Unnamed: 0", "BAD", "BAD.1", "BAD.2"]);
    }

    #[test]
    fn reads_typed_cells_from_reader() {
        let data = "AGE,purpose,BAD\n30,A43,GOOD\n22,,BAD\n";
        let records = read_raw_records_from_reader(
            data.as_bytes(),
            Path::new("inline.csv"),
            &IngestOptions::default(),
        )
        .unwrap();

        assert_eq!(records.columns(), &["AGE", "purpose", "BAD"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records.value(0, "AGE"), Some(&Value::Number(30.0)));
        assert_eq!(records.value(0, "purpose"), Some(&Value::text("A43")));
        assert_eq!(records.value(1, "purpose"), Some(&Value::Missing));
        assert_eq!(records.value(1, "BAD"), Some(&Value::text("BAD")));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let data = "A,B,C\n1,2\n";
        let records = read_raw_records_from_reader(
            data.as_bytes(),
            Path::new("short.csv"),
            &IngestOptions::default(),
        )
        .unwrap();
        assert_eq!(records.value(0, "C"), Some(&Value::Missing));

        let data = "A,B\n1,2,3\n";
        let error = read_raw_records_from_reader(
            data.as_bytes(),
            Path::new("long.csv"),
            &IngestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, IngestError::Model(_)));
    }

    #[test]
    fn layout_na_values_decide_what_is_missing() {
        let data = "SEX,BAD\nNA,GOOD\n?,BAD\n";
        let strict = SourceLayout {
            na_values: Vec::new(),
            ..SourceLayout::default()
        };
        let records = read_raw_records_from_reader(
            data.as_bytes(),
            Path::new("canonical.csv"),
            &IngestOptions::try_from(&strict).unwrap(),
        )
        .unwrap();
        assert_eq!(records.value(0, "SEX"), Some(&Value::text("NA")));
        assert_eq!(records.value(1, "SEX"), Some(&Value::text("?")));

        let custom = SourceLayout {
            na_values: vec!["?".to_string()],
            ..SourceLayout::default()
        };
        let records = read_raw_records_from_reader(
            data.as_bytes(),
            Path::new("custom.csv"),
            &IngestOptions::try_from(&custom).unwrap(),
        )
        .unwrap();
        assert_eq!(records.value(0, "SEX"), Some(&Value::text("NA")));
        assert_eq!(records.value(1, "SEX"), Some(&Value::Missing));
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let layout = SourceLayout {
            delimiter: '§',
            ..SourceLayout::default()
        };
        let error = IngestOptions::try_from(&layout).unwrap_err();
        assert!(matches!(error, IngestError::Delimiter { delimiter: '§' }));

        let layout = SourceLayout {
            delimiter: '\t',
            ..SourceLayout::default()
        };
        assert_eq!(IngestOptions::try_from(&layout).unwrap().delimiter, b'\t');
    }

    #[test]
    fn empty_input_is_an_error() {
        let error =
            read_raw_records_from_reader("".as_bytes(), Path::new("empty.csv"), &IngestOptions::default())
                .unwrap_err();
        assert!(matches!(error, IngestError::Empty { .. }));
    }
}
