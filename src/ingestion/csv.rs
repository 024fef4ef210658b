//! CSV reading.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::PipelineResult;
use crate::types::{DataSet, Schema, Value};

/// Read a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - With `headers`, the first record supplies the column labels; otherwise columns are labelled
///   by position (`"0"`, `"1"`, ...).
/// - Every record must have the same number of cells.
/// - Empty cells become [`Value::Null`]; cells that parse as integers or floats become
///   [`Value::Int64`] / [`Value::Float64`]; anything else is kept verbatim as [`Value::Utf8`].
pub fn read_csv_from_path(path: impl AsRef<Path>, headers: bool) -> PipelineResult<DataSet> {
    let path = path.as_ref();
    let rdr = csv::ReaderBuilder::new().has_headers(headers).from_path(path)?;
    let dataset = read_records(rdr)?;
    debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "read csv"
    );
    Ok(dataset)
}

/// Read CSV data from any reader, with the same rules as [`read_csv_from_path`].
pub fn read_csv_from_reader<R: Read>(reader: R, headers: bool) -> PipelineResult<DataSet> {
    let rdr = csv::ReaderBuilder::new().has_headers(headers).from_reader(reader);
    read_records(rdr)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>) -> PipelineResult<DataSet> {
    let labels = if rdr.has_headers() {
        Some(rdr.headers()?.iter().map(str::to_owned).collect::<Vec<_>>())
    } else {
        None
    };

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    let schema = match labels {
        Some(labels) => Schema::new(labels),
        None => Schema::positional(rows.first().map_or(0, Vec::len)),
    };
    Ok(DataSet::new(schema, rows))
}

fn parse_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::Int64(v);
    }
    // Rust accepts "inf"/"nan"; only treat digit-bearing text as a number.
    if trimmed.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(v) = trimmed.parse::<f64>() {
            return Value::Float64(v);
        }
    }
    Value::Utf8(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{parse_cell, read_csv_from_reader};
    use crate::error::PipelineError;
    use crate::types::Value;

    #[test]
    fn cells_are_typed_individually() {
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("42"), Value::Int64(42));
        assert_eq!(parse_cell("-4.50"), Value::Float64(-4.5));
        assert_eq!(parse_cell(" 7 "), Value::Int64(7));
        assert_eq!(parse_cell("nan"), Value::from("nan"));
        assert_eq!(parse_cell(" Obi-wan "), Value::from(" Obi-wan "));
        assert_eq!(parse_cell("01/05/2024"), Value::from("01/05/2024"));
    }

    #[test]
    fn headers_become_labels() {
        let ds = read_csv_from_reader("date,amount\n2024-01-05,-12.5\n2024-01-06,3\n".as_bytes(), true)
            .unwrap();
        assert_eq!(ds.schema.columns, vec!["date".to_string(), "amount".to_string()]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[1][1], Value::Int64(3));
    }

    #[test]
    fn headerless_input_uses_positional_labels() {
        let ds = read_csv_from_reader("a,,1\nb,x,2\n".as_bytes(), false).unwrap();
        assert_eq!(ds.schema.columns, vec!["0", "1", "2"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[0][1], Value::Null);
    }

    #[test]
    fn header_only_input_has_no_rows() {
        let ds = read_csv_from_reader("a,b\n".as_bytes(), true).unwrap();
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.row_count(), 0);
    }

    #[test]
    fn ragged_records_fail() {
        let err = read_csv_from_reader("a,b\n1,2\n3\n".as_bytes(), true).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }
}
