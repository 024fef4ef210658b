use dt::ingestion::{discover_csv_paths, read_csv_from_path, read_csv_from_reader};
use dt::types::Value;
use dt::PipelineError;

#[test]
fn read_csv_with_headers() {
    let ds = read_csv_from_path("tests/fixtures/checking.csv", true).unwrap();

    assert_eq!(
        ds.schema.columns,
        vec!["Posting Date", "Description", "Amount", "Balance"]
    );
    assert_eq!(ds.row_count(), 4);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::from("01/05/2024"),
            Value::from("  COFFEE SHOP #12  "),
            Value::Float64(-4.5),
            Value::Float64(995.5),
        ]
    );
    assert_eq!(ds.rows[2][2], Value::Int64(-60));
    assert_eq!(ds.rows[3][1], Value::Null);
}

#[test]
fn read_csv_without_headers_labels_by_position() {
    let ds = read_csv_from_path("tests/fixtures/card_noheader.csv", false).unwrap();

    assert_eq!(ds.schema.columns, vec!["0", "1", "2", "3"]);
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.rows[1][2], Value::Float64(-19.99));
}

#[test]
fn header_flag_changes_first_row_meaning() {
    let as_data = read_csv_from_path("tests/fixtures/checking.csv", false).unwrap();
    assert_eq!(as_data.row_count(), 5);
    assert_eq!(as_data.rows[0][0], Value::from("Posting Date"));
}

#[test]
fn missing_file_is_io_error() {
    let err = read_csv_from_path("tests/fixtures/does_not_exist.csv", true).unwrap_err();
    assert!(matches!(err, PipelineError::Csv(_) | PipelineError::Io(_)), "{err}");
}

#[test]
fn quoted_fields_keep_embedded_commas() {
    let input = "date,description\n2024-01-01,\"Coffee, large\"\n";
    let ds = read_csv_from_reader(input.as_bytes(), true).unwrap();
    assert_eq!(ds.rows[0][1], Value::from("Coffee, large"));
}

#[test]
fn fixture_directory_discovery_finds_only_csv_files() {
    let found = discover_csv_paths(&["tests/fixtures"]).unwrap();
    let names = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["card_noheader.csv", "checking.csv"]);
}
