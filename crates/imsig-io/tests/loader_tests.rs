//! File loading integration tests

use imsig_io::{load_dataset, open_file, ColumnKind, IoError};
use std::io::Write;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_load_csv_by_extension() {
    let file = write_temp(
        ".csv",
        "before,after,treatment\n5,6,a\n7,7,b\n8,10,a\n6,NA,c\n",
    );
    let path = file.path().to_str().unwrap();

    let reader = open_file(path).unwrap();
    assert_eq!(reader.format_name(), "CSV");
    assert_eq!(reader.path(), Some(path));

    let ds = load_dataset(path).unwrap();
    assert_eq!(ds.num_columns(), 3);
    assert_eq!(ds.num_rows(), 4);
    assert_eq!(ds.column("before").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(ds.column("after").unwrap().observation_count(), 3);
    assert_eq!(ds.column("treatment").unwrap().kind(), ColumnKind::Categorical);
    assert_eq!(ds.column("treatment").unwrap().distinct_count(), 3);
}

#[test]
fn test_load_tsv_uses_tab_delimiter() {
    let file = write_temp(".tsv", "x\ty\n1\t2\n3\t4\n");
    let ds = load_dataset(file.path().to_str().unwrap()).unwrap();
    assert_eq!(ds.column_names(), vec!["x", "y"]);
    assert_eq!(ds.column("y").unwrap().numeric_values(), Some(vec![2.0, 4.0]));
}

#[test]
fn test_missing_file() {
    let result = load_dataset("/definitely/not/here.csv");
    assert!(matches!(result, Err(IoError::FileNotFound(_))));
}

#[test]
fn test_read_single_column() {
    let file = write_temp(".csv", "a,b\n1,x\n2,y\n");
    let reader = open_file(file.path().to_str().unwrap()).unwrap();
    let column = reader.read_column("a").unwrap();
    assert_eq!(column.numeric_values(), Some(vec![1.0, 2.0]));
    assert!(matches!(
        reader.read_column("c"),
        Err(IoError::ColumnNotFound(_))
    ));
}
