//! CSV file reader with type inference

use crate::reader::{DataReader, IoError, IoResult};
use crate::schema::{ColumnDescriptor, ColumnType, DataSchema};
use crate::table::{Column, ColumnData, Dataset};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Cell texts treated as missing values
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// CSV file reader
///
/// The file is parsed once on open; the schema is inferred from every row so
/// that a late non-numeric cell demotes the column to categorical instead of
/// being silently dropped.
pub struct CsvReader {
    path: Option<String>,
    name: String,
    schema: DataSchema,
    records: Vec<Vec<String>>,
    metadata: HashMap<String, String>,
}

impl CsvReader {
    /// Open a CSV file
    pub fn open(path: &str) -> IoResult<Self> {
        Self::open_with_options(path, b',', true)
    }

    /// Open a CSV file with options
    pub fn open_with_options(path: &str, delimiter: u8, has_header: bool) -> IoResult<Self> {
        if !Path::new(path).exists() {
            return Err(IoError::FileNotFound(path.to_string()));
        }

        let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
        let name = Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        let mut reader = Self::parse(BufReader::new(file), name, delimiter, has_header)?;
        reader.path = Some(path.to_string());
        Ok(reader)
    }

    /// Parse CSV text held in memory
    pub fn from_text(
        name: impl Into<String>,
        text: &str,
        delimiter: u8,
        has_header: bool,
    ) -> IoResult<Self> {
        Self::parse(text.as_bytes(), name.into(), delimiter, has_header)
    }

    fn parse<R: Read>(
        source: R,
        name: String,
        delimiter: u8,
        has_header: bool,
    ) -> IoResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(has_header)
            .from_reader(source);

        let mut records: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| IoError::InvalidFormat(e.to_string()))?;
            records.push(record.iter().map(|s| s.trim().to_string()).collect());
        }

        let headers = if has_header {
            reader
                .headers()
                .map_err(|e| IoError::InvalidFormat(e.to_string()))?
                .iter()
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>()
        } else {
            // Generate column names
            let width = records.first().map(|r| r.len()).unwrap_or(0);
            (0..width).map(|i| format!("col_{}", i)).collect()
        };

        let schema = Self::infer_schema(&headers, &records)?;

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), "CSV".to_string());
        metadata.insert("delimiter".to_string(), (delimiter as char).to_string());

        Ok(Self {
            path: None,
            name,
            schema,
            records,
            metadata,
        })
    }

    fn infer_schema(headers: &[String], records: &[Vec<String>]) -> IoResult<DataSchema> {
        let mut seen = std::collections::HashSet::new();
        for header in headers {
            if !seen.insert(header.as_str()) {
                return Err(IoError::DuplicateColumn(header.clone()));
            }
        }

        let columns: Vec<ColumnDescriptor> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<&str> = records
                    .iter()
                    .map(|r| r.get(i).map(|s| s.as_str()).unwrap_or(""))
                    .collect();
                ColumnDescriptor::new(name.clone(), infer_type(&values))
            })
            .collect();

        Ok(DataSchema::new(columns, records.len()))
    }

    fn column_at(&self, index: usize) -> IoResult<Column> {
        let desc = &self.schema.columns[index];
        let values: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.get(index).map(|s| s.as_str()).unwrap_or(""))
            .collect();
        Column::new(desc.name.clone(), desc.dtype, parse_column(&values, desc.dtype))
    }
}

impl DataReader for CsvReader {
    fn read_schema(&self) -> IoResult<DataSchema> {
        Ok(self.schema.clone())
    }

    fn read_column(&self, name: &str) -> IoResult<Column> {
        let col_index = self
            .schema
            .column_index(name)
            .ok_or_else(|| IoError::ColumnNotFound(name.to_string()))?;
        self.column_at(col_index)
    }

    fn read_dataset(&self) -> IoResult<Dataset> {
        let columns = (0..self.schema.num_columns())
            .map(|i| self.column_at(i))
            .collect::<IoResult<Vec<_>>>()?;
        Dataset::from_columns(self.name.clone(), columns)
    }

    fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// Infer column type from its values
fn infer_type(values: &[&str]) -> ColumnType {
    let non_empty: Vec<&str> = values.iter().copied().filter(|s| !is_missing(s)).collect();
    if non_empty.is_empty() {
        return ColumnType::String;
    }

    // Try parsing as integers
    if non_empty.iter().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnType::Int64;
    }

    // Try parsing as floats
    if non_empty
        .iter()
        .all(|s| s.parse::<f64>().map(|x| x.is_finite()).unwrap_or(false))
    {
        return ColumnType::Float64;
    }

    // Try parsing as booleans
    if non_empty.iter().all(|s| {
        matches!(
            s.to_lowercase().as_str(),
            "true" | "false" | "yes" | "no"
        )
    }) {
        return ColumnType::Bool;
    }

    ColumnType::String
}

/// Parse column values into column data
fn parse_column(values: &[&str], dtype: ColumnType) -> ColumnData {
    match dtype {
        ColumnType::Int64 | ColumnType::Float64 => ColumnData::Numeric(
            values
                .iter()
                .map(|s| {
                    if is_missing(s) {
                        None
                    } else {
                        s.parse::<f64>().ok()
                    }
                })
                .collect(),
        ),
        ColumnType::Bool => ColumnData::Categorical(
            values
                .iter()
                .map(|s| {
                    if is_missing(s) {
                        None
                    } else {
                        let truthy = matches!(s.to_lowercase().as_str(), "true" | "yes");
                        Some(truthy.to_string())
                    }
                })
                .collect(),
        ),
        ColumnType::String => ColumnData::Categorical(
            values
                .iter()
                .map(|s| {
                    if is_missing(s) {
                        None
                    } else {
                        Some(s.to_string())
                    }
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_type_int() {
        assert_eq!(infer_type(&["1", "2", "3"]), ColumnType::Int64);
    }

    #[test]
    fn test_infer_type_float() {
        assert_eq!(infer_type(&["1.5", "2", "3.14"]), ColumnType::Float64);
    }

    #[test]
    fn test_infer_type_bool() {
        assert_eq!(infer_type(&["true", "false", "yes"]), ColumnType::Bool);
    }

    #[test]
    fn test_infer_type_string() {
        assert_eq!(infer_type(&["hello", "world"]), ColumnType::String);
    }

    #[test]
    fn test_missing_markers_ignored_for_inference() {
        assert_eq!(infer_type(&["1", "", "NA", "4"]), ColumnType::Int64);
        assert_eq!(infer_type(&["", "NA"]), ColumnType::String);
    }

    #[test]
    fn test_from_text_reads_dataset() {
        let text = "score,group,other\n1.5,a,3\n2.5,b,\n,a,5\n";
        let reader = CsvReader::from_text("inline", text, b',', true).unwrap();
        let ds = reader.read_dataset().unwrap();

        assert_eq!(ds.name(), "inline");
        assert_eq!(ds.num_rows(), 3);
        let score = ds.column("score").unwrap();
        assert!(score.is_numeric());
        assert_eq!(score.observation_count(), 2);
        assert!(!ds.column("group").unwrap().is_numeric());
        assert_eq!(ds.column("other").unwrap().dtype(), ColumnType::Int64);
    }

    #[test]
    fn test_late_text_demotes_column() {
        let text = "v\n1\n2\nthree\n";
        let reader = CsvReader::from_text("t", text, b',', true).unwrap();
        let schema = reader.read_schema().unwrap();
        assert_eq!(schema.columns[0].dtype, ColumnType::String);
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let text = "a,a\n1,2\n";
        assert!(matches!(
            CsvReader::from_text("t", text, b',', true),
            Err(IoError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_headerless_names() {
        let reader = CsvReader::from_text("t", "1,2\n3,4\n", b',', false).unwrap();
        let schema = reader.read_schema().unwrap();
        assert_eq!(schema.column_names(), vec!["col_0", "col_1"]);
        assert_eq!(schema.num_records, 2);
    }
}
