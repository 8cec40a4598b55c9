//! # Spreadsheet Data
//!
//! Records provided wholesale by the ingest service. The editor never parses
//! spreadsheets itself; it validates the file name before upload and decodes
//! the service's JSON answer:
//!
//! ```json
//! {"columns": ["name", "photo"], "preview": [{"name": "Ada", "photo": "..."}], "all_data": [...]}
//! ```
//!
//! Cell values arrive as arbitrary JSON and are normalised to trimmed strings.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DataMergeError;

/// One spreadsheet row: column name to cell text.
pub type Record = BTreeMap<String, String>;

/// Number of rows shown in the data preview table.
pub const PREVIEW_ROWS: usize = 5;

/// File extensions the ingest service accepts.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Column list plus preview and full record sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadsheetData {
    columns: Vec<String>,
    preview: Vec<Record>,
    rows: Vec<Record>,
}

impl SpreadsheetData {
    /// Build from a full record set; the preview is the first [`PREVIEW_ROWS`].
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        let preview = rows.iter().take(PREVIEW_ROWS).cloned().collect();
        Self {
            columns,
            preview,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Bounded head of the data, for display.
    pub fn preview(&self) -> &[Record] {
        &self.preview
    }

    /// Every record, for batch rendering.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// The record used for live box previews.
    pub fn first_record(&self) -> Option<&Record> {
        self.preview.first().or_else(|| self.rows.first())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.preview.is_empty() && self.rows.is_empty()
    }
}

/// Ingest service answer to a spreadsheet upload.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestResponse {
    pub columns: Vec<String>,
    #[serde(deserialize_with = "deserialize_records")]
    pub preview: Vec<Record>,
    /// Full record set; older endpoints only return the preview.
    #[serde(default, deserialize_with = "deserialize_optional_records")]
    pub all_data: Option<Vec<Record>>,
}

impl From<IngestResponse> for SpreadsheetData {
    fn from(resp: IngestResponse) -> Self {
        let rows = resp.all_data.unwrap_or_else(|| resp.preview.clone());
        SpreadsheetData {
            columns: resp.columns,
            preview: resp.preview,
            rows,
        }
    }
}

/// Reject files the ingest service cannot read, before uploading them.
pub fn validate_spreadsheet_file(file_name: &str) -> Result<(), DataMergeError> {
    if file_name.trim().is_empty() {
        return Err(DataMergeError::validation("Please select a file to upload"));
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(DataMergeError::validation("Please upload a CSV or Excel file"))
    }
}

/// Cell text: strings trimmed, `null` empty, everything else in JSON form.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn to_record(row: serde_json::Map<String, Value>) -> Record {
    row.iter().map(|(k, v)| (k.clone(), cell_text(v))).collect()
}

fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<serde_json::Map<String, Value>> = Vec::deserialize(deserializer)?;
    Ok(rows.into_iter().map(to_record).collect())
}

fn deserialize_optional_records<'de, D>(deserializer: D) -> Result<Option<Vec<Record>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Option<Vec<serde_json::Map<String, Value>>> = Option::deserialize(deserializer)?;
    Ok(rows.map(|rows| rows.into_iter().map(to_record).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_response_normalises_cells() {
        let json = r#"{
            "columns": ["name", "age", "vip", "note"],
            "preview": [{"name": "  Ada ", "age": 36, "vip": true, "note": null}]
        }"#;
        let resp: IngestResponse = serde_json::from_str(json).unwrap();
        let data = SpreadsheetData::from(resp);
        let first = data.first_record().unwrap();
        assert_eq!(first["name"], "Ada");
        assert_eq!(first["age"], "36");
        assert_eq!(first["vip"], "true");
        assert_eq!(first["note"], "");
    }

    #[test]
    fn test_rows_fall_back_to_preview() {
        let json = r#"{"columns": ["a"], "preview": [{"a": "1"}, {"a": "2"}]}"#;
        let data = SpreadsheetData::from(serde_json::from_str::<IngestResponse>(json).unwrap());
        assert_eq!(data.rows().len(), 2);
    }

    #[test]
    fn test_full_rows_kept_separately() {
        let json = r#"{
            "columns": ["a"],
            "preview": [{"a": "1"}],
            "all_data": [{"a": "1"}, {"a": "2"}, {"a": "3"}]
        }"#;
        let data = SpreadsheetData::from(serde_json::from_str::<IngestResponse>(json).unwrap());
        assert_eq!(data.preview().len(), 1);
        assert_eq!(data.rows().len(), 3);
    }

    #[test]
    fn test_new_bounds_preview() {
        let rows: Vec<Record> = (0..12)
            .map(|i| Record::from([("n".to_string(), i.to_string())]))
            .collect();
        let data = SpreadsheetData::new(vec!["n".to_string()], rows);
        assert_eq!(data.preview().len(), PREVIEW_ROWS);
        assert_eq!(data.rows().len(), 12);
        assert!(data.has_column("n"));
        assert!(!data.has_column("m"));
    }

    #[test]
    fn test_validate_spreadsheet_file() {
        assert!(validate_spreadsheet_file("people.csv").is_ok());
        assert!(validate_spreadsheet_file("People.XLSX").is_ok());
        assert!(validate_spreadsheet_file("old.xls").is_ok());
        let err = validate_spreadsheet_file("photo.png").unwrap_err();
        assert_eq!(err.to_string(), "Please upload a CSV or Excel file");
        assert!(validate_spreadsheet_file("").is_err());
    }
}
