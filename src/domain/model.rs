use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single result row as returned by the portal, keyed by field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

/// One column entry of the raw dataset metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub field_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_type_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw metadata response for a dataset. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

/// Normalized per-column metadata, in source order, for display/export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub field_name: String,
    pub column_name: String,
    pub description: Option<String>,
    pub data_type: String,
}

/// field_name -> declared data type, derived once per query.
pub type TypeMap = HashMap<String, String>;

/// Rectangular result table: every row shares the same column set.
/// Columns absent from a row's map read as null.
#[derive(Debug, Clone, Default)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

/// Output of the extract stage: metadata plus untouched result rows.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub metadata: DatasetMetadata,
    pub records: Vec<Record>,
}

/// Output of the transform stage, ready for the load stage.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub metadata: Vec<ColumnMeta>,
    pub table: FlatTable,
    pub results_csv: String,
    pub metadata_csv: String,
}
