//! JSON schema file model.
//!
//! ```json
//! {
//!   "version": 1,
//!   "filePath": "books/example.xlsx",
//!   "sheets": [
//!     {
//!       "sheetId": "Translations",
//!       "pairs": [
//!         { "srcColumns": "A", "srcRows": "1-3", "tgtColumns": "B", "tgtRows": "1-3" }
//!       ]
//!     }
//!   ],
//!   "data": [
//!     { "sheetId": "Translations", "pairs": [[{ "source": "cat", "target": "chat" }]] }
//!   ]
//! }
//! ```
//!
//! `data` is optional; each inner list holds the records of the pair at the same index.

use crate::spreadsheet::cell::CellValue;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The only schema version written and accepted.
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Source range {source_range} has {source_cells} cell(s) but target range {target_range} has {target_cells}")]
    ShapeMismatch {
        source_range: String,
        source_cells: usize,
        target_range: String,
        target_cells: usize,
    },

    #[error("Sheet '{sheet}' is already in the schema")]
    DuplicateSheet { sheet: String },

    #[error("Sheet '{sheet}' has no data pair #{index} ({count} defined)")]
    PairNotFound { sheet: String, index: usize, count: usize },

    #[error("Sheet '{sheet}' is not in the schema")]
    SheetNotInSchema { sheet: String },

    #[error("Schema file '{path}' does not exist")]
    FileNotFound { path: String },

    #[error("Unrecognized schema in '{path}': {message}")]
    UnrecognizedSchema { path: String, message: String },

    #[error("Unsupported schema version {version} in '{path}', only version 1 is supported")]
    UnsupportedVersion { path: String, version: u64 },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileSchema {
    pub version: u64,
    /// Workbook path as given at construction
    pub file_path: String,
    pub sheets: Vec<SheetSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SheetRecords>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SheetSchema {
    pub sheet_id: String,
    pub pairs: Vec<DataPair>,
}

/// Range expressions of one data pair, kept as entered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataPair {
    pub src_columns: String,
    pub src_rows: String,
    pub tgt_columns: String,
    pub tgt_rows: String,
}

/// One matched source and target value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Record {
    pub source: CellValue,
    pub target: CellValue,
}

impl Record {
    pub fn new(source: impl Into<CellValue>, target: impl Into<CellValue>) -> Self {
        Record {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Extracted records of one sheet, one list per data pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SheetRecords {
    pub sheet_id: String,
    pub pairs: Vec<Vec<Record>>,
}
