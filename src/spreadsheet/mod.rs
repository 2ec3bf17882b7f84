//! # Workbook Reading
//!
//! Reads cell values out of Office Open XML workbooks (`.xlsx`, `.xlsm`,
//! `.xltx`, `.xltm`). A workbook is a zip package: the sheet list comes from
//! the workbook part and its relationships, number formats from the styles part
//! (to tell dates from plain numbers), and strings either from the shared
//! string table or inline in the worksheet.
//!
//! Only the cells inside a requested window are materialized, and only the
//! shared strings those cells reference are decoded.
pub(crate) mod cell;
mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
mod xlsx;

use crate::error::PairerError;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::sheet::Window;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use log::debug;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// File extensions of the workbooks that can be opened, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xltx", "xltm"];

pub(crate) type FileReader = BufReader<File>;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Workbook '{path}' does not exist")]
    FileNotFound { path: String },

    #[error("Cannot open '{name}' as an Excel workbook: {message}")]
    InvalidFileFormat { name: String, message: String },

    #[error("Workbook '{name}' is password protected")]
    PasswordProtected { name: String },

    #[error("Workbook '{name}' contains no worksheets")]
    EmptySpreadsheet { name: String },

    #[error("Workbook part '{part}' is missing")]
    MissingPart { part: String },

    #[error("Sheet '{sheet}' not found in '{file}'")]
    SheetNotFound { file: String, sheet: String },

    #[error("Invalid cell value at '{sheet}'!{reference} in '{file}': {message}")]
    InvalidCellValue {
        file: String,
        sheet: String,
        reference: String,
        message: String,
    },
}

/// An open workbook.
pub(crate) trait Spreadsheet {
    /// File name of the workbook
    fn name(&self) -> String;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Shared strings, all of them or only `indexes`, with a map from
    /// shared string index to position in the returned list.
    fn load_shared_strings(&mut self, indexes: Option<HashSet<usize>>) -> Result<(Vec<String>, HashMap<usize, usize>), PairerError>;

    /// Raw cells of one sheet inside `window`; shared strings are left unresolved.
    fn read_sheet(&mut self, name: &str, window: Option<Window>) -> Result<Sheet, PairerError>;

    /// Cells of one sheet inside `window` with their shared strings resolved.
    fn load_sheet(&mut self, name: &str, window: Option<Window>) -> Result<Sheet, PairerError> {
        let mut sheet = self.read_sheet(name, window)?;
        let ids: HashSet<usize> = sheet.shared_string_ids()?.into_iter().collect();
        if !ids.is_empty() {
            debug!("Loading {} shared string(s) for sheet '{}'", ids.len(), name);
            let (strings, mappings) = self.load_shared_strings(Some(ids))?;
            sheet.resolve_shared_strings(&strings, &mappings)?;
        }
        Ok(sheet)
    }
}

/// True when `path` has one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| SUPPORTED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Opens a workbook, choosing the reader by file extension.
pub(crate) fn open(path: &Path) -> Result<Box<dyn Spreadsheet>, PairerError> {
    if !path.is_file() {
        Err(SpreadsheetError::FileNotFound { path: path.display().to_string() })?;
    }
    if !is_supported(path) {
        Err(SpreadsheetError::InvalidFileFormat {
            name: path.display().to_string(),
            message: format!("expected one of the extensions {}", SUPPORTED_EXTENSIONS.join(", ")),
        })?;
    }
    debug!("Opening workbook '{}'", path.display());
    Ok(Box::new(XlsxSpreadsheet::open(path)?))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Coordinate;
    use crate::spreadsheet::cell::CellValue;
    use crate::spreadsheet::testing;

    #[test]
    fn supported_extensions() {
        assert!(is_supported(Path::new("book.xlsx")));
        assert!(is_supported(Path::new("dir/Book.XLSM")));
        assert!(is_supported(Path::new("template.xltx")));
        assert!(!is_supported(Path::new("legacy.xls")));
        assert!(!is_supported(Path::new("calc.ods")));
        assert!(!is_supported(Path::new("noextension")));
    }

    #[test]
    fn open_checks_path_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open(&dir.path().join("missing.xlsx")).err().unwrap(),
            PairerError::SpreadsheetError(SpreadsheetError::FileNotFound { .. })
        ));

        let legacy = dir.path().join("legacy.xls");
        std::fs::write(&legacy, b"").unwrap();
        assert!(matches!(
            open(&legacy).err().unwrap(),
            PairerError::SpreadsheetError(SpreadsheetError::InvalidFileFormat { .. })
        ));
    }

    #[test]
    fn load_sheet_resolves_shared_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = testing::translations(dir.path());
        let mut spreadsheet = open(&path).unwrap();
        assert_eq!(spreadsheet.sheet_names(), vec!["Translations", "Notes"]);

        let coordinates = [Coordinate::new(1, 1), Coordinate::new(3, 3)];
        let sheet = spreadsheet.load_sheet("Translations", Window::covering(&coordinates)).unwrap();
        let value = |column, row| sheet.value_at(&Coordinate::new(column, row)).unwrap();
        assert_eq!(value(1, 1), CellValue::from("cat"));
        assert_eq!(value(1, 3), CellValue::from("sun"));
        assert_eq!(value(2, 2), CellValue::from("chien"));
        assert_eq!(value(3, 1), CellValue::from("2024-01-31"));
        assert_eq!(value(3, 2), CellValue::Empty);
    }
}
