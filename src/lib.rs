//! # Rusty Pairer
//!
//! Pairs source and target cell ranges of an Excel workbook and extracts them
//! as `(source, target)` records, for instance a column of terms next to a
//! column of their translations.
//!
//! ## Features
//!
//! - **Excel workbooks**: `.xlsx`, `.xlsm`, `.xltx` and `.xltm`, read directly from the OOXML parts
//! - **Range expressions**: columns such as `A`, `B-D` or `aa-ab` and rows such as `5` or `1-10`
//! - **Flexible shapes**: a pair only needs the same number of cells on both sides
//! - **Sheets by name or position**: every operation accepts either
//! - **JSON schema files**: save, load and optionally embed the last extracted data
//! - **Autosave**: every change can be written to an autosave file, or sent to a custom observer
//!
//! ## Example
//!
//! ```no_run
//! use rusty_pairer::{DataPairer, PairerOptions};
//!
//! let options = PairerOptions::default().with_autoload(true);
//! let mut pairer = DataPairer::new("books/translations.xlsx", options)?;
//! pairer.add_data_pair("Translations", "A", "1-3", "B", "1-3")?;
//! let data = pairer.get_all_data()?;
//! println!("{}", serde_json::to_string_pretty(&data)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessor;
pub mod error;
mod helpers;
pub mod options;
pub mod pairer;
pub mod range;
pub mod registry;
pub mod schema;
mod spreadsheet;
pub mod store;

pub use accessor::SheetAccessor;
pub use accessor::SheetId;
pub use error::PairerError;
pub use options::PairerOptions;
pub use pairer::list_excel_files;
pub use pairer::select_excel_file;
pub use pairer::DataPairer;
pub use pairer::FileSelector;
pub use range::CellRange;
pub use range::Coordinate;
pub use range::RangeError;
pub use range::MAX_RANGE_CELLS;
pub use range::Span;
pub use schema::DataPair;
pub use schema::FileSchema;
pub use schema::Record;
pub use schema::SchemaError;
pub use schema::SheetRecords;
pub use schema::SheetSchema;
pub use spreadsheet::cell::CellValue;
pub use spreadsheet::is_supported;
pub use spreadsheet::SpreadsheetError;
pub use spreadsheet::SUPPORTED_EXTENSIONS;
pub use store::FileAutosave;
pub use store::SchemaObserver;
