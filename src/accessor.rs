//! Reads cell values from one workbook by sheet name or position.
//!
//! The workbook is opened for the duration of each call and closed when the
//! call returns, so no handle outlives an operation.

use crate::error::PairerError;
use crate::range::CellRange;
use crate::range::Coordinate;
use crate::spreadsheet;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::sheet::Window;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

/// A sheet given by name or by 0-based position in the workbook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetId {
    Name(String),
    Index(usize),
}

impl From<&str> for SheetId {
    fn from(name: &str) -> Self {
        SheetId::Name(name.to_owned())
    }
}

impl From<String> for SheetId {
    fn from(name: String) -> Self {
        SheetId::Name(name)
    }
}

impl From<&String> for SheetId {
    fn from(name: &String) -> Self {
        SheetId::Name(name.to_owned())
    }
}

impl From<usize> for SheetId {
    fn from(index: usize) -> Self {
        SheetId::Index(index)
    }
}

impl Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetId::Name(name) => write!(f, "{name}"),
            SheetId::Index(index) => write!(f, "#{index}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SheetAccessor {
    path: PathBuf,
}

impl SheetAccessor {
    /// Fails when the workbook does not exist or has an unsupported extension.
    pub fn new(path: impl AsRef<Path>) -> Result<SheetAccessor, PairerError> {
        let path = path.as_ref();
        if !path.is_file() {
            Err(SpreadsheetError::FileNotFound { path: path.display().to_string() })?;
        }
        if !spreadsheet::is_supported(path) {
            Err(SpreadsheetError::InvalidFileFormat {
                name: path.display().to_string(),
                message: "unsupported file extension".to_owned(),
            })?;
        }
        Ok(SheetAccessor { path: path.to_owned() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Result<Vec<String>, PairerError> {
        Ok(spreadsheet::open(&self.path)?.sheet_names())
    }

    /// Name of the sheet `id` refers to.
    pub fn resolve(&self, id: &SheetId) -> Result<String, PairerError> {
        let spreadsheet = spreadsheet::open(&self.path)?;
        resolve_in(spreadsheet.as_ref(), id)
    }

    /// Values at `coordinates`, in the same order.
    pub fn read(&self, id: &SheetId, coordinates: &[Coordinate]) -> Result<Vec<CellValue>, PairerError> {
        let mut groups = self.read_groups(id, &[coordinates])?;
        Ok(groups.pop().unwrap_or_default())
    }

    /// Values of a range in row-major order.
    pub fn read_range(&self, id: &SheetId, range: &CellRange) -> Result<Vec<CellValue>, PairerError> {
        self.read(id, &range.coordinates())
    }

    /// Values of several ranges of one sheet, opening the workbook once.
    pub fn read_ranges(&self, id: &SheetId, ranges: &[&CellRange]) -> Result<Vec<Vec<CellValue>>, PairerError> {
        let coordinates: Vec<Vec<Coordinate>> = ranges.iter().map(|range| range.coordinates()).collect();
        let groups: Vec<&[Coordinate]> = coordinates.iter().map(Vec::as_slice).collect();
        self.read_groups(id, &groups)
    }

    fn read_groups(&self, id: &SheetId, groups: &[&[Coordinate]]) -> Result<Vec<Vec<CellValue>>, PairerError> {
        let mut spreadsheet = spreadsheet::open(&self.path)?;
        let name = resolve_in(spreadsheet.as_ref(), id)?;
        let window = Window::covering(groups.iter().copied().flatten());
        debug!("Reading {} range(s) from sheet '{}' within {:?}", groups.len(), name, window);

        let sheet = spreadsheet.load_sheet(&name, window)?;
        groups
            .iter()
            .map(|group| group.iter().map(|coordinate| sheet.value_at(coordinate)).collect())
            .collect()
    }
}

fn resolve_in(spreadsheet: &dyn Spreadsheet, id: &SheetId) -> Result<String, PairerError> {
    let names = spreadsheet.sheet_names();
    let found = match id {
        SheetId::Name(name) => names.iter().find(|candidate| *candidate == name),
        SheetId::Index(index) => names.get(*index),
    };
    match found {
        Some(name) => Ok(name.to_owned()),
        None => Err(SpreadsheetError::SheetNotFound {
            file: spreadsheet.name(),
            sheet: id.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing;
    use crate::spreadsheet::testing::WorkbookBuilder;

    fn texts(values: &[CellValue]) -> Vec<&str> {
        values.iter().map(|value| value.as_str().unwrap_or("")).collect()
    }

    #[test]
    fn missing_workbook() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SheetAccessor::new(dir.path().join("nothing.xlsx")).err().unwrap(),
            PairerError::SpreadsheetError(SpreadsheetError::FileNotFound { .. })
        ));
    }

    #[test]
    fn resolves_names_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let accessor = SheetAccessor::new(testing::translations(dir.path())).unwrap();
        assert_eq!(accessor.sheet_names().unwrap(), vec!["Translations", "Notes"]);
        assert_eq!(accessor.resolve(&SheetId::from("Notes")).unwrap(), "Notes");
        assert_eq!(accessor.resolve(&SheetId::Index(0)).unwrap(), "Translations");

        for id in [SheetId::from("Missing"), SheetId::Index(2)] {
            let error = accessor.resolve(&id).unwrap_err();
            assert!(
                matches!(error, PairerError::SpreadsheetError(SpreadsheetError::SheetNotFound { .. })),
                "{error}"
            );
        }
    }

    #[test]
    fn reads_in_requested_order() {
        let dir = tempfile::tempdir().unwrap();
        let accessor = SheetAccessor::new(testing::translations(dir.path())).unwrap();
        let values = accessor
            .read(
                &SheetId::from("Translations"),
                &[Coordinate::new(2, 3), Coordinate::new(1, 1), Coordinate::new(2, 1)],
            )
            .unwrap();
        assert_eq!(texts(&values), vec!["soleil", "cat", "chat"]);
    }

    #[test]
    fn reads_ranges_with_one_open() {
        let dir = tempfile::tempdir().unwrap();
        let accessor = SheetAccessor::new(testing::translations(dir.path())).unwrap();
        let english = CellRange::parse("A", "1-3").unwrap();
        let french = CellRange::parse("B", "1-3").unwrap();
        let values = accessor.read_ranges(&SheetId::Index(0), &[&english, &french]).unwrap();
        assert_eq!(texts(&values[0]), vec!["cat", "dog", "sun"]);
        assert_eq!(texts(&values[1]), vec!["chat", "chien", "soleil"]);
    }

    #[test]
    fn beyond_the_populated_extent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let accessor = SheetAccessor::new(testing::translations(dir.path())).unwrap();
        let range = CellRange::parse("A-B", "3-4").unwrap();
        let values = accessor.read_range(&SheetId::from("Translations"), &range).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::from("sun"),
                CellValue::from("soleil"),
                CellValue::Empty,
                CellValue::Empty,
            ]
        );

        let far = CellRange::parse("XFD", "1048576").unwrap();
        assert_eq!(accessor.read_range(&SheetId::from("Notes"), &far).unwrap(), vec![CellValue::Empty]);
    }

    #[test]
    fn empty_sheet_reads_empty_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = WorkbookBuilder::new().sheet("Blank", &[]).write(dir.path(), "blank.xlsm");
        let accessor = SheetAccessor::new(path).unwrap();
        let range = CellRange::parse("A-B", "1").unwrap();
        assert_eq!(
            accessor.read_range(&SheetId::from("Blank"), &range).unwrap(),
            vec![CellValue::Empty, CellValue::Empty]
        );
    }

    #[test]
    fn out_of_range_date_names_the_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = WorkbookBuilder::new()
            .sheet("S", &[r#"<c r="A1" s="1"><v>99999999</v></c>"#, r#"<c r="A2" s="1"><v>45322</v></c>"#])
            .write(dir.path(), "dates.xlsx");
        let accessor = SheetAccessor::new(path).unwrap();

        let error = accessor.read_range(&SheetId::from("S"), &CellRange::parse("A", "1").unwrap()).unwrap_err();
        assert!(
            matches!(&error, PairerError::SpreadsheetError(SpreadsheetError::InvalidCellValue { reference, .. }) if reference == "A1"),
            "{error}"
        );
        assert_eq!(
            accessor.read_range(&SheetId::from("S"), &CellRange::parse("A", "2").unwrap()).unwrap(),
            vec![CellValue::from("2024-01-31")]
        );
    }
}
