use crate::error::PairerError;
use crate::range::Coordinate;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashMap;

/// The part of a worksheet to materialize, 0-based and inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) row_lower_bound: usize,
    pub(crate) row_upper_bound: usize,
    pub(crate) col_lower_bound: usize,
    pub(crate) col_upper_bound: usize,
}

impl Window {
    /// Smallest window containing every coordinate, `None` when there are none.
    pub(crate) fn covering<'a>(coordinates: impl IntoIterator<Item = &'a Coordinate>) -> Option<Window> {
        coordinates.into_iter().fold(None, |window: Option<Window>, coordinate| {
            let (row, col) = (coordinate.row - 1, coordinate.column - 1);
            Some(match window {
                None => Window {
                    row_lower_bound: row,
                    row_upper_bound: row,
                    col_lower_bound: col,
                    col_upper_bound: col,
                },
                Some(window) => Window {
                    row_lower_bound: window.row_lower_bound.min(row),
                    row_upper_bound: window.row_upper_bound.max(row),
                    col_lower_bound: window.col_lower_bound.min(col),
                    col_upper_bound: window.col_upper_bound.max(col),
                },
            })
        })
    }
}

/// Cells read from one worksheet, restricted to a window.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Requested window; `None` reads nothing
    window: Option<Window>,
    cells: Vec<Cell>,
    /// (row, col) to position in `cells`
    indexes: HashMap<(usize, usize), usize>,
}

impl Sheet {
    pub(crate) fn new(file_name: &str, name: &str, window: Option<Window>) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            window,
            cells: Vec::new(),
            indexes: HashMap::new(),
        }
    }

    /// Number of populated cells kept.
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    /// True once `row` lies below the window; rows arrive in order so reading can stop.
    pub(crate) fn after_row_upper_bound(&self, row: usize) -> bool {
        self.window
            .map(|window| window.row_upper_bound < row)
            .unwrap_or(true)
    }

    pub(crate) fn contains(&self, row: usize, col: usize) -> bool {
        self.window
            .map(|window| {
                window.row_lower_bound <= row
                    && row <= window.row_upper_bound
                    && window.col_lower_bound <= col
                    && col <= window.col_upper_bound
            })
            .unwrap_or(false)
    }

    /// Adds a cell; a later cell at the same position replaces the earlier one.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.indexes.insert((cell.row, cell.col), self.cells.len());
        self.cells.push(cell);
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.indexes.get(&(row, col)).and_then(|index| self.cells.get(*index))
    }

    /// Shared string indexes referenced by the kept cells.
    pub(crate) fn shared_string_ids(&self) -> Result<Vec<usize>, PairerError> {
        let mut ids = Vec::new();
        for cell in self.cells.iter().filter(|cell| cell.kind == CellType::SharedString) {
            ids.push(cell.value.trim().parse::<usize>()?);
        }
        Ok(ids)
    }

    /// Replaces shared string indexes with their text.
    /// `mappings` maps a shared string index to its position in `strings`.
    pub(crate) fn resolve_shared_strings(&mut self, strings: &[String], mappings: &HashMap<usize, usize>) -> Result<(), PairerError> {
        for cell in self.cells.iter_mut().filter(|cell| cell.kind == CellType::SharedString) {
            let id = cell.value.trim().parse::<usize>()?;
            let text = mappings
                .get(&id)
                .and_then(|position| strings.get(*position))
                .ok_or_else(|| SpreadsheetError::InvalidCellValue {
                    file: self.file_name.to_owned(),
                    sheet: self.name.to_owned(),
                    reference: cell.reference(),
                    message: format!("shared string #{id} does not exist"),
                })?;
            cell.value = text.to_owned();
            cell.kind = CellType::InlineString;
        }
        Ok(())
    }

    /// Value at a 1-based coordinate. Anything not populated, including
    /// positions outside the populated extent, reads as [`CellValue::Empty`].
    pub(crate) fn value_at(&self, coordinate: &Coordinate) -> Result<CellValue, PairerError> {
        let Some(cell) = self.get(coordinate.row - 1, coordinate.column - 1) else {
            return Ok(CellValue::Empty);
        };
        cell.to_value().map_err(|error| {
            SpreadsheetError::InvalidCellValue {
                file: self.file_name.to_owned(),
                sheet: self.name.to_owned(),
                reference: cell.reference(),
                message: error.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(sheet: &mut Sheet, row: usize, col: usize, kind: CellType, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind,
            value: value.to_owned(),
        });
    }

    #[test]
    fn window_covering() {
        let coordinates = [Coordinate::new(3, 2), Coordinate::new(1, 5), Coordinate::new(2, 4)];
        assert_eq!(
            Window::covering(&coordinates),
            Some(Window {
                row_lower_bound: 1,
                row_upper_bound: 4,
                col_lower_bound: 0,
                col_upper_bound: 2,
            })
        );
        assert_eq!(Window::covering(&[] as &[Coordinate]), None);
    }

    #[test]
    fn window_filtering() {
        let sheet = Sheet::new("", "", Window::covering(&[Coordinate::new(2, 2), Coordinate::new(3, 4)]));
        assert!(sheet.contains(1, 1));
        assert!(sheet.contains(3, 2));
        assert!(!sheet.contains(0, 1));
        assert!(!sheet.contains(1, 0));
        assert!(!sheet.after_row_upper_bound(3));
        assert!(sheet.after_row_upper_bound(4));

        let nothing = Sheet::new("", "", None);
        assert!(!nothing.contains(0, 0));
        assert!(nothing.after_row_upper_bound(0));
    }

    #[test]
    fn cells_by_position() {
        let mut sheet = Sheet::new("", "", None);
        assert_eq!(sheet.len(), 0);
        push(&mut sheet, 1, 3, CellType::Number, "1");
        push(&mut sheet, 3, 1, CellType::Number, "2");
        push(&mut sheet, 1, 3, CellType::Number, "5");
        assert_eq!(sheet.get(1, 3).map(|cell| cell.value.as_str()), Some("5"));
        assert_eq!(sheet.get(3, 1).map(|cell| cell.value.as_str()), Some("2"));
        assert!(sheet.get(2, 2).is_none());
    }

    #[test]
    fn values_outside_the_extent_are_empty() {
        let mut sheet = Sheet::new("", "", None);
        push(&mut sheet, 0, 0, CellType::InlineString, "cat");
        assert_eq!(sheet.value_at(&Coordinate::new(1, 1)).unwrap(), CellValue::from("cat"));
        assert_eq!(sheet.value_at(&Coordinate::new(2, 1)).unwrap(), CellValue::Empty);
        assert_eq!(sheet.value_at(&Coordinate::new(500, 9000)).unwrap(), CellValue::Empty);
    }

    #[test]
    fn shared_strings() {
        let mut sheet = Sheet::new("book.xlsx", "Words", None);
        push(&mut sheet, 0, 0, CellType::SharedString, "4");
        push(&mut sheet, 1, 0, CellType::SharedString, "9");
        assert_eq!(sheet.shared_string_ids().unwrap(), vec![4, 9]);

        let strings = vec!["dog".to_owned(), "cat".to_owned()];
        let mappings = HashMap::from([(4, 1), (9, 0)]);
        sheet.resolve_shared_strings(&strings, &mappings).unwrap();
        assert_eq!(sheet.value_at(&Coordinate::new(1, 1)).unwrap(), CellValue::from("cat"));
        assert_eq!(sheet.value_at(&Coordinate::new(1, 2)).unwrap(), CellValue::from("dog"));
    }

    #[test]
    fn missing_shared_string() {
        let mut sheet = Sheet::new("book.xlsx", "Words", None);
        push(&mut sheet, 0, 1, CellType::SharedString, "7");
        let error = sheet.resolve_shared_strings(&[], &HashMap::new()).unwrap_err();
        assert!(error.to_string().contains("B1"), "{error}");
    }

    #[test]
    fn invalid_number_names_the_cell() {
        let mut sheet = Sheet::new("book.xlsx", "Words", None);
        push(&mut sheet, 2, 2, CellType::Number, "n/a");
        let error = sheet.value_at(&Coordinate::new(3, 3)).unwrap_err();
        assert!(error.to_string().contains("C3"), "{error}");
    }
}
