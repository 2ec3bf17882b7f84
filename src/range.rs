//! Range expressions.
//!
//! A range is entered as a column expression and a row expression, each either
//! a single token (`"A"`, `"5"`) or an inclusive span (`"A-C"`, `"1-10"`).
//! Column letters are case-insensitive and map to 1-based indexes
//! (`A` = 1, `Z` = 26, `AA` = 27). Resolved coordinates are listed in
//! row-major order: every column of the first row, then the next row.

use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::index_to_col;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::reference::MAX_COLUMNS;
use crate::spreadsheet::reference::MAX_ROWS;
use regex::Regex;
use std::fmt::Display;
use std::sync::OnceLock;
use thiserror::Error;

/// Malformed range expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("Empty {axis} range")]
    Empty { axis: Axis },

    #[error("Invalid {axis} range '{expression}': cannot parse '{token}'")]
    InvalidToken { axis: Axis, expression: String, token: String },

    #[error("Inverted {axis} range '{expression}': end is before start")]
    Inverted { axis: Axis, expression: String },

    #[error("Invalid {axis} range '{expression}': '{token}' is beyond the last {axis} of a worksheet")]
    OutOfLimits { axis: Axis, expression: String, token: String },

    #[error("Range {range} covers {cells} cells, more than four full columns")]
    TooManyCells { range: String, cells: usize },
}

/// Largest number of cells one range may cover: four full columns.
pub const MAX_RANGE_CELLS: usize = 4 * MAX_ROWS;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Column,
    Row,
}

impl Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Column => write!(f, "column"),
            Axis::Row => write!(f, "row"),
        }
    }
}

/// A 1-based cell position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub column: usize,
    pub row: usize,
}

impl Coordinate {
    pub fn new(column: usize, row: usize) -> Self {
        Coordinate { column, row }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", index_to_col(self.column.saturating_sub(1)), self.row)
    }
}

/// Inclusive 1-based span along one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Parses `"A"` or `"A-C"`.
    pub fn parse_columns(expression: &str) -> Result<Span, RangeError> {
        Self::parse(expression, Axis::Column)
    }

    /// Parses `"5"` or `"1-10"`.
    pub fn parse_rows(expression: &str) -> Result<Span, RangeError> {
        Self::parse(expression, Axis::Row)
    }

    fn parse(expression: &str, axis: Axis) -> Result<Span, RangeError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(RangeError::Empty { axis });
        }
        let pattern = span_pattern();
        let captures = pattern.captures(trimmed).ok_or_else(|| RangeError::InvalidToken {
            axis,
            expression: expression.to_owned(),
            token: trimmed.to_owned(),
        })?;
        let start_token = captures.get(1).map(|matcher| matcher.as_str()).unwrap_or_default();
        let end_token = captures.get(2).map(|matcher| matcher.as_str()).unwrap_or(start_token);

        let start = Self::parse_token(expression, start_token, axis)?;
        let end = Self::parse_token(expression, end_token, axis)?;
        if end < start {
            return Err(RangeError::Inverted {
                axis,
                expression: expression.to_owned(),
            });
        }
        Ok(Span { start, end })
    }

    /// One token to its 1-based index.
    fn parse_token(expression: &str, token: &str, axis: Axis) -> Result<usize, RangeError> {
        let (index, limit) = match axis {
            Axis::Column => (col_to_index(token), MAX_COLUMNS),
            Axis::Row => (row_to_index(token), MAX_ROWS),
        };
        let index = index.ok_or_else(|| {
            // Digits or letters that overflow are too far out, anything else is garbage
            let overflowed = match axis {
                Axis::Column => !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphabetic()),
                Axis::Row => token.bytes().all(|b| b.is_ascii_digit()) && !token.trim_start_matches('0').is_empty(),
            };
            if overflowed {
                RangeError::OutOfLimits {
                    axis,
                    expression: expression.to_owned(),
                    token: token.to_owned(),
                }
            } else {
                RangeError::InvalidToken {
                    axis,
                    expression: expression.to_owned(),
                    token: token.to_owned(),
                }
            }
        })?;
        if index >= limit {
            return Err(RangeError::OutOfLimits {
                axis,
                expression: expression.to_owned(),
                token: token.to_owned(),
            });
        }
        Ok(index + 1)
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// The indexes of the span in increasing order.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + Clone {
        self.start..=self.end
    }
}

/// `<token>` or `<token>-<token>`; the tokens themselves are validated per axis.
fn span_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^\s-]+)(?:\s*-\s*([^\s-]+))?$").expect("Hardcode regex pattern"))
}

/// A rectangle given by its column and row expressions.
/// The expressions are kept verbatim so they can be persisted as entered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub columns_expression: String,
    pub rows_expression: String,
    pub columns: Span,
    pub rows: Span,
}

impl CellRange {
    /// Fails on malformed spans and on rectangles larger than [`MAX_RANGE_CELLS`].
    pub fn parse(columns: &str, rows: &str) -> Result<CellRange, RangeError> {
        let range = CellRange {
            columns_expression: columns.to_owned(),
            rows_expression: rows.to_owned(),
            columns: Span::parse_columns(columns)?,
            rows: Span::parse_rows(rows)?,
        };
        let cells = range.columns.len().saturating_mul(range.rows.len());
        if cells > MAX_RANGE_CELLS {
            return Err(RangeError::TooManyCells {
                range: range.to_string(),
                cells,
            });
        }
        Ok(range)
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// `(columns, rows)`
    pub fn shape(&self) -> (usize, usize) {
        (self.columns.len(), self.rows.len())
    }

    /// Every coordinate of the rectangle, row-major.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let columns = self.columns;
        self.rows
            .indexes()
            .flat_map(|row| columns.indexes().map(move |column| Coordinate { column, row }))
            .collect()
    }
}

impl Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "columns '{}' rows '{}'", self.columns_expression, self.rows_expression)
    }
}

/// Column letters to a 1-based index: `A` = 1, `AA` = 27.
pub fn column_to_index(letters: &str) -> Option<usize> {
    col_to_index(letters.trim()).map(|index| index + 1)
}

/// 1-based column index to letters; `None` for 0.
pub fn index_to_column(index: usize) -> Option<String> {
    index.checked_sub(1).map(index_to_col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_spans() {
        assert_eq!(Span::parse_columns("A").unwrap(), Span { start: 1, end: 1 });
        assert_eq!(Span::parse_columns("a-c").unwrap(), Span { start: 1, end: 3 });
        assert_eq!(Span::parse_columns(" AA - AB ").unwrap(), Span { start: 27, end: 28 });
        assert_eq!(Span::parse_rows("5").unwrap(), Span { start: 5, end: 5 });
        assert_eq!(Span::parse_rows("1-10").unwrap(), Span { start: 1, end: 10 });
        assert_eq!(Span::parse_columns("C-C").unwrap().len(), 1);
    }

    #[test]
    fn spans_are_contiguous_and_increasing() {
        for (expression, expected) in [("A", 1), ("A-C", 3), ("B-Z", 25), ("Z-AC", 4), ("A-XFD", MAX_COLUMNS)] {
            let span = Span::parse_columns(expression).unwrap();
            let indexes: Vec<usize> = span.indexes().collect();
            assert_eq!(indexes.len(), expected, "{expression}");
            assert!(indexes.windows(2).all(|pair| pair[1] == pair[0] + 1), "{expression}");
        }
    }

    #[test]
    fn empty_expressions() {
        assert_eq!(Span::parse_columns(""), Err(RangeError::Empty { axis: Axis::Column }));
        assert_eq!(Span::parse_rows("   "), Err(RangeError::Empty { axis: Axis::Row }));
    }

    #[test]
    fn inverted_expressions() {
        assert!(matches!(Span::parse_columns("C-A"), Err(RangeError::Inverted { .. })));
        assert!(matches!(Span::parse_rows("10-1"), Err(RangeError::Inverted { .. })));
    }

    #[test]
    fn unparseable_tokens() {
        for expression in ["1", "A1", "A-", "-C", "A-B-C", "Ä"] {
            assert!(
                matches!(Span::parse_columns(expression), Err(RangeError::InvalidToken { .. })),
                "{expression}"
            );
        }
        for expression in ["0", "A", "1.5", "1-", "1-2-3", "-3"] {
            assert!(
                matches!(Span::parse_rows(expression), Err(RangeError::InvalidToken { .. })),
                "{expression}"
            );
        }
    }

    #[test]
    fn beyond_worksheet_limits() {
        assert!(matches!(Span::parse_columns("XFE"), Err(RangeError::OutOfLimits { .. })));
        assert!(matches!(Span::parse_columns("A-ZZZZZZZZZZZZZZZ"), Err(RangeError::OutOfLimits { .. })));
        assert!(matches!(Span::parse_rows("1-1048577"), Err(RangeError::OutOfLimits { .. })));
        assert!(Span::parse_rows("1048576").is_ok());
    }

    #[test]
    fn oversized_rectangles() {
        let error = CellRange::parse("A-XFD", "1-1048576").unwrap_err();
        assert_eq!(
            error,
            RangeError::TooManyCells {
                range: "columns 'A-XFD' rows '1-1048576'".to_owned(),
                cells: MAX_COLUMNS * MAX_ROWS,
            }
        );
        assert!(matches!(CellRange::parse("A-E", "1-1048576"), Err(RangeError::TooManyCells { .. })));
        assert_eq!(CellRange::parse("A-D", "1-1048576").unwrap().cell_count(), MAX_RANGE_CELLS);
    }

    #[test]
    fn rectangle_is_row_major() {
        let range = CellRange::parse("A-C", "1-10").unwrap();
        let coordinates = range.coordinates();
        assert_eq!(coordinates.len(), 30);
        assert_eq!(range.cell_count(), 30);
        assert_eq!(range.shape(), (3, 10));
        assert_eq!(
            &coordinates[..4],
            &[
                Coordinate::new(1, 1),
                Coordinate::new(2, 1),
                Coordinate::new(3, 1),
                Coordinate::new(1, 2),
            ]
        );
        assert_eq!(coordinates[29], Coordinate::new(3, 10));
        assert_eq!(coordinates[29].to_string(), "C10");
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_to_index("A"), Some(1));
        assert_eq!(column_to_index("z"), Some(26));
        assert_eq!(column_to_index("AA"), Some(27));
        assert_eq!(column_to_index("1"), None);
        assert_eq!(index_to_column(27).as_deref(), Some("AA"));
        assert_eq!(index_to_column(0), None);
    }
}
