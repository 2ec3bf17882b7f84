use crate::error::PairerError;
use crate::spreadsheet::reference::index_to_reference;
use anyhow::anyhow;
use chrono::Duration;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;

/// How the raw text of a worksheet cell is to be interpreted.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    Boolean,
    Number,
    /// Serial date/time numbers, 1900 or 1904 epoch
    DateTime { is_1904: bool },
    Date { is_1904: bool },
    Time,
    /// `t="d"` cells holding ISO 8601 text
    IsoDateTime,
    InlineString,
    /// Index into the shared string table until resolved
    SharedString,
    Error,
}

impl CellType {
    /// Date/time kinds of the built-in number format ids.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(Self::DateTime { is_1904 }),
            "14" | "15" | "16" | "17" => Some(Self::Date { is_1904 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::Time),
            _ => None,
        }
    }

    /// Classifies a custom format code by the date and time tokens it uses
    /// outside of literals, escapes and bracketed sections.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracketed = false;
        let mut has_date = false;
        let mut has_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracketed => is_literal = true,

                ']' if is_bracketed => is_bracketed = false,
                '[' if !is_literal => is_bracketed = true,
                _ if is_literal || is_bracketed => (),

                'Y' | 'y' | 'D' | 'd' => has_date = true,
                'H' | 'h' | 'S' | 's' => has_time = true,
                _ => (),
            }
        }

        match (has_date, has_time) {
            (true, true) => Self::DateTime { is_1904 },
            (true, false) => Self::Date { is_1904 },
            (false, true) => Self::Time,
            (false, false) => Self::Number,
        }
    }
}

/// A value read from a cell. Serializes to the plain JSON scalar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::Int(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{}", value),
        }
    }
}

/// A populated worksheet cell as found in the sheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Raw text of the `<v>` or inline string element
    pub(crate) value: String,
}

impl Cell {
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Interprets the raw text according to the cell type.
    /// Numbers written with a decimal point or exponent stay floats, the rest are integers.
    pub(crate) fn to_value(&self) -> Result<CellValue, PairerError> {
        let value = match self.kind {
            CellType::Empty => CellValue::Empty,
            CellType::Boolean => CellValue::Bool(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => {
                if self.value.contains(['.', 'e', 'E']) {
                    CellValue::Float(self.value.parse::<f64>()?)
                } else {
                    match self.value.parse::<i64>() {
                        Ok(value) => CellValue::Int(value),
                        Err(_) => CellValue::Float(self.value.parse::<f64>()?),
                    }
                }
            }
            CellType::DateTime { is_1904 } => CellValue::Text(to_datetime_string(&self.value, is_1904)?),
            CellType::Date { is_1904 } => CellValue::Text(to_date_string(&self.value, is_1904)?),
            CellType::Time => CellValue::Text(to_time_string(&self.value)?),
            CellType::IsoDateTime => CellValue::Text(self.value.replace('T', " ")),
            CellType::InlineString | CellType::SharedString | CellType::Error => {
                CellValue::Text(self.value.to_owned())
            }
        };
        Ok(value)
    }
}

/// Serial day number to `YYYY-MM-DD`.
/// The 1900 system counts the nonexistent 1900-02-29 as day 60.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, PairerError> {
    let days = value.parse::<f64>()?.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).expect("NaiveDate literal");
    let date = days
        .checked_add(offset)
        .and_then(Duration::try_days)
        .and_then(|duration| epoch.checked_add_signed(duration))
        .ok_or_else(|| anyhow!("serial date {} is out of range", value.trim()))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Fraction of a day to `HH:MM:SS`, with milliseconds when present.
fn to_time_string(value: &str) -> Result<String, PairerError> {
    let fraction = value.parse::<f64>()?.fract();
    let mut remainder = (fraction * 86_400_000f64).round() as i64;
    let milliseconds = remainder % 1_000;
    remainder /= 1_000;
    let seconds = remainder % 60;
    remainder /= 60;
    let minutes = remainder % 60;
    let hours = remainder / 60;
    Ok(if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    })
}

fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, PairerError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}
