//! A1-style cell reference conversions. Indexes here are 0-based.

/// Number of columns in a worksheet (`A` to `XFD`).
pub(crate) const MAX_COLUMNS: usize = 16_384;
/// Number of rows in a worksheet.
pub(crate) const MAX_ROWS: usize = 1_048_576;

/// Converts column letters (case-insensitive) to a 0-based index: `A` = 0, `AA` = 26.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|byte| byte.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .bytes()
        .try_fold(0usize, |index, byte| {
            let digit = (byte.to_ascii_uppercase() - b'A') as usize + 1;
            index.checked_mul(26)?.checked_add(digit)
        })
        .map(|column| column - 1)
}

/// Converts a 1-based row number to a 0-based index. `0` is not a row.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts a 0-based column index to letters: 0 = `A`, 26 = `AA`.
pub(crate) fn index_to_col(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Splits a reference such as `B12` into 0-based `(row, col)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Formats 0-based `(row, col)` as an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}
