//! Cell address type

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Position of one cell, as written in A1 notation (`B7`, `$C$2`).
///
/// Rows and columns are stored 0-based. A `$` before either part pins it
/// when a shared formula is copied into neighbouring cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellAddress {
    /// 0-based row (`1` in A1 text is row 0)
    pub row: u32,
    /// 0-based column, `A` = 0 up to `XFD`
    pub col: u16,
    /// `$` before the row number
    pub row_absolute: bool,
    /// `$` before the column letters
    pub col_absolute: bool,
}

impl CellAddress {
    /// Relative address at `row`, `col`
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            ..Self::default()
        }
    }

    /// Read an A1-style reference.
    ///
    /// ```
    /// use testdeck_core::CellAddress;
    ///
    /// let header = CellAddress::parse("C1").unwrap();
    /// assert_eq!((header.row, header.col), (0, 2));
    ///
    /// let pinned = CellAddress::parse("$D$10").unwrap();
    /// assert_eq!((pinned.row, pinned.col), (9, 3));
    /// assert!(pinned.row_absolute && pinned.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let bad = |why: &str| Error::InvalidAddress(format!("{} in '{}'", why, text));

        let (col_absolute, rest) = strip_dollar(text);
        let letters_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (letters, rest) = rest.split_at(letters_end);
        if letters.is_empty() {
            return Err(bad("missing column"));
        }
        let col = Self::letters_to_column(letters)?;

        let (row_absolute, digits) = strip_dollar(rest);
        if digits.is_empty() {
            return Err(bad("missing row"));
        }
        let row_number: u32 = digits.parse().map_err(|_| bad("bad row"))?;
        let row = match row_number.checked_sub(1) {
            Some(row) => row,
            None => return Err(bad("row 0")),
        };
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Column letters for a 0-based index: 0 is `A`, 27 is `AB`
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::with_capacity(3);
        let mut rem = u32::from(col) + 1;
        while rem > 0 {
            let digit = (rem - 1) % 26;
            letters.push(b'A' + digit as u8);
            rem = (rem - 1) / 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// 0-based index for column letters, case-insensitive
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("no column letters".into()));
        }

        letters
            .bytes()
            .try_fold(0u32, |acc, b| {
                if !b.is_ascii_alphabetic() {
                    return Err(Error::InvalidAddress(format!(
                        "'{}' is not a column letter",
                        b as char
                    )));
                }
                let next = acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
                if next > u32::from(MAX_COLS) {
                    return Err(Error::InvalidAddress(format!("column {} past XFD", letters)));
                }
                Ok(next)
            })
            .map(|n| (n - 1) as u16)
    }

    /// Move the relative parts of this address by a row/column delta.
    ///
    /// Absolute components stay put. Returns `None` when the result would
    /// fall off the sheet.
    pub fn shifted(&self, row_delta: i64, col_delta: i64) -> Option<Self> {
        let row = if self.row_absolute {
            self.row as i64
        } else {
            self.row as i64 + row_delta
        };
        let col = if self.col_absolute {
            self.col as i64
        } else {
            self.col as i64 + col_delta
        };

        if !(0..MAX_ROWS as i64).contains(&row) || !(0..MAX_COLS as i64).contains(&col) {
            return None;
        }

        Some(Self {
            row: row as u32,
            col: col as u16,
            ..*self
        })
    }

    /// The address in A1 text, `$` markers included
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}{}{}",
            if self.col_absolute { "$" } else { "" },
            Self::column_to_letters(self.col),
            if self.row_absolute { "$" } else { "" },
            self.row + 1
        )
    }
}

fn strip_dollar(s: &str) -> (bool, &str) {
    match s.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
