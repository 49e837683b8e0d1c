//! A1-style cell references

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Convert a 1-based column number to its letter (1→A, 26→Z, 27→AA)
pub fn column_letter(column: u32) -> String {
    let mut result = String::new();
    let mut num = column;

    while num > 0 {
        let remainder = (num - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        num = (num - 1) / 26;
    }

    result
}

/// Convert column letters to a 1-based column number (A→1, AA→27)
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Rectangular block of cells, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub first_row: u32,
    pub first_column: u32,
    pub last_row: u32,
    pub last_column: u32,
}

impl CellRange {
    pub fn new(first_row: u32, first_column: u32, last_row: u32, last_column: u32) -> Self {
        Self {
            first_row,
            first_column,
            last_row,
            last_column,
        }
    }

    /// A single column from `first_row` to `last_row`
    pub fn column_span(column: u32, first_row: u32, last_row: u32) -> Self {
        Self::new(first_row, column, last_row, column)
    }

    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn column_count(&self) -> u32 {
        self.last_column - self.first_column + 1
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.first_row..=self.last_row
    }

    pub fn columns(&self) -> std::ops::RangeInclusive<u32> {
        self.first_column..=self.last_column
    }

    pub fn contains(&self, row: u32, column: u32) -> bool {
        self.rows().contains(&row) && self.columns().contains(&column)
    }

    /// `$A$1:$A$3`
    pub fn absolute(&self) -> String {
        format!(
            "${}${}:${}${}",
            column_letter(self.first_column),
            self.first_row,
            column_letter(self.last_column),
            self.last_row
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letter(self.first_column),
            self.first_row,
            column_letter(self.last_column),
            self.last_row
        )
    }
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\$?([A-Za-z]{1,3})\$?(\d+)(?::\$?([A-Za-z]{1,3})\$?(\d+))?$")
            .expect("static range pattern")
    })
}

impl FromStr for CellRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid cell range '{}'", s);
        let caps = range_pattern().captures(s.trim()).ok_or_else(invalid)?;

        let first_column = column_number(&caps[1]).ok_or_else(invalid)?;
        let first_row: u32 = caps[2].parse().map_err(|_| invalid())?;
        let (last_column, last_row) = match (caps.get(3), caps.get(4)) {
            (Some(col), Some(row)) => (
                column_number(col.as_str()).ok_or_else(invalid)?,
                row.as_str().parse().map_err(|_| invalid())?,
            ),
            _ => (first_column, first_row),
        };

        if first_row == 0 || last_row < first_row || last_column < first_column {
            return Err(invalid());
        }

        Ok(CellRange::new(first_row, first_column, last_row, last_column))
    }
}
