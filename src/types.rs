use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::document::column_letter;

//==============================================================================
// Cell Addresses
//==============================================================================

/// Location of one cell, with the header of its column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExcelAddress {
    pub sheet_name: String,
    pub row_number: u32,
    pub column_number: u32,
    /// Column letters ("A", "AB")
    pub column_label: String,
    pub header_name: String,
}

impl ExcelAddress {
    pub fn new(sheet_name: &str, row_number: u32, column_number: u32, header_name: &str) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            row_number,
            column_number,
            column_label: column_letter(column_number),
            header_name: header_name.to_string(),
        }
    }

    /// A1-style reference, e.g. "C4"
    pub fn cell_reference(&self) -> String {
        format!("{}{}", self.column_label, self.row_number)
    }
}

impl fmt::Display for ExcelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{} ({})",
            self.sheet_name, self.column_label, self.row_number, self.header_name
        )
    }
}

//==============================================================================
// Read Results
//==============================================================================

/// Failed constraints of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcelCellValidationResult {
    pub address: ExcelAddress,
    pub messages: Vec<String>,
}

/// Records read from a sheet, plus the cells that failed validation.
///
/// Every data row yields a record, valid or not. `validation_results` is
/// keyed by the record's index in `records` and only holds records with at
/// least one failing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcelReadResult<T> {
    pub records: Vec<T>,
    pub validation_results: BTreeMap<usize, Vec<ExcelCellValidationResult>>,
}

impl<T> Default for ExcelReadResult<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            validation_results: BTreeMap::new(),
        }
    }
}

impl<T> ExcelReadResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record with the validation failures of its cells
    pub fn push(&mut self, record: T, failures: Vec<ExcelCellValidationResult>) {
        if !failures.is_empty() {
            self.validation_results.insert(self.records.len(), failures);
        }
        self.records.push(record);
    }

    /// Merge another result after this one, re-keying its validation entries
    pub fn append(&mut self, other: ExcelReadResult<T>) {
        let offset = self.records.len();
        self.records.extend(other.records);
        self.validation_results.extend(
            other
                .validation_results
                .into_iter()
                .map(|(index, failures)| (index + offset, failures)),
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when no record has a validation failure
    pub fn is_valid(&self) -> bool {
        self.validation_results.is_empty()
    }

    pub fn validation_for(&self, index: usize) -> Option<&[ExcelCellValidationResult]> {
        self.validation_results.get(&index).map(Vec::as_slice)
    }

    /// Records that failed validation, with their failing cells
    pub fn invalid_records(&self) -> impl Iterator<Item = (&T, &[ExcelCellValidationResult])> {
        self.validation_results
            .iter()
            .filter_map(|(index, failures)| self.records.get(*index).map(|r| (r, failures.as_slice())))
    }

    /// Every failing cell, in record order
    pub fn failures(&self) -> impl Iterator<Item = &ExcelCellValidationResult> {
        self.validation_results.values().flatten()
    }
}
