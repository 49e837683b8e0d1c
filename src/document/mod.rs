//! In-memory spreadsheet document
//!
//! The mapping engine only talks to this narrow model: worksheets by name,
//! cells by 1-based row/column with typed access, comments, list validations
//! and basic style properties. Loading and saving `.xlsx` files lives in
//! [`crate::excel`].

mod cell;
mod range;
mod serial;

pub use cell::{Cell, CellValue, FromCellValue};
pub use range::{column_letter, column_number, CellRange};
pub use serial::{datetime_to_serial, serial_to_datetime};

use crate::error::{SheetError, SheetResult};
use std::collections::BTreeMap;

/// Row height Excel uses when nothing else is set
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

/// Dropdown constraint on one cell, listing the values found in `source_range`
/// of `source_sheet`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListValidation {
    pub row: u32,
    pub column: u32,
    pub source_sheet: String,
    pub source_range: CellRange,
}

impl ListValidation {
    /// Formula Excel stores for the list source, e.g. `'Dropdowns_000042'!$A$1:$A$3`
    pub fn source_formula(&self) -> String {
        format!(
            "'{}'!{}",
            self.source_sheet.replace('\'', "''"),
            self.source_range.absolute()
        )
    }
}

//==============================================================================
// Worksheet
//==============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    name: String,
    visibility: Visibility,
    cells: BTreeMap<(u32, u32), Cell>,
    column_widths: BTreeMap<u32, f64>,
    row_heights: BTreeMap<u32, f64>,
    default_row_height: Option<f64>,
    list_validations: BTreeMap<(u32, u32), ListValidation>,
}

impl Worksheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.visibility = visibility;
        self
    }

    pub fn hide(&mut self) -> &mut Self {
        self.set_visibility(Visibility::Hidden)
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility != Visibility::Visible
    }

    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Cell at `(row, column)`, created empty if absent
    pub fn cell_mut(&mut self, row: u32, column: u32) -> &mut Cell {
        self.cells.entry((row, column)).or_default()
    }

    pub fn value(&self, row: u32, column: u32) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cell(row, column).map(|c| &c.value).unwrap_or(EMPTY)
    }

    pub fn set_value(&mut self, row: u32, column: u32, value: impl Into<CellValue>) -> &mut Cell {
        let cell = self.cell_mut(row, column);
        cell.set_value(value);
        cell
    }

    /// All materialised cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    /// Smallest rectangle containing every non-empty cell value
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.value.is_empty())
            .fold(None, |range: Option<CellRange>, (&(row, column), _)| {
                Some(match range {
                    None => CellRange::new(row, column, row, column),
                    Some(r) => CellRange::new(
                        r.first_row.min(row),
                        r.first_column.min(column),
                        r.last_row.max(row),
                        r.last_column.max(column),
                    ),
                })
            })
    }

    pub fn set_column_width(&mut self, column: u32, width: f64) -> &mut Self {
        self.column_widths.insert(column, width);
        self
    }

    pub fn column_width(&self, column: u32) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) -> &mut Self {
        self.row_heights.insert(row, height);
        self
    }

    /// Explicit height, else the sheet default, else Excel's default
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights
            .get(&row)
            .copied()
            .or(self.default_row_height)
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    pub fn row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.row_heights.iter().map(|(r, h)| (*r, *h))
    }

    pub fn set_default_row_height(&mut self, height: f64) -> &mut Self {
        self.default_row_height = Some(height);
        self
    }

    pub fn default_row_height(&self) -> Option<f64> {
        self.default_row_height
    }

    pub fn add_list_validation(
        &mut self,
        row: u32,
        column: u32,
        source_sheet: &str,
        source_range: CellRange,
    ) -> &mut Self {
        self.list_validations.insert(
            (row, column),
            ListValidation {
                row,
                column,
                source_sheet: source_sheet.to_string(),
                source_range,
            },
        );
        self
    }

    /// List validations in row, then column order
    pub fn list_validations(&self) -> impl ExactSizeIterator<Item = &ListValidation> {
        self.list_validations.values()
    }

    pub fn list_validation(&self, row: u32, column: u32) -> Option<&ListValidation> {
        self.list_validations.get(&(row, column))
    }
}

//==============================================================================
// Workbook
//==============================================================================

/// Ordered collection of worksheets. Not synchronised: callers serialise
/// access to one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.name.eq_ignore_ascii_case(name))
    }

    fn validate_sheet_name(name: &str) -> SheetResult<()> {
        let invalid = |reason: &str| SheetError::InvalidSheetName(name.to_string(), reason.to_string());
        if name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(invalid("name is longer than 31 characters"));
        }
        if name.contains(FORBIDDEN_SHEET_NAME_CHARS) {
            return Err(invalid("name contains one of []:*?/\\"));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(invalid("name starts or ends with an apostrophe"));
        }
        Ok(())
    }

    pub fn add_worksheet(&mut self, name: &str) -> SheetResult<&mut Worksheet> {
        Self::validate_sheet_name(name)?;
        if self.position(name).is_some() {
            return Err(SheetError::DuplicateWorksheet(name.to_string()));
        }
        self.worksheets.push(Worksheet::new(name));
        let index = self.worksheets.len() - 1;
        Ok(&mut self.worksheets[index])
    }

    pub fn get_or_add_worksheet(&mut self, name: &str) -> SheetResult<&mut Worksheet> {
        match self.position(name) {
            Some(index) => Ok(&mut self.worksheets[index]),
            None => self.add_worksheet(name),
        }
    }

    pub fn contains_worksheet(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn try_worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.position(name).map(|index| &self.worksheets[index])
    }

    pub fn worksheet(&self, name: &str) -> SheetResult<&Worksheet> {
        self.try_worksheet(name)
            .ok_or_else(|| SheetError::WorksheetNotFound(name.to_string()))
    }

    pub fn worksheet_mut(&mut self, name: &str) -> SheetResult<&mut Worksheet> {
        match self.position(name) {
            Some(index) => Ok(&mut self.worksheets[index]),
            None => Err(SheetError::WorksheetNotFound(name.to_string())),
        }
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup_worksheet() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Budgets").unwrap();
        assert!(workbook.contains_worksheet("budgets"));
        assert_eq!(workbook.worksheet("BUDGETS").unwrap().name(), "Budgets");
        assert!(matches!(
            workbook.worksheet("Missing"),
            Err(SheetError::WorksheetNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Data").unwrap();
        assert!(matches!(
            workbook.add_worksheet("data"),
            Err(SheetError::DuplicateWorksheet(_))
        ));
        assert!(matches!(
            workbook.add_worksheet("a/b"),
            Err(SheetError::InvalidSheetName(..))
        ));
        assert!(matches!(
            workbook.add_worksheet(""),
            Err(SheetError::InvalidSheetName(..))
        ));
        assert!(matches!(
            workbook.add_worksheet("this name is far too long for excel"),
            Err(SheetError::InvalidSheetName(..))
        ));
        assert_eq!(workbook.len(), 1);
    }

    #[test]
    fn test_get_or_add_reuses_sheet() {
        let mut workbook = Workbook::new();
        workbook.get_or_add_worksheet("Data").unwrap().set_value(1, 1, 5.0);
        let sheet = workbook.get_or_add_worksheet("Data").unwrap();
        assert_eq!(sheet.value(1, 1), &CellValue::Number(5.0));
        assert_eq!(workbook.len(), 1);
    }

    #[test]
    fn test_used_range_ignores_empty_cells() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        assert_eq!(sheet.used_range(), None);

        sheet.set_value(3, 2, "title");
        sheet.set_value(5, 4, 1.0);
        // styled but empty cell does not count as content
        sheet.cell_mut(9, 9).set_comment("note");

        assert_eq!(sheet.used_range(), Some(CellRange::new(3, 2, 5, 4)));
    }

    #[test]
    fn test_row_height_fallbacks() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        assert_eq!(sheet.row_height(1), DEFAULT_ROW_HEIGHT);
        sheet.set_default_row_height(20.0);
        assert_eq!(sheet.row_height(1), 20.0);
        sheet.set_row_height(1, 30.0);
        assert_eq!(sheet.row_height(1), 30.0);
        assert_eq!(sheet.row_height(2), 20.0);
    }

    #[test]
    fn test_list_validation_replaces_existing() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        sheet.add_list_validation(2, 3, "Lists", CellRange::column_span(1, 1, 3));
        sheet.add_list_validation(2, 3, "Lists", CellRange::column_span(2, 1, 4));
        assert_eq!(sheet.list_validations().len(), 1);
        assert_eq!(
            sheet.list_validation(2, 3).unwrap().source_formula(),
            "'Lists'!$B$1:$B$4"
        );
    }

    #[test]
    fn test_many_list_validations_keep_one_per_cell() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        let range = CellRange::column_span(1, 1, 3);
        for row in (1..=5000).rev() {
            sheet.add_list_validation(row, 4, "Lists", range);
            sheet.add_list_validation(row, 2, "Lists", range);
        }
        for row in 1..=5000 {
            sheet.add_list_validation(row, 4, "Other", range);
        }

        assert_eq!(sheet.list_validations().len(), 10_000);
        assert_eq!(sheet.list_validation(4321, 4).unwrap().source_sheet, "Other");
        assert_eq!(sheet.list_validation(4321, 2).unwrap().source_sheet, "Lists");

        let first: Vec<(u32, u32)> = sheet
            .list_validations()
            .take(3)
            .map(|v| (v.row, v.column))
            .collect();
        assert_eq!(first, vec![(1, 2), (1, 4), (2, 2)]);
    }
}
