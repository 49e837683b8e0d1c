//! Writes records to a worksheet

use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};
use uuid::Uuid;

use super::approval::ColumnApproval;
use super::options::ExporterOptions;
use super::targeting::{TableOrigin, TargetingRule};
use crate::codec;
use crate::document::{CellRange, Workbook, Worksheet};
use crate::error::{SheetError, SheetResult};
use crate::locale::Locale;
use crate::mapping::{ColumnMapping, EnumKey, TypeMetadata};
use crate::style::{CellStyle, StylingLookup};

/// Row holding the column headers of a sheet generated without targeting
pub const HEADER_ROW: u32 = TableOrigin::TOP_LEFT.row;

/// Conditional fields approved for this run. Without an approval every
/// conditional column is left out.
pub(crate) async fn approve_conditional_columns<T>(
    metadata: &TypeMetadata<T>,
    approval: Option<&dyn ColumnApproval>,
) -> HashSet<String> {
    let mut approved = HashSet::new();
    let Some(approval) = approval else {
        return approved;
    };

    for mapping in metadata.columns().iter().filter(|m| m.is_conditional()) {
        let granted = approval.approve(mapping.field_name()).await;
        debug!(field = mapping.field_name(), granted, "conditional column");
        if granted {
            approved.insert(mapping.field_name().to_string());
        }
    }
    approved
}

/// Random names tried before giving up on a free dropdown sheet name
const DROPDOWN_NAME_ATTEMPTS: usize = 1000;

/// Name of the hidden dropdown sheet: `Dropdowns_` and six random digits,
/// not yet used in `workbook`
fn dropdown_sheet_name(workbook: &Workbook) -> SheetResult<String> {
    first_free_name(
        workbook,
        std::iter::repeat_with(|| format!("Dropdowns_{:06}", Uuid::new_v4().as_u128() % 1_000_000)),
    )
}

fn first_free_name(workbook: &Workbook, candidates: impl Iterator<Item = String>) -> SheetResult<String> {
    candidates
        .take(DROPDOWN_NAME_ATTEMPTS)
        .find(|name| !workbook.contains_worksheet(name))
        .ok_or_else(|| {
            SheetError::Configuration(format!(
                "no free dropdown sheet name after {} attempts",
                DROPDOWN_NAME_ATTEMPTS
            ))
        })
}

struct Dropdowns {
    sheet_name: String,
    ranges: HashMap<EnumKey, CellRange>,
}

/// Create the hidden sheet holding one label column per enum type
fn write_dropdown_sheet<T>(workbook: &mut Workbook, metadata: &TypeMetadata<T>) -> SheetResult<Dropdowns> {
    let sheet_name = dropdown_sheet_name(workbook)?;
    let sheet = workbook.add_worksheet(&sheet_name)?;
    sheet.hide();

    let mut ranges = HashMap::new();
    for (offset, dictionary) in metadata.enum_dictionaries().iter().enumerate() {
        let column = offset as u32 + 1;
        for (row, label) in (1u32..).zip(dictionary.labels()) {
            sheet.set_value(row, column, label);
        }
        if !dictionary.is_empty() {
            let range = CellRange::column_span(column, 1, dictionary.len() as u32);
            trace!(enum_type = dictionary.key().type_name(), %range, "dropdown list written");
            ranges.insert(dictionary.key(), range);
        }
    }

    Ok(Dropdowns { sheet_name, ranges })
}

fn write_header_row<T>(
    sheet: &mut Worksheet,
    columns: &[&ColumnMapping<T>],
    style: &CellStyle,
    origin: TableOrigin,
) {
    if let Some(height) = style.row_height {
        sheet.set_default_row_height(height);
    }

    for (column, mapping) in (origin.column..).zip(columns) {
        sheet
            .set_value(origin.row, column, mapping.display_name())
            .apply_style(style);
        if let Some(width) = mapping.width() {
            sheet.set_column_width(column, f64::from(width));
        }
    }
}

/// Everything one generation run needs besides the target workbook
pub(crate) struct Generation<'a, T> {
    pub metadata: &'a TypeMetadata<T>,
    pub options: &'a ExporterOptions<T>,
    pub locale: &'a Locale,
    pub approved: &'a HashSet<String>,
}

impl<T> Generation<'_, T> {
    fn columns(&self) -> Vec<&ColumnMapping<T>> {
        self.metadata
            .columns()
            .iter()
            .filter(|m| !m.is_conditional() || self.approved.contains(m.field_name()))
            .collect()
    }

    /// Write the header and one row per record to `sheet_name`, creating the
    /// sheet if needed, plus a new hidden dropdown sheet
    pub fn write(&self, workbook: &mut Workbook, sheet_name: &str, data: &[T]) -> SheetResult<()> {
        workbook.get_or_add_worksheet(sheet_name)?;
        let dropdowns = write_dropdown_sheet(workbook, self.metadata)?;
        self.write_table(workbook, sheet_name, &dropdowns, TableOrigin::TOP_LEFT, data.iter())
    }

    /// Write one table per rule, each holding the records the rule matches.
    /// All target sheets are created before the single dropdown sheet.
    pub fn write_targeted(
        &self,
        workbook: &mut Workbook,
        rules: &[&TargetingRule<T>],
        data: &[T],
    ) -> SheetResult<()> {
        for rule in rules {
            workbook.get_or_add_worksheet(rule.sheet_name())?;
        }
        let dropdowns = write_dropdown_sheet(workbook, self.metadata)?;

        for rule in rules {
            let records = data.iter().filter(|record| rule.matches(record));
            self.write_table(workbook, rule.sheet_name(), &dropdowns, rule.origin(), records)?;
        }
        Ok(())
    }

    fn write_table<'r>(
        &self,
        workbook: &mut Workbook,
        sheet_name: &str,
        dropdowns: &Dropdowns,
        origin: TableOrigin,
        records: impl Iterator<Item = &'r T>,
    ) -> SheetResult<()>
    where
        T: 'r,
    {
        let sheet = workbook.worksheet_mut(sheet_name)?;

        let columns = self.columns();
        write_header_row(sheet, &columns, self.options.header_style(), origin);

        let lookup = StylingLookup::new(self.options.rules());
        let mut rows = 0usize;
        for (row, record) in (origin.row + 1..).zip(records) {
            let first_cell = TableOrigin { row, ..origin };
            self.write_row(sheet, &columns, &lookup, dropdowns, first_cell, record);
            rows += 1;
        }

        debug!(
            sheet = sheet_name,
            dropdown_sheet = %dropdowns.sheet_name,
            header_row = origin.row,
            first_column = origin.column,
            columns = columns.len(),
            rows,
            "worksheet generated"
        );
        Ok(())
    }

    fn write_row(
        &self,
        sheet: &mut Worksheet,
        columns: &[&ColumnMapping<T>],
        lookup: &StylingLookup<'_, T>,
        dropdowns: &Dropdowns,
        first_cell: TableOrigin,
        record: &T,
    ) {
        let row = first_cell.row;
        for (column, mapping) in (first_cell.column..).zip(columns) {
            let encoded = codec::encode(mapping, &mapping.read(record), self.metadata, self.locale);
            let style = lookup.resolve_style(mapping.field_name(), record, self.options.data_style());

            let cell = sheet.set_value(row, column, encoded.value);
            cell.apply_style(&style);
            if let Some(format) = encoded.number_format {
                cell.set_number_format(format);
            }

            if let Some(range) = encoded.dropdown.and_then(|key| dropdowns.ranges.get(&key)) {
                sheet.add_list_validation(row, column, &dropdowns.sheet_name, *range);
            }

            // a style only ever grows the row
            if let Some(height) = style.row_height {
                if height > sheet.row_height(row) {
                    sheet.set_row_height(row, height);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdown_sheet_name_shape() {
        let workbook = Workbook::new();
        let name = dropdown_sheet_name(&workbook).unwrap();
        assert!(name.starts_with("Dropdowns_"));
        let suffix = &name["Dropdowns_".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_taken_names_are_skipped() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Dropdowns_000001").unwrap();
        let candidates = ["Dropdowns_000001", "Dropdowns_000002"].map(String::from);
        assert_eq!(
            first_free_name(&workbook, candidates.into_iter()).unwrap(),
            "Dropdowns_000002"
        );
    }

    #[test]
    fn test_dropdown_name_attempts_are_bounded() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Dropdowns_000001").unwrap();
        let mut tried = 0;
        let candidates = std::iter::repeat_with(|| {
            tried += 1;
            "Dropdowns_000001".to_string()
        });
        let err = first_free_name(&workbook, candidates).unwrap_err();
        assert!(matches!(err, SheetError::Configuration(_)));
        assert!(err.to_string().contains("1000 attempts"), "{}", err);
        assert_eq!(tried, DROPDOWN_NAME_ATTEMPTS);
    }
}
