//! Header row location and header-to-column mapping for a single read

use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::document::{CellRange, Worksheet};
use crate::locale::Locale;
use crate::mapping::{normalize_label, ColumnMapping, TypeMetadata};

/// Physical column of each mapped field found in the header row, ordered by
/// column. Owned by one read; never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndexMap {
    /// (index into the metadata columns, 1-based sheet column)
    entries: Vec<(usize, u32)>,
}

impl ColumnIndexMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn column_of(&self, mapping_index: usize) -> Option<u32> {
        self.entries
            .iter()
            .find(|(index, _)| *index == mapping_index)
            .map(|(_, column)| *column)
    }

    /// Matched mappings with their sheet column, left to right
    pub fn iter<'m, T>(
        &'m self,
        metadata: &'m TypeMetadata<T>,
    ) -> impl Iterator<Item = (&'m ColumnMapping<T>, u32)> + 'm {
        self.entries
            .iter()
            .filter_map(|(index, column)| metadata.columns().get(*index).map(|m| (m, *column)))
    }
}

/// Finds the header row of a sheet for one record type
pub struct HeaderLocator<'a, T> {
    metadata: &'a TypeMetadata<T>,
    labels: HashSet<&'a str>,
}

impl<'a, T> HeaderLocator<'a, T> {
    pub fn new(metadata: &'a TypeMetadata<T>) -> Self {
        Self {
            metadata,
            labels: metadata.expected_labels(),
        }
    }

    fn is_label(&self, text: &str) -> bool {
        self.labels.contains(normalize_label(text).as_str())
    }

    /// First row in `used` with at least one cell whose text is an expected label
    pub fn locate(&self, sheet: &Worksheet, used: &CellRange, locale: &Locale) -> Option<u32> {
        let found = used.rows().find(|&row| {
            used.columns()
                .any(|column| self.is_label(&sheet.value(row, column).display_text(locale)))
        });

        match found {
            Some(row) => debug!(sheet = sheet.name(), row, "header row located"),
            None => debug!(sheet = sheet.name(), "no header row found"),
        }
        found
    }

    /// Map header cells to columns. When two cells carry the same label, the
    /// rightmost one is used. Mappings without a header cell are left out.
    pub fn map_columns(
        &self,
        sheet: &Worksheet,
        header_row: u32,
        used: &CellRange,
        locale: &Locale,
    ) -> ColumnIndexMap {
        let by_label: HashMap<&str, usize> = self
            .metadata
            .columns()
            .iter()
            .enumerate()
            .map(|(index, mapping)| (mapping.normalized_name(), index))
            .collect();

        let mut found: HashMap<usize, u32> = HashMap::new();
        for column in used.columns() {
            let text = normalize_label(&sheet.value(header_row, column).display_text(locale));
            if let Some(&index) = by_label.get(text.as_str()) {
                if let Some(previous) = found.insert(index, column) {
                    trace!(label = %text, previous, column, "duplicate header, keeping the later column");
                }
            }
        }

        let mut entries: Vec<(usize, u32)> = found.into_iter().collect();
        entries.sort_by_key(|(_, column)| *column);
        ColumnIndexMap { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Workbook;
    use crate::mapping::{resolve, ExcelModel, ModelBuilder};

    #[derive(Default)]
    struct Row {
        id: i32,
        name: String,
        city: String,
    }

    impl ExcelModel for Row {
        fn describe(model: &mut ModelBuilder<Self>) {
            model.column("id", "Id", |r: &Row| r.id, |r, v| r.id = v);
            model.column("name", "Full Name", |r: &Row| r.name.clone(), |r, v| r.name = v);
            model.column("city", "City", |r: &Row| r.city.clone(), |r, v| r.city = v);
        }
    }

    #[test]
    fn test_locate_skips_decorative_rows() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        sheet.set_value(1, 1, "Quarterly export");
        sheet.set_value(2, 3, "generated 2024-01-01");
        sheet.set_value(3, 2, " FULL NAME ");
        sheet.set_value(3, 3, "Id");
        sheet.set_value(3, 4, "Unrelated");
        sheet.set_value(4, 2, "Ada");

        let metadata = resolve::<Row>().unwrap();
        let locator = HeaderLocator::new(&metadata);
        let used = sheet.used_range().unwrap();
        let locale = Locale::invariant();

        let header = locator.locate(sheet, &used, &locale);
        assert_eq!(header, Some(3));

        let columns = locator.map_columns(sheet, 3, &used, &locale);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.column_of(1), Some(2));
        assert_eq!(columns.column_of(0), Some(3));
        assert_eq!(columns.column_of(2), None);

        let order: Vec<&str> = columns.iter(&metadata).map(|(m, _)| m.field_name()).collect();
        assert_eq!(order, vec!["name", "id"]);
    }

    #[test]
    fn test_duplicate_header_keeps_rightmost() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        sheet.set_value(1, 1, "City");
        sheet.set_value(1, 4, "city");

        let metadata = resolve::<Row>().unwrap();
        let locator = HeaderLocator::new(&metadata);
        let used = sheet.used_range().unwrap();
        let columns = locator.map_columns(sheet, 1, &used, &Locale::invariant());
        assert_eq!(columns.column_of(2), Some(4));
    }

    #[test]
    fn test_no_header_row() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        sheet.set_value(1, 1, "nothing");
        sheet.set_value(2, 1, 42.0);

        let metadata = resolve::<Row>().unwrap();
        let used = sheet.used_range().unwrap();
        assert_eq!(HeaderLocator::new(&metadata).locate(sheet, &used, &Locale::invariant()), None);
    }
}
