//! Reads records back from a worksheet and annotates failing cells

use tracing::{debug, trace};

use super::targeting::TableOrigin;
use crate::codec;
use crate::document::{CellRange, Workbook, Worksheet};
use crate::error::SheetResult;
use crate::header::{ColumnIndexMap, HeaderLocator};
use crate::locale::Locale;
use crate::mapping::{ExcelModel, TypeMetadata};
use crate::style::CellStyle;
use crate::types::{ExcelAddress, ExcelCellValidationResult, ExcelReadResult};

/// Read every row below the header. A sheet without a header row yields an
/// empty result.
pub(crate) fn read_sheet<T: ExcelModel>(
    sheet: &Worksheet,
    metadata: &TypeMetadata<T>,
    locale: &Locale,
) -> ExcelReadResult<T> {
    read_region(sheet, metadata, locale, TableOrigin::TOP_LEFT)
}

/// Part of the used range at or below and right of `origin`
fn region_from(used: CellRange, origin: TableOrigin) -> Option<CellRange> {
    let first_row = used.first_row.max(origin.row);
    let first_column = used.first_column.max(origin.column);
    if first_row > used.last_row || first_column > used.last_column {
        return None;
    }
    Some(CellRange::new(first_row, first_column, used.last_row, used.last_column))
}

/// Like [`read_sheet`], but the header is only searched for at or below
/// `origin.row` and from `origin.column` rightwards
pub(crate) fn read_region<T: ExcelModel>(
    sheet: &Worksheet,
    metadata: &TypeMetadata<T>,
    locale: &Locale,
    origin: TableOrigin,
) -> ExcelReadResult<T> {
    let mut result = ExcelReadResult::new();

    let Some(used) = sheet.used_range().and_then(|used| region_from(used, origin)) else {
        debug!(sheet = sheet.name(), row = origin.row, column = origin.column, "nothing to read");
        return result;
    };

    let locator = HeaderLocator::new(metadata);
    let Some(header_row) = locator.locate(sheet, &used, locale) else {
        return result;
    };
    let columns = locator.map_columns(sheet, header_row, &used, locale);

    for row in header_row + 1..=used.last_row {
        let (record, failures) = read_row(sheet, metadata, &columns, row, locale);
        result.push(record, failures);
    }

    debug!(
        sheet = sheet.name(),
        header_row,
        columns = columns.len(),
        records = result.len(),
        invalid = result.validation_results.len(),
        "worksheet read"
    );
    result
}

fn read_row<T: ExcelModel>(
    sheet: &Worksheet,
    metadata: &TypeMetadata<T>,
    columns: &ColumnIndexMap,
    row: u32,
    locale: &Locale,
) -> (T, Vec<ExcelCellValidationResult>) {
    let mut record = T::default();
    let mut failures = Vec::new();

    for (mapping, column) in columns.iter(metadata) {
        let decoded = codec::decode(sheet.value(row, column), mapping.kind(), metadata, locale);
        let committed = decoded.filter(|value| mapping.assign(&mut record, value.clone()));

        let messages = mapping.validate(committed.as_ref());
        if !messages.is_empty() {
            let address = ExcelAddress::new(sheet.name(), row, column, mapping.display_name());
            trace!(cell = %address, ?messages, "validation failed");
            failures.push(ExcelCellValidationResult { address, messages });
        }
    }

    (record, failures)
}

/// Style each failing cell with `error_style` and attach its messages as a
/// comment, one per line. Each failure names its own sheet. Returns the
/// number of annotated cells.
pub(crate) fn annotate<T>(
    workbook: &mut Workbook,
    result: &ExcelReadResult<T>,
    error_style: &CellStyle,
) -> SheetResult<usize> {
    let mut annotated = 0;

    for failure in result.failures() {
        let address = &failure.address;
        workbook
            .worksheet_mut(&address.sheet_name)?
            .cell_mut(address.row_number, address.column_number)
            .apply_style(error_style)
            .set_comment(failure.messages.join("\n"));
        annotated += 1;
    }

    debug!(cells = annotated, "validation annotations written");
    Ok(annotated)
}
