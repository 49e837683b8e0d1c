//! Excel exporter implementation - Workbook → .xlsx

use crate::document::{datetime_to_serial, Cell, CellValue, Workbook, Worksheet};
use crate::error::{SheetError, SheetResult};
use crate::style::{BorderStyle, CellStyle, Rgba, TextStyle};
use rust_xlsxwriter::{
    Color, DataValidation, Format, FormatBorder, FormatPattern, FormatUnderline, Formula, Note,
    Workbook as XlsxWorkbook, Worksheet as XlsxWorksheet,
};
use std::path::Path;
use tracing::debug;

/// Number format for date cells that carry none
const FALLBACK_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes an in-memory workbook to the .xlsx format
pub struct ExcelExporter<'a> {
    workbook: &'a Workbook,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// Save the workbook to an .xlsx file
    pub fn export(&self, output_path: &Path) -> SheetResult<()> {
        let mut workbook = self.build()?;
        workbook
            .save(output_path)
            .map_err(|e| SheetError::Export(format!("Failed to save Excel file: {}", e)))?;

        debug!(path = %output_path.display(), sheets = self.workbook.len(), "workbook exported");
        Ok(())
    }

    /// Render the workbook to .xlsx bytes
    pub fn export_to_buffer(&self) -> SheetResult<Vec<u8>> {
        let mut workbook = self.build()?;
        workbook
            .save_to_buffer()
            .map_err(|e| SheetError::Export(format!("Failed to render Excel file: {}", e)))
    }

    fn build(&self) -> SheetResult<XlsxWorkbook> {
        let mut workbook = XlsxWorkbook::new();
        for sheet in self.workbook.worksheets() {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(sheet.name())
                .map_err(|e| SheetError::Export(format!("Failed to set worksheet name: {}", e)))?;
            Self::export_sheet(worksheet, sheet)?;
        }
        Ok(workbook)
    }

    /// Export one worksheet: layout, cells, notes, then list validations
    fn export_sheet(worksheet: &mut XlsxWorksheet, sheet: &Worksheet) -> SheetResult<()> {
        if sheet.is_hidden() {
            worksheet.set_hidden(true);
        }
        if let Some(height) = sheet.default_row_height() {
            worksheet.set_default_row_height(height);
        }

        for (column, width) in sheet.column_widths() {
            worksheet
                .set_column_width(to_col(column)?, width)
                .map_err(|e| SheetError::Export(format!("Failed to set column width: {}", e)))?;
        }
        for (row, height) in sheet.row_heights() {
            worksheet
                .set_row_height(to_row(row), height)
                .map_err(|e| SheetError::Export(format!("Failed to set row height: {}", e)))?;
        }

        for ((row, column), cell) in sheet.cells() {
            let (row, col) = (to_row(row), to_col(column)?);
            Self::write_cell(worksheet, row, col, cell)?;

            if let Some(comment) = &cell.comment {
                let note = Note::new(comment).add_author_prefix(false);
                worksheet
                    .insert_note(row, col, &note)
                    .map_err(|e| SheetError::Export(format!("Failed to add note: {}", e)))?;
            }
        }

        for validation in sheet.list_validations() {
            let (row, col) = (to_row(validation.row), to_col(validation.column)?);
            let rule = DataValidation::new().allow_list_formula(Formula::new(validation.source_formula()));
            worksheet
                .add_data_validation(row, col, row, col, &rule)
                .map_err(|e| SheetError::Export(format!("Failed to add list validation: {}", e)))?;
        }

        Ok(())
    }

    /// Write a single cell value with its format
    fn write_cell(worksheet: &mut XlsxWorksheet, row: u32, col: u16, cell: &Cell) -> SheetResult<()> {
        let format = cell_format(cell);
        let result = match &cell.value {
            CellValue::Empty => worksheet.write_blank(row, col, &format),
            CellValue::Number(value) => worksheet.write_number_with_format(row, col, *value, &format),
            CellValue::Text(value) | CellValue::Error(value) => {
                worksheet.write_string_with_format(row, col, value, &format)
            }
            CellValue::Bool(value) => worksheet.write_boolean_with_format(row, col, *value, &format),
            CellValue::DateTime(value) => {
                let format = match cell.number_format {
                    Some(_) => format,
                    None => format.set_num_format(FALLBACK_DATE_FORMAT),
                };
                worksheet.write_number_with_format(row, col, datetime_to_serial(value), &format)
            }
        };

        result
            .map(|_| ())
            .map_err(|e| SheetError::Export(format!("Failed to write cell {}: {}", cell.value.type_name(), e)))
    }
}

fn to_row(row: u32) -> u32 {
    row.saturating_sub(1)
}

fn to_col(column: u32) -> SheetResult<u16> {
    u16::try_from(column.saturating_sub(1))
        .map_err(|_| SheetError::Export(format!("Column {} is out of range", column)))
}

fn color(value: Option<Rgba>) -> Option<Color> {
    value
        .filter(|c| !c.is_transparent())
        .map(|c| Color::RGB(c.to_rgb_u32()))
}

fn border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::DashDot => FormatBorder::DashDot,
        BorderStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Thin => FormatBorder::Thin,
    }
}

/// Translate a cell's style and number format into an xlsx format
fn cell_format(cell: &Cell) -> Format {
    let mut format = match &cell.style {
        Some(style) => style_format(style),
        None => Format::new(),
    };
    if let Some(number_format) = &cell.number_format {
        format = format.set_num_format(number_format);
    }
    format
}

fn style_format(style: &CellStyle) -> Format {
    let mut format = Format::new()
        .set_border_top(border(style.borders.top))
        .set_border_bottom(border(style.borders.bottom))
        .set_border_left(border(style.borders.left))
        .set_border_right(border(style.borders.right));

    if let Some(text) = color(style.text_color) {
        format = format.set_font_color(text);
    }
    if let Some(fill) = color(style.background_color) {
        format = format.set_background_color(fill).set_pattern(FormatPattern::Solid);
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if style.text_style.contains(TextStyle::BOLD) {
        format = format.set_bold();
    }
    if style.text_style.contains(TextStyle::ITALIC) {
        format = format.set_italic();
    }
    if style.text_style.contains(TextStyle::UNDERLINE) {
        format = format.set_underline(FormatUnderline::Single);
    }
    format
}
