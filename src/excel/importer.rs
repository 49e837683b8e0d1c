//! Excel importer implementation - .xlsx → Workbook

use crate::document::{serial_to_datetime, CellValue, Visibility, Workbook, Worksheet};
use crate::error::{SheetError, SheetResult};
use calamine::{open_workbook, Data, Range, Reader, SheetVisible, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads cell values and sheet visibility from .xlsx files
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the file into an in-memory workbook
    pub fn import(&self) -> SheetResult<Workbook> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| SheetError::Import(format!("Failed to open Excel file: {}", e)))?;
        let imported = read_workbook(&mut workbook)?;

        debug!(path = %self.path.display(), sheets = imported.len(), "workbook imported");
        Ok(imported)
    }

    /// Import .xlsx bytes into an in-memory workbook
    pub fn import_from_buffer(bytes: &[u8]) -> SheetResult<Workbook> {
        let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| SheetError::Import(format!("Failed to read Excel data: {}", e)))?;
        read_workbook(&mut workbook)
    }
}

fn read_workbook<RS: Read + Seek>(source: &mut Xlsx<RS>) -> SheetResult<Workbook> {
    let sheets = source.sheets_metadata().to_vec();
    let mut workbook = Workbook::new();

    for meta in sheets {
        let range = source
            .worksheet_range(&meta.name)
            .map_err(|e| SheetError::Import(format!("Failed to read worksheet '{}': {}", meta.name, e)))?;

        let sheet = workbook.add_worksheet(&meta.name)?;
        sheet.set_visibility(match meta.visible {
            SheetVisible::Visible => Visibility::Visible,
            SheetVisible::Hidden => Visibility::Hidden,
            SheetVisible::VeryHidden => Visibility::VeryHidden,
        });
        copy_range(sheet, &range);
    }

    Ok(workbook)
}

/// Copy non-empty values; calamine ranges start at the first used cell
fn copy_range(sheet: &mut Worksheet, range: &Range<Data>) {
    let Some((start_row, start_col)) = range.start() else {
        return;
    };

    for (row, col, data) in range.used_cells() {
        let value = convert_cell(data);
        if !value.is_empty() {
            sheet.set_value(start_row + row as u32 + 1, start_col + col as u32 + 1, value);
        }
    }
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(text) => parse_iso(text)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(text.clone())),
        Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
