//! Excel file bridge for in-memory workbooks
//!
//! - Export: Workbook → .xlsx with styles, notes and dropdown validations
//! - Import: .xlsx → Workbook with cell values and sheet visibility

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
