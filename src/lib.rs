//! Sheetbind - typed records to styled Excel worksheets and back
//!
//! A record type declares its columns once; the crate then writes records to
//! a worksheet and reads them back with per-cell validation.
//!
//! # Features
//!
//! - Column mapping with header text, width, format specifier and conditional columns
//! - Enum fields written as display labels, with a hidden dropdown sheet and list validation
//! - Conditional cell styling rules evaluated per record
//! - Targeting rules routing records to several sheets, each table at its own start cell
//! - Tolerant import: the header row is located anywhere in the used range
//! - Per-field validation (required, string length, numeric range) that never aborts a read
//! - Failing cells annotated with the error style and a comment
//! - .xlsx export and import
//!
//! # Example
//!
//! ```
//! use sheetbind::{
//!     excel_enum, CellStyle, ExcelModel, ExcelSynchronizer, ExporterOptions, ModelBuilder, Rgba,
//!     StylingRule,
//! };
//!
//! excel_enum! {
//!     #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
//!     pub enum Department {
//!         #[default]
//!         Sales,
//!         Finance => "Finance & Control",
//!     }
//! }
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Budget {
//!     id: i32,
//!     department: Department,
//!     amount: f64,
//! }
//!
//! impl ExcelModel for Budget {
//!     fn describe(model: &mut ModelBuilder<Self>) {
//!         model.column("id", "Id", |b: &Budget| b.id, |b, v| b.id = v);
//!         model.column("department", "Department", |b: &Budget| b.department, |b, v| b.department = v);
//!         model
//!             .column("amount", "Amount", |b: &Budget| b.amount, |b, v| b.amount = v)
//!             .width(14);
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), sheetbind::SheetError> {
//! let red = CellStyle::default_data().with_text_color(Rgba::rgb(255, 0, 0));
//! let options = ExporterOptions::new().add_styling_rule(
//!     StylingRule::new()
//!         .for_field("amount")
//!         .with_condition(|b: &Budget| b.amount < 0.0)
//!         .when_true(red),
//! );
//! let sync = ExcelSynchronizer::new(options);
//!
//! let budgets = vec![Budget { id: 1, department: Department::Finance, amount: -12.5 }];
//! let workbook = sync.generate_workbook("Budgets", None, &budgets).await?;
//!
//! let result = sync.read_workbook("Budgets", &workbook, None).await?;
//! assert_eq!(result.records, budgets);
//! assert!(result.is_valid());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod core;
pub mod document;
pub mod error;
pub mod excel;
pub mod header;
pub mod locale;
pub mod mapping;
pub mod style;
pub mod types;

// Re-export commonly used types
pub use crate::core::{
    ApprovedFields, ColumnApproval, ExcelSynchronizer, ExporterOptions, TableOrigin, TargetingRule,
    DEFAULT_TARGET_SHEET,
};
pub use document::{Cell, CellRange, CellValue, Workbook, Worksheet};
pub use error::{SheetError, SheetResult};
pub use excel::{ExcelExporter, ExcelImporter};
pub use locale::Locale;
pub use mapping::{ExcelEnum, ExcelModel, ExcelValue, ModelBuilder};
pub use style::{BorderStyle, Borders, CellStyle, Rgba, StyleSheet, StylingRule, TextStyle};
pub use types::{ExcelAddress, ExcelCellValidationResult, ExcelReadResult};
