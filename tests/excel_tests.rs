//! .xlsx export and import of generated workbooks

mod common;

use common::*;
use pretty_assertions::assert_eq;
use sheetbind::document::Visibility;
use sheetbind::{
    CellValue, ExcelExporter, ExcelImporter, ExcelSynchronizer, Locale, SheetError, Workbook,
};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FILE ROUND TRIP
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_export_import_file_round_trip() {
    init_tracing();
    let sync = ExcelSynchronizer::<Employee>::default();
    let data = employees();
    let workbook = sync.generate_workbook("Employees", None, &data).await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("employees.xlsx");
    ExcelExporter::new(&workbook).export(&path).unwrap();
    assert!(path.exists());

    let imported = ExcelImporter::new(&path).import().unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(imported.sheet_names()[0], "Employees");

    let dropdowns = &imported.worksheets()[1];
    assert!(dropdowns.name().starts_with("Dropdowns_"));
    assert_eq!(dropdowns.visibility(), Visibility::Hidden);
    assert_eq!(dropdowns.value(2, 1), &CellValue::Text("Finance".into()));

    let result = sync.read_workbook("Employees", &imported, None).await.unwrap();
    assert_eq!(result.records, data);
    assert!(result.is_valid());
}

#[tokio::test]
async fn test_dates_survive_file_round_trip() {
    let sync = ExcelSynchronizer::<Employee>::default();
    let german = Locale::de_de();
    let workbook = sync
        .generate_workbook("Employees", Some(&german), &employees())
        .await
        .unwrap();

    let bytes = ExcelExporter::new(&workbook).export_to_buffer().unwrap();
    let imported = ExcelImporter::import_from_buffer(&bytes).unwrap();
    let sheet = imported.worksheet("Employees").unwrap();

    assert_eq!(
        sheet.value(3, column_of("Start Date")),
        &CellValue::DateTime(date(2019, 11, 15).and_hms_opt(0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_annotated_workbook_exports() {
    let sync = ExcelSynchronizer::<Employee>::default();
    let mut workbook = sync
        .generate_workbook("Employees", None, &employees())
        .await
        .unwrap();
    workbook
        .worksheet_mut("Employees")
        .unwrap()
        .set_value(2, column_of("Email"), CellValue::Empty);

    let annotated = sync
        .validate_and_annotate_workbook("Employees", workbook, None)
        .await
        .unwrap();
    let bytes = ExcelExporter::new(&annotated).export_to_buffer().unwrap();
    assert!(bytes.starts_with(b"PK"));

    // the failure is still there after a reload
    let imported = ExcelImporter::import_from_buffer(&bytes).unwrap();
    let result = sync.read_workbook("Employees", &imported, None).await.unwrap();
    assert_eq!(result.failures().count(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORTER / IMPORTER EDGES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_empty_sheet() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet("Blank").unwrap();

    let bytes = ExcelExporter::new(&workbook).export_to_buffer().unwrap();
    let imported = ExcelImporter::import_from_buffer(&bytes).unwrap();
    assert_eq!(imported.sheet_names(), vec!["Blank"]);
    assert_eq!(imported.worksheet("Blank").unwrap().used_range(), None);
}

#[test]
fn test_import_keeps_cell_positions() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet("Offset").unwrap();
    sheet.set_value(4, 3, "Id");
    sheet.set_value(5, 3, 11.0);
    sheet.set_value(5, 4, true);

    let bytes = ExcelExporter::new(&workbook).export_to_buffer().unwrap();
    let imported = ExcelImporter::import_from_buffer(&bytes).unwrap();
    let sheet = imported.worksheet("Offset").unwrap();

    assert_eq!(sheet.value(4, 3), &CellValue::Text("Id".into()));
    assert_eq!(sheet.value(5, 3), &CellValue::Number(11.0));
    assert_eq!(sheet.value(5, 4), &CellValue::Bool(true));
}

#[test]
fn test_import_garbage_bytes_fails() {
    let err = ExcelImporter::import_from_buffer(b"not a workbook").unwrap_err();
    assert!(matches!(err, SheetError::Import(_)));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet("Data").unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.xlsx");
    let err = ExcelExporter::new(&workbook).export(&path).unwrap_err();
    assert!(matches!(err, SheetError::Export(_)));
}
