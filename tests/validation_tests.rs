//! Per-cell validation on read and annotation of failing cells

mod common;

use common::*;
use pretty_assertions::assert_eq;
use sheetbind::{
    CellStyle, CellValue, ExcelAddress, ExcelCellValidationResult, ExcelModel, ExcelSynchronizer,
    ExporterOptions, ModelBuilder, Rgba, TextStyle, Workbook,
};

async fn generated() -> (ExcelSynchronizer<Employee>, Workbook) {
    let sync = ExcelSynchronizer::<Employee>::default();
    let workbook = sync
        .generate_workbook("Employees", None, &employees())
        .await
        .unwrap();
    (sync, workbook)
}

/// Blank name and missing email on row 2; long name and young age on row 3
fn break_rows(workbook: &mut Workbook) {
    let sheet = workbook.worksheet_mut("Employees").unwrap();
    sheet.set_value(2, column_of("Name"), "   ");
    sheet.set_value(2, column_of("Email"), CellValue::Empty);
    sheet.set_value(3, column_of("Name"), "Bartholomew Montgomery-Smythe");
    sheet.set_value(3, column_of("Age"), 12.0);
}

fn failure(row: u32, header: &str, message: &str) -> ExcelCellValidationResult {
    ExcelCellValidationResult {
        address: ExcelAddress::new("Employees", row, column_of(header), header),
        messages: vec![message.to_string()],
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATION ON READ
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_valid_sheet_has_no_results() {
    let (sync, workbook) = generated().await;
    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    assert!(result.is_valid());
    assert_eq!(result.failures().count(), 0);
}

#[tokio::test]
async fn test_invalid_records_are_still_returned() {
    init_tracing();
    let (sync, mut workbook) = generated().await;
    break_rows(&mut workbook);

    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.records[0].name, "   ");
    assert_eq!(result.records[0].email, None);
    assert_eq!(result.records[1].name, "Bartholomew Montgomery-Smythe");
    assert_eq!(result.records[1].age, Some(12));
    // untouched fields still come through
    assert_eq!(result.records[1].status, Status::OnLeave);
}

#[tokio::test]
async fn test_failure_messages_and_addresses() {
    let (sync, mut workbook) = generated().await;
    break_rows(&mut workbook);

    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();

    assert_eq!(
        result.validation_for(0).unwrap(),
        &[
            failure(2, "Name", "The Name field is required."),
            failure(2, "Email", "The Email field is required."),
        ]
    );
    assert_eq!(
        result.validation_for(1).unwrap(),
        &[
            failure(
                3,
                "Name",
                "The field Name must be a string with a maximum length of 20."
            ),
            failure(3, "Age", "The field Age must be between 18 and 67."),
        ]
    );

    let address = &result.validation_for(1).unwrap()[1].address;
    assert_eq!(address.column_label, "G");
    assert_eq!(address.to_string(), "Employees!G3 (Age)");
}

#[tokio::test]
async fn test_only_failing_records_are_keyed() {
    let (sync, mut workbook) = generated().await;
    workbook
        .worksheet_mut("Employees")
        .unwrap()
        .set_value(3, column_of("Age"), 99.0);

    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    let keys: Vec<usize> = result.validation_results.keys().copied().collect();
    assert_eq!(keys, vec![1]);

    let invalid: Vec<i32> = result.invalid_records().map(|(e, _)| e.id).collect();
    assert_eq!(invalid, vec![2]);
}

#[tokio::test]
async fn test_mistyped_cells_read_as_absent() {
    let (sync, mut workbook) = generated().await;
    let sheet = workbook.worksheet_mut("Employees").unwrap();
    sheet.set_value(2, column_of("Id"), "one");
    sheet.set_value(2, column_of("Age"), "thirty");
    sheet.set_value(2, column_of("Active"), 1.0);
    sheet.set_value(2, column_of("Start Date"), "someday");

    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    let first = &result.records[0];
    assert_eq!(first.id, 0);
    assert_eq!(first.age, None);
    assert!(!first.active);
    assert_eq!(first.start_date, Employee::default().start_date);
    // an absent value only fails a required constraint
    assert!(result.is_valid());
}

#[tokio::test]
async fn test_out_of_range_integer_reads_as_absent() {
    let (sync, mut workbook) = generated().await;
    let sheet = workbook.worksheet_mut("Employees").unwrap();
    sheet.set_value(2, column_of("Age"), 300.0);
    sheet.set_value(2, column_of("Id"), 2.5);

    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    assert_eq!(result.records[0].age, None);
    // ties round to even
    assert_eq!(result.records[0].id, 2);
}

#[tokio::test]
async fn test_blank_rows_below_header_become_records() {
    let (sync, mut workbook) = generated().await;
    workbook
        .worksheet_mut("Employees")
        .unwrap()
        .set_value(5, column_of("Id"), 9.0);

    let result = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    assert_eq!(result.len(), 4);
    assert_eq!(result.records[3].id, 9);

    // the blank row 4 misses its required name and email
    let messages: Vec<&str> = result
        .validation_for(2)
        .unwrap()
        .iter()
        .flat_map(|f| f.messages.iter().map(String::as_str))
        .collect();
    assert_eq!(
        messages,
        vec!["The Name field is required.", "The Email field is required."]
    );
}

#[tokio::test]
async fn test_append_rekeys_second_sheet() {
    let (sync, mut workbook) = generated().await;
    break_rows(&mut workbook);
    let clean = sync.generate_workbook("Employees", None, &employees()).await.unwrap();

    let mut combined = sync.read_workbook("Employees", &clean, None).await.unwrap();
    let broken = sync.read_workbook("Employees", &workbook, None).await.unwrap();
    combined.append(broken);

    assert_eq!(combined.len(), 4);
    let keys: Vec<usize> = combined.validation_results.keys().copied().collect();
    assert_eq!(keys, vec![2, 3]);
}

// ═══════════════════════════════════════════════════════════════════════════
// ANNOTATION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_annotate_marks_failing_cells() {
    let (sync, mut workbook) = generated().await;
    break_rows(&mut workbook);

    let annotated = sync
        .validate_and_annotate_workbook("Employees", workbook, None)
        .await
        .unwrap();
    let sheet = annotated.worksheet("Employees").unwrap();

    let name = sheet.cell(2, column_of("Name")).unwrap();
    assert_eq!(name.style.as_ref(), Some(&CellStyle::default_error()));
    assert_eq!(name.comment.as_deref(), Some("The Name field is required."));

    let age = sheet.cell(3, column_of("Age")).unwrap();
    assert_eq!(age.comment.as_deref(), Some("The field Age must be between 18 and 67."));

    // passing cells keep their data style and get no comment
    let id = sheet.cell(2, column_of("Id")).unwrap();
    assert_eq!(id.style.as_ref(), Some(&CellStyle::default_data()));
    assert_eq!(id.comment, None);
}

#[tokio::test]
async fn test_annotate_valid_sheet_changes_nothing() {
    let (sync, workbook) = generated().await;
    let before = workbook.clone();
    let after = sync
        .validate_and_annotate_workbook("Employees", workbook, None)
        .await
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_annotate_uses_configured_error_style() {
    let error = CellStyle::default_data()
        .with_background_color(Rgba::rgb(255, 230, 0))
        .with_text_style(TextStyle::BOLD);
    let sync = ExcelSynchronizer::new(ExporterOptions::<Employee>::new().with_error_style(error.clone()));
    let mut workbook = sync
        .generate_workbook("Employees", None, &employees())
        .await
        .unwrap();
    break_rows(&mut workbook);

    let annotated = sync
        .validate_and_annotate_workbook("Employees", workbook, None)
        .await
        .unwrap();
    let email = annotated
        .worksheet("Employees")
        .unwrap()
        .cell(2, column_of("Email"))
        .unwrap();
    assert_eq!(email.style.as_ref(), Some(&error));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Account {
    code: String,
}

impl ExcelModel for Account {
    fn describe(model: &mut ModelBuilder<Self>) {
        model
            .column("code", "Code", |a: &Account| a.code.clone(), |a, v| a.code = v)
            .required()
            .length_between(5, 10);
    }
}

#[tokio::test]
async fn test_annotation_comment_lists_every_message() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet("Accounts").unwrap();
    sheet.set_value(1, 1, "Code");
    sheet.set_value(2, 1, "  ");
    sheet.set_value(3, 1, "ACC-001");

    let sync = ExcelSynchronizer::<Account>::default();
    let annotated = sync
        .validate_and_annotate_workbook("Accounts", workbook, None)
        .await
        .unwrap();
    let sheet = annotated.worksheet("Accounts").unwrap();

    assert_eq!(
        sheet.cell(2, 1).unwrap().comment.as_deref(),
        Some(
            "The Code field is required.\n\
             The field Code must be a string with a minimum length of 5 and a maximum length of 10."
        )
    );
    assert_eq!(sheet.cell(3, 1).unwrap().comment, None);
}

#[tokio::test]
async fn test_annotate_missing_sheet_is_an_error() {
    let (sync, workbook) = generated().await;
    assert!(sync
        .validate_and_annotate_workbook("Staff", workbook, None)
        .await
        .is_err());
}
