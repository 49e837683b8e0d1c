//! Shared record types and fixtures for the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use sheetbind::document::Worksheet;
use sheetbind::{excel_enum, ExcelModel, ModelBuilder};

excel_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Department {
        #[default]
        ValueA => "DisplayValue",
        ValueB => "Finance",
        ValueC,
    }
}

excel_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Status {
        #[default]
        Active,
        OnLeave => "On leave",
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub department: Department,
    pub status: Status,
    pub budget: f64,
    pub age: Option<u8>,
    pub start_date: NaiveDate,
    pub active: bool,
    pub bonus: f64,
}

impl ExcelModel for Employee {
    fn describe(model: &mut ModelBuilder<Self>) {
        model.column("id", "Id", |e: &Employee| e.id, |e, v| e.id = v);
        model
            .column("name", "Name", |e: &Employee| e.name.clone(), |e, v| e.name = v)
            .width(24)
            .required()
            .max_length(20);
        model
            .column("email", "Email", |e: &Employee| e.email.clone(), |e, v| e.email = v)
            .width(32)
            .required();
        model.column("department", "Department", |e: &Employee| e.department, |e, v| e.department = v);
        model.column("status", "Status", |e: &Employee| e.status, |e, v| e.status = v);
        model.column("budget", "Budget", |e: &Employee| e.budget, |e, v| e.budget = v);
        model
            .column("age", "Age", |e: &Employee| e.age, |e, v| e.age = v)
            .range(18.0, 67.0);
        model.column("start_date", "Start Date", |e: &Employee| e.start_date, |e, v| e.start_date = v);
        model.column("active", "Active", |e: &Employee| e.active, |e, v| e.active = v);
        model
            .column("bonus", "Bonus", |e: &Employee| e.bonus, |e, v| e.bonus = v)
            .conditional();
    }
}

/// Headers of the always-emitted columns, in order
pub const HEADERS: [&str; 9] = [
    "Id",
    "Name",
    "Email",
    "Department",
    "Status",
    "Budget",
    "Age",
    "Start Date",
    "Active",
];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn employees() -> Vec<Employee> {
    vec![
        Employee {
            id: 1,
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            department: Department::ValueB,
            status: Status::Active,
            budget: -200.42,
            age: Some(36),
            start_date: date(2021, 3, 1),
            active: true,
            bonus: 0.0,
        },
        Employee {
            id: 2,
            name: "Grace Hopper".to_string(),
            email: Some("grace@example.com".to_string()),
            department: Department::ValueA,
            status: Status::OnLeave,
            budget: 50.0,
            age: None,
            start_date: date(2019, 11, 15),
            active: false,
            bonus: 0.0,
        },
    ]
}

/// Write the header labels on `row`, starting at `first_column`
pub fn write_headers(sheet: &mut Worksheet, row: u32, first_column: u32) {
    for (offset, header) in HEADERS.iter().enumerate() {
        sheet.set_value(row, first_column + offset as u32, *header);
    }
}

/// Column of `header` in a sheet laid out by `write_headers(_, _, 1)`
pub fn column_of(header: &str) -> u32 {
    HEADERS
        .iter()
        .position(|h| *h == header)
        .map(|p| p as u32 + 1)
        .unwrap()
}

/// Route crate logs to the test output; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
