//! Cell values and the "try get as T" conversions

use super::serial::serial_to_datetime;
use crate::locale::Locale;
use crate::style::CellStyle;
use chrono::NaiveDateTime;
use std::fmt;

/// Value stored in a cell
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Error literal such as `#N/A`
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "Empty",
            CellValue::Number(_) => "Number",
            CellValue::Text(_) => "Text",
            CellValue::Bool(_) => "Bool",
            CellValue::DateTime(_) => "DateTime",
            CellValue::Error(_) => "Error",
        }
    }

    /// The text a spreadsheet application would show for this value
    pub fn display_text(&self, locale: &Locale) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => locale.format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::DateTime(dt) => locale.format_datetime(dt),
            CellValue::Error(e) => e.clone(),
        }
    }

    pub fn try_get<T: FromCellValue>(&self) -> Option<T> {
        T::from_cell_value(self)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text(&Locale::invariant()))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// Fallible typed read of a cell value; a mismatch is `None`, never a panic
pub trait FromCellValue: Sized {
    fn from_cell_value(value: &CellValue) -> Option<Self>;
}

impl FromCellValue for f64 {
    fn from_cell_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromCellValue for bool {
    fn from_cell_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Only text cells read as strings; other values go through `display_text`
impl FromCellValue for String {
    fn from_cell_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Date cells, or numbers interpreted as serial dates
impl FromCellValue for NaiveDateTime {
    fn from_cell_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(n) => serial_to_datetime(*n),
            _ => None,
        }
    }
}

/// One cell: value, optional style, optional comment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<CellStyle>,
    pub comment: Option<String>,
    /// Excel number format, set on date cells
    pub number_format: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn set_value(&mut self, value: impl Into<CellValue>) -> &mut Self {
        self.value = value.into();
        self
    }

    pub fn try_get<T: FromCellValue>(&self) -> Option<T> {
        self.value.try_get()
    }

    pub fn display_text(&self, locale: &Locale) -> String {
        self.value.display_text(locale)
    }

    pub fn apply_style(&mut self, style: &CellStyle) -> &mut Self {
        self.style = Some(style.clone());
        self
    }

    /// Attach a comment, replacing any previous one
    pub fn set_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.comment = Some(text.into());
        self
    }

    pub fn set_number_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.number_format = Some(format.into());
        self
    }
}
