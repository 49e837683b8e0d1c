//! Routing of records to worksheets, and where each sheet's table starts

use std::fmt;

use crate::error::{SheetError, SheetResult};

type Condition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Sheet used when no targeting rule is registered
pub const DEFAULT_TARGET_SHEET: &str = "Export";

/// Top-left cell of a table: the header row and its first column, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableOrigin {
    pub row: u32,
    pub column: u32,
}

impl TableOrigin {
    pub const TOP_LEFT: TableOrigin = TableOrigin { row: 1, column: 1 };
}

/// Sends the records satisfying all of its conditions to `sheet_name`,
/// starting the table at an optional row and column.
///
/// Reading uses the same rule to find the table: the header is searched
/// from the start row down and from the start column rightwards.
pub struct TargetingRule<T> {
    sheet_name: String,
    start_row: Option<u32>,
    start_column: Option<u32>,
    conditions: Vec<Condition<T>>,
}

impl<T> fmt::Debug for TargetingRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetingRule")
            .field("sheet_name", &self.sheet_name)
            .field("start_row", &self.start_row)
            .field("start_column", &self.start_column)
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

impl<T> TargetingRule<T> {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            start_row: None,
            start_column: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Only route records for which `condition` holds. Without conditions the
    /// rule takes every record.
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn with_start_row(mut self, row: u32) -> Self {
        self.start_row = Some(row);
        self
    }

    pub fn with_start_column(mut self, column: u32) -> Self {
        self.start_column = Some(column);
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn start_row(&self) -> Option<u32> {
        self.start_row
    }

    pub fn start_column(&self) -> Option<u32> {
        self.start_column
    }

    pub fn origin(&self) -> TableOrigin {
        TableOrigin {
            row: self.start_row.unwrap_or(TableOrigin::TOP_LEFT.row),
            column: self.start_column.unwrap_or(TableOrigin::TOP_LEFT.column),
        }
    }

    pub fn matches(&self, record: &T) -> bool {
        self.conditions.iter().all(|condition| condition(record))
    }

    pub(crate) fn validate(&self) -> SheetResult<()> {
        let fail = |message: &str| {
            SheetError::Configuration(format!("targeting rule '{}': {}", self.sheet_name, message))
        };
        if self.sheet_name.trim().is_empty() {
            return Err(fail("sheet name is empty"));
        }
        if self.start_row == Some(0) {
            return Err(fail("start row is 1-based"));
        }
        if self.start_column == Some(0) {
            return Err(fail("start column is 1-based"));
        }
        Ok(())
    }
}
