//! Workbook generation, reading and validation for mapped record types

mod approval;
mod generator;
mod options;
mod reader;
mod targeting;

pub use approval::{ApprovedFields, ColumnApproval};
pub use generator::HEADER_ROW;
pub use options::ExporterOptions;
pub use targeting::{TableOrigin, TargetingRule, DEFAULT_TARGET_SHEET};

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::document::Workbook;
use crate::error::SheetResult;
use crate::locale::Locale;
use crate::mapping::{self, ExcelModel, TypeMetadata};
use crate::types::ExcelReadResult;
use generator::Generation;

/// Generates, reads and annotates worksheets of `T` records.
///
/// Styles, styling rules and targeting rules are fixed at construction. The type metadata is
/// shared between synchronizers; the documents passed in are not, and must not
/// be used by two calls at once.
#[derive(Debug, Default)]
pub struct ExcelSynchronizer<T: ExcelModel> {
    options: ExporterOptions<T>,
}

impl<T: ExcelModel> ExcelSynchronizer<T> {
    pub fn new(options: ExporterOptions<T>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExporterOptions<T> {
        &self.options
    }

    pub fn metadata(&self) -> SheetResult<Arc<TypeMetadata<T>>> {
        mapping::resolve::<T>()
    }

    /// Registered targeting rules, or `default_rule` when there are none
    fn resolve_targeting<'a>(
        &'a self,
        default_rule: &'a TargetingRule<T>,
    ) -> SheetResult<Vec<&'a TargetingRule<T>>> {
        let rules = self.options.targeting_rules();
        for rule in rules {
            rule.validate()?;
        }
        if rules.is_empty() {
            return Ok(vec![default_rule]);
        }
        Ok(rules.iter().collect())
    }

    /// New workbook with `data` on `sheet_name`. Conditional columns are left out.
    pub async fn generate_workbook(
        &self,
        sheet_name: &str,
        locale: Option<&Locale>,
        data: &[T],
    ) -> SheetResult<Workbook> {
        let mut workbook = Workbook::new();
        self.generate_into(&mut workbook, sheet_name, locale, data, None)
            .await?;
        Ok(workbook)
    }

    /// New workbook with `data` on `sheet_name`, asking `approval` once per
    /// conditional column
    pub async fn generate_workbook_with(
        &self,
        sheet_name: &str,
        locale: Option<&Locale>,
        data: &[T],
        approval: &dyn ColumnApproval,
    ) -> SheetResult<Workbook> {
        let mut workbook = Workbook::new();
        self.generate_into(&mut workbook, sheet_name, locale, data, Some(approval))
            .await?;
        Ok(workbook)
    }

    /// Write `data` into `workbook`, reusing `sheet_name` if it exists
    pub async fn generate_into(
        &self,
        workbook: &mut Workbook,
        sheet_name: &str,
        locale: Option<&Locale>,
        data: &[T],
        approval: Option<&dyn ColumnApproval>,
    ) -> SheetResult<()> {
        let metadata = self.metadata()?;
        let invariant = Locale::invariant();
        let locale = locale.unwrap_or(&invariant);
        locale.validate()?;
        let approved = generator::approve_conditional_columns(&metadata, approval).await;

        Generation {
            metadata: &metadata,
            options: &self.options,
            locale,
            approved: &approved,
        }
        .write(workbook, sheet_name, data)
    }

    /// New workbook with one table per targeting rule, each holding the records
    /// its conditions match. Without rules every record goes to
    /// [`DEFAULT_TARGET_SHEET`].
    pub async fn generate_targeted_workbook(
        &self,
        locale: Option<&Locale>,
        data: &[T],
        approval: Option<&dyn ColumnApproval>,
    ) -> SheetResult<Workbook> {
        let metadata = self.metadata()?;
        let invariant = Locale::invariant();
        let locale = locale.unwrap_or(&invariant);
        locale.validate()?;
        let default_rule = TargetingRule::new(DEFAULT_TARGET_SHEET);
        let rules = self.resolve_targeting(&default_rule)?;
        let approved = generator::approve_conditional_columns(&metadata, approval).await;

        let mut workbook = Workbook::new();
        Generation {
            metadata: &metadata,
            options: &self.options,
            locale,
            approved: &approved,
        }
        .write_targeted(&mut workbook, &rules, data)?;
        Ok(workbook)
    }

    /// Read every targeted sheet into one result, in rule order. Sheets missing
    /// from `workbook` are skipped; a sheet and start cell shared by several
    /// rules is read once.
    pub async fn read_targeted_workbook(
        &self,
        workbook: &Workbook,
        locale: Option<&Locale>,
    ) -> SheetResult<ExcelReadResult<T>> {
        let metadata = self.metadata()?;
        let invariant = Locale::invariant();
        let locale = locale.unwrap_or(&invariant);
        locale.validate()?;
        let default_rule = TargetingRule::new(DEFAULT_TARGET_SHEET);

        let mut seen = HashSet::new();
        let mut result = ExcelReadResult::new();
        for rule in self.resolve_targeting(&default_rule)? {
            let (sheet_name, origin) = (rule.sheet_name(), rule.origin());
            if !seen.insert((sheet_name.to_lowercase(), origin)) {
                continue;
            }
            let Some(sheet) = workbook.try_worksheet(sheet_name) else {
                debug!(sheet = sheet_name, "targeted worksheet not in workbook");
                continue;
            };
            result.append(reader::read_region(sheet, &metadata, locale, origin));
        }
        Ok(result)
    }

    /// Read every targeted sheet, then mark each failing cell with the error
    /// style and a comment listing its messages
    pub async fn validate_and_annotate_targeted_workbook(
        &self,
        mut workbook: Workbook,
        locale: Option<&Locale>,
    ) -> SheetResult<Workbook> {
        let result = self.read_targeted_workbook(&workbook, locale).await?;
        reader::annotate(&mut workbook, &result, self.options.error_style())?;
        Ok(workbook)
    }

    /// Read `sheet_name` into records. Failing cells are reported, never fatal.
    pub async fn read_workbook(
        &self,
        sheet_name: &str,
        workbook: &Workbook,
        locale: Option<&Locale>,
    ) -> SheetResult<ExcelReadResult<T>> {
        let metadata = self.metadata()?;
        let invariant = Locale::invariant();
        let locale = locale.unwrap_or(&invariant);
        locale.validate()?;
        let sheet = workbook.worksheet(sheet_name)?;
        Ok(reader::read_sheet(sheet, &metadata, locale))
    }

    /// Read `sheet_name`, then mark every failing cell with the error style
    /// and a comment listing its messages
    pub async fn validate_and_annotate_workbook(
        &self,
        sheet_name: &str,
        mut workbook: Workbook,
        locale: Option<&Locale>,
    ) -> SheetResult<Workbook> {
        let result = self.read_workbook(sheet_name, &workbook, locale).await?;
        reader::annotate(&mut workbook, &result, self.options.error_style())?;
        Ok(workbook)
    }
}
