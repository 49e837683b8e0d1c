//! Construction-time exporter configuration

use super::targeting::TargetingRule;
use crate::error::SheetResult;
use crate::style::{CellStyle, StyleSheet, StylingRule};
use std::path::Path;

/// Default styles, styling rules and targeting rules for one record type
#[derive(Debug)]
pub struct ExporterOptions<T> {
    styles: StyleSheet,
    rules: Vec<StylingRule<T>>,
    targeting: Vec<TargetingRule<T>>,
}

impl<T> Default for ExporterOptions<T> {
    fn default() -> Self {
        Self {
            styles: StyleSheet::default(),
            rules: Vec::new(),
            targeting: Vec::new(),
        }
    }
}

impl<T> ExporterOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_style(mut self, style: CellStyle) -> Self {
        self.styles.header = style;
        self
    }

    pub fn with_data_style(mut self, style: CellStyle) -> Self {
        self.styles.data = style;
        self
    }

    pub fn with_error_style(mut self, style: CellStyle) -> Self {
        self.styles.error = style;
        self
    }

    pub fn with_style_sheet(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    /// Load the three default styles from a YAML file
    pub fn with_style_sheet_file(self, path: &Path) -> SheetResult<Self> {
        Ok(self.with_style_sheet(StyleSheet::from_path(path)?))
    }

    /// Register a rule; rules registered later win for the same field
    pub fn add_styling_rule(mut self, rule: StylingRule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Register a sheet for targeted generation and reading. Rules keep their
    /// registration order.
    pub fn add_targeting_rule(mut self, rule: TargetingRule<T>) -> Self {
        self.targeting.push(rule);
        self
    }

    pub fn header_style(&self) -> &CellStyle {
        &self.styles.header
    }

    pub fn data_style(&self) -> &CellStyle {
        &self.styles.data
    }

    pub fn error_style(&self) -> &CellStyle {
        &self.styles.error
    }

    pub fn rules(&self) -> &[StylingRule<T>] {
        &self.rules
    }

    pub fn targeting_rules(&self) -> &[TargetingRule<T>] {
        &self.targeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgba;

    #[test]
    fn test_defaults() {
        let options = ExporterOptions::<()>::new();
        assert_eq!(options.header_style(), &CellStyle::default_header());
        assert_eq!(options.data_style(), &CellStyle::default_data());
        assert_eq!(options.error_style(), &CellStyle::default_error());
        assert!(options.rules().is_empty());
        assert!(options.targeting_rules().is_empty());
    }

    #[test]
    fn test_builders_replace_styles_and_keep_rule_order() {
        let red = CellStyle::default_data().with_text_color(Rgba::rgb(255, 0, 0));
        let options = ExporterOptions::<i32>::new()
            .with_data_style(red.clone())
            .add_styling_rule(StylingRule::new().for_field("a"))
            .add_styling_rule(StylingRule::new().for_field("b"));

        assert_eq!(options.data_style(), &red);
        let fields: Vec<&str> = options.rules().iter().flat_map(|r| r.target_fields()).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_targeting_rules_keep_order() {
        let options = ExporterOptions::<i32>::new()
            .add_targeting_rule(TargetingRule::new("Positive").with_condition(|n: &i32| *n > 0))
            .add_targeting_rule(TargetingRule::new("Rest").with_start_row(3));

        let sheets: Vec<&str> = options.targeting_rules().iter().map(|r| r.sheet_name()).collect();
        assert_eq!(sheets, vec!["Positive", "Rest"]);
        assert_eq!(options.targeting_rules()[1].start_row(), Some(3));
    }
}
