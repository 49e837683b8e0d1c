//! Conditional styling rules evaluated against a record while writing data cells

use super::CellStyle;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

type Condition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A rule is satisfied when all of its conditions hold for a record. It then
/// yields `style_when_true`, otherwise `style_when_false`; a branch without a
/// style leaves the cell style untouched.
pub struct StylingRule<T> {
    target_fields: BTreeSet<String>,
    conditions: Vec<Condition<T>>,
    style_when_true: Option<CellStyle>,
    style_when_false: Option<CellStyle>,
}

impl<T> Default for StylingRule<T> {
    fn default() -> Self {
        Self {
            target_fields: BTreeSet::new(),
            conditions: Vec::new(),
            style_when_true: None,
            style_when_false: None,
        }
    }
}

impl<T> fmt::Debug for StylingRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StylingRule")
            .field("target_fields", &self.target_fields)
            .field("conditions", &self.conditions.len())
            .field("style_when_true", &self.style_when_true)
            .field("style_when_false", &self.style_when_false)
            .finish()
    }
}

impl<T> StylingRule<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the rule to the column bound to `field` (the field name, not the header text)
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.target_fields.insert(field.into());
        self
    }

    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn when_true(mut self, style: CellStyle) -> Self {
        self.style_when_true = Some(style);
        self
    }

    pub fn when_false(mut self, style: CellStyle) -> Self {
        self.style_when_false = Some(style);
        self
    }

    pub fn target_fields(&self) -> impl Iterator<Item = &str> {
        self.target_fields.iter().map(String::as_str)
    }

    /// Every condition is evaluated; the rule holds only if all of them do
    pub fn is_satisfied(&self, record: &T) -> bool {
        self.conditions
            .iter()
            .fold(true, |all, condition| condition(record) && all)
    }

    /// Style of the matched branch, if that branch has one
    pub fn evaluate(&self, record: &T) -> Option<&CellStyle> {
        if self.is_satisfied(record) {
            self.style_when_true.as_ref()
        } else {
            self.style_when_false.as_ref()
        }
    }
}

/// Rules grouped by the field they target, built once per export run
pub struct StylingLookup<'a, T> {
    rules_by_field: HashMap<&'a str, Vec<&'a StylingRule<T>>>,
}

impl<'a, T> StylingLookup<'a, T> {
    pub fn new(rules: &'a [StylingRule<T>]) -> Self {
        let mut rules_by_field: HashMap<&'a str, Vec<&'a StylingRule<T>>> = HashMap::new();
        for rule in rules {
            // a rule targeting several fields is registered under each of them
            for field in &rule.target_fields {
                rules_by_field.entry(field.as_str()).or_default().push(rule);
            }
        }
        Self { rules_by_field }
    }

    pub fn rules_for(&self, field: &str) -> &[&'a StylingRule<T>] {
        self.rules_by_field
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Effective style of `field` for `record`: starts at `default_style`, and
    /// every rule whose matched branch has a style replaces it, so later rules win.
    pub fn resolve_style(&self, field: &str, record: &T, default_style: &CellStyle) -> CellStyle {
        self.rules_for(field)
            .iter()
            .fold(default_style, |current, rule| {
                rule.evaluate(record).unwrap_or(current)
            })
            .clone()
    }
}
