//! Field constraints checked against decoded values on import

use super::value::NativeValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// A value must be present; blank text counts as missing
    Required,
    /// Text length in characters, inclusive. `min == 0` means no lower bound.
    StringLength { min: usize, max: usize },
    /// Numeric value, inclusive
    Range { min: f64, max: f64 },
}

impl Constraint {
    /// Check `value` for the column titled `header`, returning the failure
    /// message. Absent values only fail `Required`.
    pub fn check(&self, header: &str, value: Option<&NativeValue>) -> Option<String> {
        let value = value.filter(|v| !v.is_empty());
        match self {
            Constraint::Required => {
                let present = match value {
                    Some(NativeValue::Text(text)) => !text.trim().is_empty(),
                    Some(_) => true,
                    None => false,
                };
                (!present).then(|| format!("The {} field is required.", header))
            }
            Constraint::StringLength { min, max } => {
                let length = value?.as_text()?.chars().count();
                if length >= *min && length <= *max {
                    return None;
                }
                Some(if *min == 0 {
                    format!(
                        "The field {} must be a string with a maximum length of {}.",
                        header, max
                    )
                } else {
                    format!(
                        "The field {} must be a string with a minimum length of {} and a maximum length of {}.",
                        header, min, max
                    )
                })
            }
            Constraint::Range { min, max } => {
                let number = value?.as_f64()?;
                if number >= *min && number <= *max {
                    return None;
                }
                Some(format!("The field {} must be between {} and {}.", header, min, max))
            }
        }
    }
}

/// Messages from every failing constraint, in declaration order
pub fn validate(constraints: &[Constraint], header: &str, value: Option<&NativeValue>) -> Vec<String> {
    constraints
        .iter()
        .filter_map(|c| c.check(header, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let required = Constraint::Required;
        assert_eq!(
            required.check("Email", None),
            Some("The Email field is required.".to_string())
        );
        assert!(required.check("Email", Some(&NativeValue::Text("  ".into()))).is_some());
        assert!(required.check("Email", Some(&NativeValue::Empty)).is_some());
        assert!(required.check("Age", Some(&NativeValue::I32(0))).is_none());
    }

    #[test]
    fn test_string_length_messages() {
        let max_only = Constraint::StringLength { min: 0, max: 5 };
        assert_eq!(
            max_only.check("Code", Some(&NativeValue::Text("abcdef".into()))),
            Some("The field Code must be a string with a maximum length of 5.".to_string())
        );
        assert!(max_only.check("Code", Some(&NativeValue::Text("abc".into()))).is_none());

        let bounded = Constraint::StringLength { min: 2, max: 5 };
        assert_eq!(
            bounded.check("Code", Some(&NativeValue::Text("a".into()))),
            Some(
                "The field Code must be a string with a minimum length of 2 and a maximum length of 5."
                    .to_string()
            )
        );
        assert!(bounded.check("Code", None).is_none());
    }

    #[test]
    fn test_range() {
        let range = Constraint::Range { min: 0.0, max: 100.0 };
        assert_eq!(
            range.check("Budget", Some(&NativeValue::F64(-200.42))),
            Some("The field Budget must be between 0 and 100.".to_string())
        );
        assert!(range.check("Budget", Some(&NativeValue::F64(50.0))).is_none());
        assert!(range.check("Budget", Some(&NativeValue::I32(100))).is_none());
        assert!(range.check("Budget", None).is_none());
    }

    #[test]
    fn test_validate_collects_all_failures() {
        let constraints = vec![Constraint::Required, Constraint::StringLength { min: 0, max: 3 }];
        assert_eq!(validate(&constraints, "Name", None).len(), 1);
        assert_eq!(
            validate(&constraints, "Name", Some(&NativeValue::Text("abcd".into()))).len(),
            1
        );
        assert!(validate(&constraints, "Name", Some(&NativeValue::Text("abc".into()))).is_empty());
    }
}
