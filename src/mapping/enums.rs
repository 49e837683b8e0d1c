//! Enumeration support: member labels, the per-type label dictionary and the
//! `excel_enum!` declaration macro

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::value::{EnumKey, EnumValue, NativeValue, ScalarKind, ValueKind};

/// One declared enum member
#[derive(Debug, Clone, Copy)]
pub struct EnumVariant<E: 'static> {
    pub name: &'static str,
    /// Display label; the member name is used when absent
    pub label: Option<&'static str>,
    pub value: E,
}

impl<E> EnumVariant<E> {
    pub fn display_label(&self) -> &'static str {
        self.label.unwrap_or(self.name)
    }
}

/// Enumeration whose members can be written to and read from cells by label.
///
/// Implemented by [`excel_enum!`](crate::excel_enum).
pub trait ExcelEnum: Copy + PartialEq + Send + Sync + 'static {
    const VARIANTS: &'static [EnumVariant<Self>];

    fn numeric_value(self) -> i64;

    fn variant(self) -> Option<&'static EnumVariant<Self>> {
        Self::VARIANTS.iter().find(|v| v.value == self)
    }
}

pub fn enum_value_kind<E: ExcelEnum>() -> ValueKind {
    ValueKind::required(ScalarKind::Enum(EnumKey::of::<E>()))
}

pub fn enum_to_native<E: ExcelEnum>(value: &E) -> NativeValue {
    match value.variant() {
        Some(variant) => NativeValue::Enum(EnumValue {
            key: EnumKey::of::<E>(),
            numeric: value.numeric_value(),
            name: variant.name,
        }),
        None => NativeValue::Empty,
    }
}

pub fn enum_from_native<E: ExcelEnum>(value: NativeValue) -> Option<E> {
    match value {
        NativeValue::Enum(found) if found.key == EnumKey::of::<E>() => E::VARIANTS
            .iter()
            .find(|v| v.value.numeric_value() == found.numeric)
            .map(|v| v.value),
        _ => None,
    }
}

/// One member of an enumeration as seen by the spreadsheet
#[derive(Clone)]
pub struct EnumDictionaryEntry {
    /// Member name, lowercased
    pub identifier: String,
    pub display_label: String,
    pub numeric_value: i64,
    value: EnumValue,
    typed_value: Arc<dyn Any + Send + Sync>,
}

impl EnumDictionaryEntry {
    pub fn enum_value(&self) -> EnumValue {
        self.value
    }

    pub fn typed_value<E: 'static>(&self) -> Option<&E> {
        self.typed_value.downcast_ref()
    }
}

impl fmt::Debug for EnumDictionaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDictionaryEntry")
            .field("identifier", &self.identifier)
            .field("display_label", &self.display_label)
            .field("numeric_value", &self.numeric_value)
            .finish()
    }
}

/// Ordered label dictionary for one enumeration type
#[derive(Debug, Clone)]
pub struct EnumDictionary {
    key: EnumKey,
    entries: Vec<EnumDictionaryEntry>,
}

impl EnumDictionary {
    /// Enumerate the members of `E` in declaration order
    pub fn build<E: ExcelEnum>() -> Self {
        let key = EnumKey::of::<E>();
        let entries = E::VARIANTS
            .iter()
            .map(|variant| EnumDictionaryEntry {
                identifier: variant.name.to_lowercase(),
                display_label: variant.display_label().to_string(),
                numeric_value: variant.value.numeric_value(),
                value: EnumValue {
                    key,
                    numeric: variant.value.numeric_value(),
                    name: variant.name,
                },
                typed_value: Arc::new(variant.value),
            })
            .collect();

        Self { key, entries }
    }

    pub fn key(&self) -> EnumKey {
        self.key
    }

    pub fn entries(&self) -> &[EnumDictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.display_label.as_str())
    }

    /// Label of the member whose lowercased name is `identifier`
    pub fn label_for_identifier(&self, identifier: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| e.display_label.as_str())
    }

    /// Member whose label matches `text`, ignoring case and surrounding whitespace
    pub fn find_by_label(&self, text: &str) -> Option<&EnumDictionaryEntry> {
        let wanted = text.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.display_label.trim().to_lowercase() == wanted)
    }
}

/// Declare a fieldless enum usable as a mapped field.
///
/// A member may carry a display label with `=> "label"`; unlabelled members
/// are shown by name.
///
/// ```
/// use sheetbind::excel_enum;
///
/// excel_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
///     pub enum Department {
///         #[default]
///         Sales,
///         Finance => "Finance & Control",
///         Legal = 7,
///     }
/// }
///
/// use sheetbind::mapping::ExcelEnum;
/// assert_eq!(Department::Finance.numeric_value(), 1);
/// assert_eq!(Department::VARIANTS[1].display_label(), "Finance & Control");
/// ```
#[macro_export]
macro_rules! excel_enum {
    (@label $label:literal) => {
        ::std::option::Option::Some($label)
    };
    (@label) => {
        ::std::option::Option::None
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $discriminant:expr)? $(=> $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $(= $discriminant)?
            ),*
        }

        impl $crate::mapping::ExcelEnum for $name {
            const VARIANTS: &'static [$crate::mapping::EnumVariant<Self>] = &[
                $(
                    $crate::mapping::EnumVariant {
                        name: ::std::stringify!($variant),
                        label: $crate::excel_enum!(@label $($label)?),
                        value: $name::$variant,
                    }
                ),*
            ];

            fn numeric_value(self) -> i64 {
                self as i64
            }
        }

        impl $crate::mapping::ExcelValue for $name {
            fn value_kind() -> $crate::mapping::ValueKind {
                $crate::mapping::enum_value_kind::<Self>()
            }

            fn to_native(&self) -> $crate::mapping::NativeValue {
                $crate::mapping::enum_to_native(self)
            }

            fn from_native(value: $crate::mapping::NativeValue) -> ::std::option::Option<Self> {
                $crate::mapping::enum_from_native(value)
            }

            fn enum_dictionary() -> ::std::option::Option<$crate::mapping::EnumDictionary> {
                ::std::option::Option::Some($crate::mapping::EnumDictionary::build::<Self>())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ExcelValue;

    crate::excel_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Status {
            Active,
            OnLeave => "On leave",
            Retired = 10,
        }
    }

    crate::excel_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Other {
            Active,
        }
    }

    #[test]
    fn test_dictionary_preserves_declaration_order() {
        let dictionary = EnumDictionary::build::<Status>();
        let labels: Vec<&str> = dictionary.labels().collect();
        assert_eq!(labels, vec!["Active", "On leave", "Retired"]);
        assert_eq!(dictionary.entries()[2].numeric_value, 10);
        assert_eq!(dictionary.entries()[1].identifier, "onleave");
        assert_eq!(
            dictionary.entries()[1].typed_value::<Status>(),
            Some(&Status::OnLeave)
        );
    }

    #[test]
    fn test_find_by_label_ignores_case_and_whitespace() {
        let dictionary = EnumDictionary::build::<Status>();
        let entry = dictionary.find_by_label("  on LEAVE ").unwrap();
        assert_eq!(entry.identifier, "onleave");
        assert!(dictionary.find_by_label("OnLeave").is_none());
        assert_eq!(dictionary.label_for_identifier("retired"), Some("Retired"));
    }

    #[test]
    fn test_native_round_trip_checks_type() {
        let native = Status::Retired.to_native();
        assert_eq!(Status::from_native(native.clone()), Some(Status::Retired));
        assert_eq!(Other::from_native(native), None);
        assert_eq!(
            Status::value_kind().scalar,
            ScalarKind::Enum(EnumKey::of::<Status>())
        );
    }
}
