//! Conversion between field values and cell values

use crate::document::CellValue;
use crate::locale::Locale;
use crate::mapping::{ColumnMapping, EnumKey, NativeValue, ScalarKind, TypeMetadata, ValueKind};
use chrono::{NaiveDateTime, NaiveTime};

/// A field value ready to be written to a cell
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCell {
    pub value: CellValue,
    /// Excel number format for date cells
    pub number_format: Option<String>,
    /// Enum whose dropdown list the cell should be bound to
    pub dropdown: Option<EnumKey>,
}

impl EncodedCell {
    fn plain(value: CellValue) -> Self {
        Self {
            value,
            number_format: None,
            dropdown: None,
        }
    }
}

/// Encode the value of `mapping`.
///
/// Enum fields are written as their display label and bound to the enum's
/// dropdown; fields with a format specifier are written as formatted text;
/// everything else keeps its native cell type.
pub fn encode<T>(
    mapping: &ColumnMapping<T>,
    value: &NativeValue,
    metadata: &TypeMetadata<T>,
    locale: &Locale,
) -> EncodedCell {
    if let ScalarKind::Enum(key) = mapping.kind().scalar {
        let label = match value {
            NativeValue::Enum(member) => metadata
                .enum_dictionary(&key)
                .and_then(|d| d.label_for_identifier(&member.name.to_lowercase()))
                .map(|label| CellValue::Text(label.to_string())),
            _ => None,
        };
        return EncodedCell {
            value: label.unwrap_or_default(),
            number_format: None,
            dropdown: Some(key),
        };
    }

    if let Some(text) = mapping.format().and_then(|spec| spec.format(value)) {
        return EncodedCell::plain(CellValue::Text(text));
    }

    encode_native(value, locale)
}

fn encode_native(value: &NativeValue, locale: &Locale) -> EncodedCell {
    match value {
        NativeValue::Empty => EncodedCell::plain(CellValue::Empty),
        NativeValue::Bool(b) => EncodedCell::plain(CellValue::Bool(*b)),
        NativeValue::Text(s) => EncodedCell::plain(CellValue::Text(s.clone())),
        NativeValue::Date(date) => EncodedCell {
            value: CellValue::DateTime(date.and_time(NaiveTime::MIN)),
            number_format: Some(locale.excel_date_format.clone()),
            dropdown: None,
        },
        NativeValue::DateTime(dt) => EncodedCell {
            value: CellValue::DateTime(*dt),
            number_format: Some(locale.excel_datetime_format.clone()),
            dropdown: None,
        },
        NativeValue::Enum(member) => EncodedCell::plain(CellValue::Number(member.numeric as f64)),
        numeric => EncodedCell::plain(numeric.as_f64().map(CellValue::Number).unwrap_or_default()),
    }
}

/// Decode `cell` as a value of `kind`; `None` when the cell does not hold one
pub fn decode<T>(
    cell: &CellValue,
    kind: ValueKind,
    metadata: &TypeMetadata<T>,
    locale: &Locale,
) -> Option<NativeValue> {
    match kind.scalar {
        ScalarKind::Bool => cell.try_get::<bool>().map(NativeValue::Bool),
        ScalarKind::Text => cell
            .try_get::<String>()
            .or_else(|| {
                let text = cell.display_text(locale);
                (!text.trim().is_empty()).then_some(text)
            })
            .map(NativeValue::Text),
        ScalarKind::Date => decode_timestamp(cell, locale).map(|dt| NativeValue::Date(dt.date())),
        ScalarKind::DateTime => decode_timestamp(cell, locale).map(NativeValue::DateTime),
        ScalarKind::Enum(key) => {
            let text = cell.try_get::<String>()?;
            metadata
                .enum_dictionary(&key)?
                .find_by_label(&text)
                .map(|entry| NativeValue::Enum(entry.enum_value()))
        }
        numeric => {
            let number = cell.try_get::<f64>()?;
            NativeValue::from_decimal(number, numeric)
        }
    }
}

fn decode_timestamp(cell: &CellValue, locale: &Locale) -> Option<NaiveDateTime> {
    cell.try_get::<NaiveDateTime>().or_else(|| {
        let text = cell.try_get::<String>()?;
        locale.parse_datetime(&text)
    })
}
