//! Declared field kinds and the tagged native value exchanged between record
//! accessors and the cell codec

use chrono::{NaiveDate, NaiveDateTime};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::enums::EnumDictionary;

/// Identity of an enumeration type
#[derive(Clone, Copy)]
pub struct EnumKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl EnumKey {
    pub fn of<E: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for EnumKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EnumKey {}

impl Hash for EnumKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EnumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumKey({})", self.type_name)
    }
}

/// Scalar type of a mapped field, with any `Option` wrapper removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Text,
    Date,
    DateTime,
    Enum(EnumKey),
}

impl ScalarKind {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ScalarKind::Date | ScalarKind::DateTime)
    }
}

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueKind {
    pub scalar: ScalarKind,
    /// Declared as `Option<_>`
    pub nullable: bool,
}

impl ValueKind {
    pub const fn required(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// Enum member carried as a value: type, numeric value and member name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub key: EnumKey,
    pub numeric: i64,
    pub name: &'static str,
}

/// A field value in transit between a record and a cell
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Empty,
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Enum(EnumValue),
}

impl NativeValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, NativeValue::Empty)
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        Some(match self {
            NativeValue::Empty => return None,
            NativeValue::I8(_) => ScalarKind::I8,
            NativeValue::I16(_) => ScalarKind::I16,
            NativeValue::I32(_) => ScalarKind::I32,
            NativeValue::I64(_) => ScalarKind::I64,
            NativeValue::U8(_) => ScalarKind::U8,
            NativeValue::U16(_) => ScalarKind::U16,
            NativeValue::U32(_) => ScalarKind::U32,
            NativeValue::U64(_) => ScalarKind::U64,
            NativeValue::F32(_) => ScalarKind::F32,
            NativeValue::F64(_) => ScalarKind::F64,
            NativeValue::Bool(_) => ScalarKind::Bool,
            NativeValue::Text(_) => ScalarKind::Text,
            NativeValue::Date(_) => ScalarKind::Date,
            NativeValue::DateTime(_) => ScalarKind::DateTime,
            NativeValue::Enum(e) => ScalarKind::Enum(e.key),
        })
    }

    /// Integer value of any integer variant
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            NativeValue::I8(v) => Some(v.into()),
            NativeValue::I16(v) => Some(v.into()),
            NativeValue::I32(v) => Some(v.into()),
            NativeValue::I64(v) => Some(v.into()),
            NativeValue::U8(v) => Some(v.into()),
            NativeValue::U16(v) => Some(v.into()),
            NativeValue::U32(v) => Some(v.into()),
            NativeValue::U64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Value of any numeric variant as f64
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            NativeValue::F32(v) => Some(v.into()),
            NativeValue::F64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NativeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a decimal number to `kind`. Integer targets round half to even;
    /// values outside the target range give `None`.
    pub fn from_decimal(value: f64, kind: ScalarKind) -> Option<NativeValue> {
        if !value.is_finite() {
            return None;
        }
        let whole = value.round_ties_even() as i128;
        Some(match kind {
            ScalarKind::I8 => NativeValue::I8(i8::try_from(whole).ok()?),
            ScalarKind::I16 => NativeValue::I16(i16::try_from(whole).ok()?),
            ScalarKind::I32 => NativeValue::I32(i32::try_from(whole).ok()?),
            ScalarKind::I64 => NativeValue::I64(i64::try_from(whole).ok()?),
            ScalarKind::U8 => NativeValue::U8(u8::try_from(whole).ok()?),
            ScalarKind::U16 => NativeValue::U16(u16::try_from(whole).ok()?),
            ScalarKind::U32 => NativeValue::U32(u32::try_from(whole).ok()?),
            ScalarKind::U64 => NativeValue::U64(u64::try_from(whole).ok()?),
            ScalarKind::F32 => {
                if value.abs() > f64::from(f32::MAX) {
                    return None;
                }
                NativeValue::F32(value as f32)
            }
            ScalarKind::F64 => NativeValue::F64(value),
            _ => return None,
        })
    }
}

/// A type that can be stored in a mapped field.
///
/// `from_native` is the acceptance gate for imported values: it only accepts
/// the variant of the declared scalar kind and rejects everything else.
pub trait ExcelValue: Sized + Send + Sync + 'static {
    fn value_kind() -> ValueKind;

    fn to_native(&self) -> NativeValue;

    fn from_native(value: NativeValue) -> Option<Self>;

    /// Label dictionary, for enumeration types
    fn enum_dictionary() -> Option<EnumDictionary> {
        None
    }
}

macro_rules! impl_excel_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ExcelValue for $ty {
                fn value_kind() -> ValueKind {
                    ValueKind::required(ScalarKind::$variant)
                }

                fn to_native(&self) -> NativeValue {
                    NativeValue::$variant(self.to_owned())
                }

                fn from_native(value: NativeValue) -> Option<Self> {
                    match value {
                        NativeValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_excel_value!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    String => Text,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
);

impl<V: ExcelValue> ExcelValue for Option<V> {
    fn value_kind() -> ValueKind {
        V::value_kind().nullable()
    }

    fn to_native(&self) -> NativeValue {
        match self {
            Some(value) => value.to_native(),
            None => NativeValue::Empty,
        }
    }

    fn from_native(value: NativeValue) -> Option<Self> {
        V::from_native(value).map(Some)
    }

    fn enum_dictionary() -> Option<EnumDictionary> {
        V::enum_dictionary()
    }
}
