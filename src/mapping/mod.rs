//! Record type mapping: column declarations, resolved per-type metadata and
//! the process-wide metadata cache.
//!
//! A record type describes its columns once through [`ExcelModel::describe`]:
//!
//! ```
//! use sheetbind::mapping::{ExcelModel, ModelBuilder};
//!
//! #[derive(Default)]
//! struct Project {
//!     name: String,
//!     budget: f64,
//! }
//!
//! impl ExcelModel for Project {
//!     fn describe(model: &mut ModelBuilder<Self>) {
//!         model
//!             .column("name", "Project", |p: &Project| p.name.clone(), |p, v| p.name = v)
//!             .width(30)
//!             .required();
//!         model
//!             .column("budget", "Budget", |p: &Project| p.budget, |p, v| p.budget = v)
//!             .range(0.0, 1_000_000.0);
//!     }
//! }
//!
//! let metadata = sheetbind::mapping::resolve::<Project>().unwrap();
//! assert_eq!(metadata.columns().len(), 2);
//! assert_eq!(metadata.columns()[1].normalized_name(), "budget");
//! ```

mod enums;
mod format;
mod validation;
mod value;

pub use enums::{
    enum_from_native, enum_to_native, enum_value_kind, EnumDictionary, EnumDictionaryEntry,
    EnumVariant, ExcelEnum,
};
pub use format::{FormatSpec, NumericFormat};
pub use validation::{validate, Constraint};
pub use value::{EnumKey, EnumValue, ExcelValue, NativeValue, ScalarKind, ValueKind};

use crate::error::{SheetError, SheetResult};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// A record type mapped to spreadsheet rows
pub trait ExcelModel: Default + Send + Sync + 'static {
    /// Declare the mapped columns, in column order
    fn describe(model: &mut ModelBuilder<Self>);
}

/// Lowercased, trimmed header text used for matching
pub fn normalize_label(text: &str) -> String {
    text.trim().to_lowercase()
}

//==============================================================================
// Field access
//==============================================================================

trait FieldAccess<T>: Send + Sync {
    fn read(&self, record: &T) -> NativeValue;
    fn write(&self, record: &mut T, value: NativeValue) -> bool;
}

struct Accessor<G, S, V> {
    get: G,
    set: S,
    _value: PhantomData<fn() -> V>,
}

impl<T, V, G, S> FieldAccess<T> for Accessor<G, S, V>
where
    V: ExcelValue,
    G: Fn(&T) -> V + Send + Sync,
    S: Fn(&mut T, V) + Send + Sync,
{
    fn read(&self, record: &T) -> NativeValue {
        (self.get)(record).to_native()
    }

    fn write(&self, record: &mut T, value: NativeValue) -> bool {
        match V::from_native(value) {
            Some(value) => {
                (self.set)(record, value);
                true
            }
            None => false,
        }
    }
}

//==============================================================================
// Column mapping
//==============================================================================

/// One mapped field: header text, declared kind, export options and constraints
pub struct ColumnMapping<T> {
    field_name: String,
    display_name: String,
    normalized_name: String,
    kind: ValueKind,
    format: Option<FormatSpec>,
    width: Option<u32>,
    conditional: bool,
    constraints: Vec<Constraint>,
    accessor: Box<dyn FieldAccess<T>>,
}

impl<T> ColumnMapping<T> {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn format(&self) -> Option<&FormatSpec> {
        self.format.as_ref()
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Current value of the field on `record`
    pub fn read(&self, record: &T) -> NativeValue {
        self.accessor.read(record)
    }

    /// Store `value` on `record`. Returns false, leaving the field untouched,
    /// when the value is not of the declared kind.
    pub fn assign(&self, record: &mut T, value: NativeValue) -> bool {
        self.accessor.write(record, value)
    }

    /// Messages for every constraint `value` fails
    pub fn validate(&self, value: Option<&NativeValue>) -> Vec<String> {
        validate(&self.constraints, &self.display_name, value)
    }
}

impl<T> fmt::Debug for ColumnMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMapping")
            .field("field_name", &self.field_name)
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("conditional", &self.conditional)
            .field("constraints", &self.constraints)
            .finish()
    }
}

//==============================================================================
// Model builder
//==============================================================================

struct ColumnDraft<T> {
    field_name: String,
    display_name: String,
    kind: ValueKind,
    format: Option<String>,
    width: Option<u32>,
    conditional: bool,
    constraints: Vec<Constraint>,
    accessor: Box<dyn FieldAccess<T>>,
}

/// Collects column declarations for a record type
pub struct ModelBuilder<T> {
    columns: Vec<ColumnDraft<T>>,
    enums: Vec<EnumDictionary>,
}

impl<T: 'static> ModelBuilder<T> {
    fn new() -> Self {
        Self {
            columns: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Map `field` to a column titled `display_name`. A blank display name
    /// falls back to the field name.
    pub fn column<V, G, S>(&mut self, field: &str, display_name: &str, get: G, set: S) -> ColumnBuilder<'_, T>
    where
        V: ExcelValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let kind = V::value_kind();
        if let ScalarKind::Enum(key) = kind.scalar {
            if !self.enums.iter().any(|d| d.key() == key) {
                if let Some(dictionary) = V::enum_dictionary() {
                    self.enums.push(dictionary);
                }
            }
        }

        self.columns.push(ColumnDraft {
            field_name: field.to_string(),
            display_name: display_name.to_string(),
            kind,
            format: None,
            width: None,
            conditional: false,
            constraints: Vec::new(),
            accessor: Box::new(Accessor {
                get,
                set,
                _value: PhantomData,
            }),
        });

        let index = self.columns.len() - 1;
        ColumnBuilder {
            draft: &mut self.columns[index],
        }
    }

    fn build(self, type_name: &'static str) -> SheetResult<TypeMetadata<T>> {
        let mut field_names = HashSet::new();
        let mut labels = HashSet::new();
        let mut columns = Vec::with_capacity(self.columns.len());

        for draft in self.columns {
            if draft.field_name.trim().is_empty() {
                return Err(SheetError::configuration(type_name, "", "field name is empty"));
            }
            if !field_names.insert(draft.field_name.clone()) {
                return Err(SheetError::configuration(type_name, &draft.field_name, "field is mapped twice"));
            }

            let display_name = if draft.display_name.trim().is_empty() {
                draft.field_name.clone()
            } else {
                draft.display_name.trim().to_string()
            };
            let normalized_name = normalize_label(&display_name);
            if !labels.insert(normalized_name.clone()) {
                return Err(SheetError::configuration(
                    type_name,
                    &draft.field_name,
                    format!("header '{}' is used by another column", display_name),
                ));
            }

            let format = match draft.format.as_deref() {
                Some(spec) => FormatSpec::parse(spec, draft.kind.scalar)
                    .map_err(|e| SheetError::configuration(type_name, &draft.field_name, e))?,
                None => None,
            };

            for constraint in &draft.constraints {
                match constraint {
                    Constraint::StringLength { min, max } if min > max => {
                        return Err(SheetError::configuration(
                            type_name,
                            &draft.field_name,
                            format!("length bounds {}..{} are inverted", min, max),
                        ));
                    }
                    Constraint::Range { min, max } if min > max => {
                        return Err(SheetError::configuration(
                            type_name,
                            &draft.field_name,
                            format!("range bounds {}..{} are inverted", min, max),
                        ));
                    }
                    _ => {}
                }
            }

            columns.push(ColumnMapping {
                field_name: draft.field_name,
                display_name,
                normalized_name,
                kind: draft.kind,
                format,
                width: draft.width,
                conditional: draft.conditional,
                constraints: draft.constraints,
                accessor: draft.accessor,
            });
        }

        Ok(TypeMetadata {
            type_name,
            columns,
            enums: self.enums,
        })
    }
}

/// Options for the column just declared
pub struct ColumnBuilder<'a, T> {
    draft: &'a mut ColumnDraft<T>,
}

impl<T> ColumnBuilder<'_, T> {
    /// Column width in characters; 0 leaves the width unset
    pub fn width(self, width: u32) -> Self {
        self.draft.width = (width > 0).then_some(width);
        self
    }

    /// Format specifier used when writing the value as text
    pub fn format(self, spec: &str) -> Self {
        self.draft.format = Some(spec.to_string());
        self
    }

    /// Only emitted when approved for the export run
    pub fn conditional(self) -> Self {
        self.draft.conditional = true;
        self
    }

    pub fn required(self) -> Self {
        self.draft.constraints.push(Constraint::Required);
        self
    }

    pub fn max_length(self, max: usize) -> Self {
        self.draft.constraints.push(Constraint::StringLength { min: 0, max });
        self
    }

    pub fn length_between(self, min: usize, max: usize) -> Self {
        self.draft.constraints.push(Constraint::StringLength { min, max });
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.draft.constraints.push(Constraint::Range { min, max });
        self
    }
}

//==============================================================================
// Type metadata
//==============================================================================

/// Resolved mapping of one record type. Immutable once built.
pub struct TypeMetadata<T> {
    type_name: &'static str,
    columns: Vec<ColumnMapping<T>>,
    enums: Vec<EnumDictionary>,
}

impl<T: ExcelModel> TypeMetadata<T> {
    /// Run `T::describe` and validate the declarations
    pub fn build() -> SheetResult<Self> {
        let mut builder = ModelBuilder::new();
        T::describe(&mut builder);
        builder.build(std::any::type_name::<T>())
    }
}

impl<T> TypeMetadata<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnMapping<T>] {
        &self.columns
    }

    pub fn column(&self, field_name: &str) -> Option<&ColumnMapping<T>> {
        self.columns.iter().find(|c| c.field_name == field_name)
    }

    /// Enum dictionaries in first-use order
    pub fn enum_dictionaries(&self) -> &[EnumDictionary] {
        &self.enums
    }

    pub fn enum_dictionary(&self, key: &EnumKey) -> Option<&EnumDictionary> {
        self.enums.iter().find(|d| d.key() == *key)
    }

    /// Normalized header labels of every column
    pub fn expected_labels(&self) -> HashSet<&str> {
        self.columns.iter().map(|c| c.normalized_name.as_str()).collect()
    }
}

impl<T> fmt::Debug for TypeMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("type_name", &self.type_name)
            .field("columns", &self.columns)
            .field("enums", &self.enums)
            .finish()
    }
}

type MetadataCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

fn cache() -> &'static RwLock<MetadataCache> {
    static CACHE: OnceLock<RwLock<MetadataCache>> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Metadata for `T`, built on first use and shared afterwards. Configuration
/// errors are returned on every call and never cached.
pub fn resolve<T: ExcelModel>() -> SheetResult<Arc<TypeMetadata<T>>> {
    let key = TypeId::of::<T>();

    let cached = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned();
    if let Some(Ok(metadata)) = cached.map(|entry| entry.downcast::<TypeMetadata<T>>()) {
        return Ok(metadata);
    }

    let metadata = Arc::new(TypeMetadata::<T>::build()?);
    debug!(
        model = metadata.type_name(),
        columns = metadata.columns().len(),
        enums = metadata.enum_dictionaries().len(),
        "type metadata built"
    );

    // another thread may have won the race; keep whichever entry landed first
    let entry = cache()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_insert_with(|| metadata.clone() as Arc<dyn Any + Send + Sync>)
        .clone();

    entry.downcast::<TypeMetadata<T>>().map_err(|_| {
        SheetError::Configuration(format!("metadata cache entry for {} has the wrong type", std::any::type_name::<T>()))
    })
}
