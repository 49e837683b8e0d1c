use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Worksheet already exists: {0}")]
    DuplicateWorksheet(String),

    #[error("Invalid worksheet name '{0}': {1}")]
    InvalidSheetName(String, String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Import error: {0}")]
    Import(String),
}

impl SheetError {
    /// Configuration error for a specific model type and field
    pub fn configuration(type_name: &str, field: &str, message: impl std::fmt::Display) -> Self {
        SheetError::Configuration(format!("{}.{}: {}", type_name, field, message))
    }
}
