use thiserror::Error;

/// Errors raised while loading, validating or rendering FAIR assessments
#[derive(Debug, Error)]
pub enum FairError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("CSV parse error in '{name}' at line {line}: {message}")]
    Csv {
        name: String,
        line: usize,
        message: String,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("workbook has no sheet '{0}'")]
    MissingSheet(String),

    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("model_id '{0}' not in ids")]
    UnknownModel(String),

    #[error("no model with id '{0}'")]
    ModelNotFound(String),

    #[error("assessment '{model_id}' is invalid: {issues}")]
    InvalidAssessment { model_id: String, issues: String },

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[cfg(feature = "web")]
    #[error("failed to write xlsx: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[cfg(feature = "web")]
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[cfg(feature = "web")]
    #[error("page rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

pub type Result<T> = std::result::Result<T, FairError>;
