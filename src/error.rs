use thiserror::Error;

/// Errors raised while loading a fuel log or producing its reports
///
/// Row-level problems (a malformed number, an unparsable date) are not errors:
/// they are recorded in the [`IngestReport`](crate::loader::IngestReport) and
/// the load carries on.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to draw chart: {0}")]
    Chart(String),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "web")]
    #[error("Failed to render page: {0}")]
    Template(#[from] handlebars::RenderError),

    #[cfg(feature = "web")]
    #[error("Invalid page template: {0}")]
    TemplateParse(#[from] handlebars::TemplateError),

    #[error("No fuel log has been uploaded")]
    NoUpload,
}

impl DashboardError {
    /// True for errors caused by the uploaded file rather than the server
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Csv(_)
                | DashboardError::MissingColumn(_)
                | DashboardError::UnsupportedFile(_)
                | DashboardError::InvalidUpload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
