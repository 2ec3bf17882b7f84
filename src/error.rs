use thiserror::Error;

/// Main error type for the pairer.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum PairerError {
    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    GlobError(#[from] glob::GlobError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Domain errors
    #[error("{0}")]
    RangeError(#[from] crate::range::RangeError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    SchemaError(#[from] crate::schema::SchemaError),
}

impl From<crate::helpers::fs::AtomicWriteError<PairerError>> for PairerError {
    fn from(error: crate::helpers::fs::AtomicWriteError<PairerError>) -> Self {
        match error {
            crate::helpers::fs::AtomicWriteError::Io(error) => PairerError::IoError(error),
            crate::helpers::fs::AtomicWriteError::Writer(error) => error,
        }
    }
}
