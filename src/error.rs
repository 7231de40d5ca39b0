use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// Catalog keys identifying each failure class.
///
/// These are the codes a [`MessageSource`](crate::core::message::MessageSource) is expected
/// to translate when a failure is shown to an end user.
pub mod keys {
    pub const CSV_EXPORT_ERROR: &str = "csv.export.error";
    pub const CSV_IMPORT_ERROR: &str = "csv.import.error";
    pub const CSV_INVALID_FORMAT: &str = "csv.invalid.format";
    pub const CSV_INVALID_FILE_SIZE: &str = "csv.invalid.file.size";
    pub const CSV_EMPTY_FILE_CONTENT: &str = "csv.empty.file.content";
    pub const EXPORT_ERROR_REPORT_FAILED: &str = "export.error.report.failed";
    pub const CSV_IMPORT_INVALID_CONTENT: &str = "csv.import.invalid.content";
    pub const CSV_IMPORT_INVALID_HEADERS: &str = "csv.import.invalid.headers";
}

/// Header row does not match the expected schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// An expected header is absent. `column` is its 1-based position in the expected list.
    #[error("missing header '{label}' expected at column {column}")]
    MissingHeader { column: usize, label: String },

    /// Every expected header is present but the file carries extra ones.
    #[error("unexpected headers: {}", .unexpected.join(", "))]
    UnexpectedHeaders { unexpected: Vec<String> },
}

/// A schema definition that breaks its own invariants.
///
/// This is a programming error on the caller side and is raised when the schema is built,
/// never while rows are being read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSchema {
    #[error("{bindings} field bindings given for {headers} headers")]
    BindingCount { headers: usize, bindings: usize },

    #[error("{transforms} transform chains given for {headers} columns")]
    TransformCount { headers: usize, transforms: usize },
}

/// Failure of a single cell transform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        TransformError(message.into())
    }
}

/// A record type refused a field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    Unknown(String),

    #[error("invalid value for field '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Why a single data row could not be decoded.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("expected {expected} columns, found {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("quoted cell is never closed")]
    UnterminatedQuote,

    #[error("parse error: {0}")]
    Parse(#[from] csv::Error),
}

/// Errors raised by [`CsvRowReader::read_all`](crate::item::csv::csv_reader::CsvRowReader::read_all).
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid headers: {0}")]
    Schema(#[from] SchemaError),

    #[error("no data was imported")]
    Empty,

    #[error("malformed row at line {line}{}: {cause}", column_suffix(.column))]
    Malformed {
        line: u64,
        column: Option<usize>,
        content: String,
        #[source]
        cause: RowError,
    },
}

fn column_suffix(column: &Option<usize>) -> String {
    column.map(|c| format!(", column {c}")).unwrap_or_default()
}

/// Errors raised by the indexed reader.
#[derive(Error, Debug)]
pub enum IndexedDecodeError {
    #[error("invalid headers: {0}")]
    InvalidHeaders(#[from] SchemaError),

    #[error("no data was imported")]
    NoDataImported,

    #[error("invalid content at line {line}: {content}")]
    InvalidContent {
        line: u64,
        content: String,
        #[source]
        cause: RowError,
    },
}

impl From<DecodeError> for IndexedDecodeError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::Schema(schema) => IndexedDecodeError::InvalidHeaders(schema),
            DecodeError::Empty => IndexedDecodeError::NoDataImported,
            DecodeError::Malformed {
                line,
                content,
                cause,
                ..
            } => IndexedDecodeError::InvalidContent {
                line,
                content,
                cause,
            },
        }
    }
}

/// Which export path failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Export,
    ErrorReport,
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTarget::Export => f.write_str("export"),
            ExportTarget::ErrorReport => f.write_str("error report"),
        }
    }
}

/// Failure while producing CSV output.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{target} failed: {source}")]
    Write {
        target: ExportTarget,
        #[source]
        source: csv::Error,
    },

    #[error("{target} failed: {source}")]
    Io {
        target: ExportTarget,
        #[source]
        source: io::Error,
    },

    #[error("{target} failed at row {row}: {source}")]
    Field {
        target: ExportTarget,
        row: usize,
        #[source]
        source: FieldError,
    },

    #[error("{target} failed at row {row}, column {column}: {source}")]
    Transform {
        target: ExportTarget,
        row: usize,
        column: usize,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Schema(#[from] InvalidSchema),
}

impl ExportError {
    pub fn target(&self) -> Option<ExportTarget> {
        match self {
            ExportError::Write { target, .. }
            | ExportError::Io { target, .. }
            | ExportError::Field { target, .. }
            | ExportError::Transform { target, .. } => Some(*target),
            ExportError::Schema(_) => None,
        }
    }
}

/// Failure while pulling CSV text out of an uploaded file.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("'{0}' is not a csv file")]
    InvalidFormat(String),

    #[error("file content is empty")]
    EmptyContent,

    #[error("file size {size} exceeds the limit of {max} bytes")]
    InvalidFileSize { size: u64, max: u64 },

    #[error("file content is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("failed reading file content: {0}")]
    Io(#[from] io::Error),
}

/// Umbrella error for callers that handle every failure of this crate in one place.
#[derive(Error, Debug)]
pub enum CsvError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    InvalidSchema(#[from] InvalidSchema),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    IndexedDecode(#[from] IndexedDecodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl CsvError {
    /// Catalog key describing this failure.
    pub fn error_key(&self) -> &'static str {
        match self {
            CsvError::Schema(_) => keys::CSV_IMPORT_INVALID_HEADERS,
            CsvError::InvalidSchema(_) => keys::CSV_IMPORT_ERROR,
            CsvError::Decode(_) => keys::CSV_IMPORT_ERROR,
            CsvError::IndexedDecode(error) => match error {
                IndexedDecodeError::InvalidHeaders(_) => keys::CSV_IMPORT_INVALID_HEADERS,
                IndexedDecodeError::NoDataImported => keys::CSV_IMPORT_ERROR,
                IndexedDecodeError::InvalidContent { .. } => keys::CSV_IMPORT_INVALID_CONTENT,
            },
            CsvError::Export(error) => match error.target() {
                Some(ExportTarget::ErrorReport) => keys::EXPORT_ERROR_REPORT_FAILED,
                _ => keys::CSV_EXPORT_ERROR,
            },
            CsvError::Extraction(error) => match error {
                ExtractionError::InvalidFormat(_) => keys::CSV_INVALID_FORMAT,
                ExtractionError::EmptyContent => keys::CSV_EMPTY_FILE_CONTENT,
                ExtractionError::InvalidFileSize { .. } => keys::CSV_INVALID_FILE_SIZE,
                ExtractionError::Encoding(_) | ExtractionError::Io(_) => keys::CSV_IMPORT_ERROR,
            },
        }
    }

    /// `true` when the caller's input is at fault, `false` when output could not be produced
    /// or the crate was misused.
    pub fn is_client_error(&self) -> bool {
        match self {
            CsvError::Schema(_) | CsvError::Decode(_) | CsvError::IndexedDecode(_) => true,
            CsvError::InvalidSchema(_) | CsvError::Export(_) => false,
            CsvError::Extraction(error) => !matches!(error, ExtractionError::Io(_)),
        }
    }
}
