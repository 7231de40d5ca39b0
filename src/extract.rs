use std::{io::Read, path::Path};

use log::debug;

use crate::error::ExtractionError;

const CSV_EXTENSION: &str = "csv";

/// Checks that `file_name` carries the `csv` extension, compared case-sensitively.
pub fn validate_file_extension(file_name: &str) -> Result<(), ExtractionError> {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(CSV_EXTENSION) => Ok(()),
        _ => Err(ExtractionError::InvalidFormat(file_name.to_string())),
    }
}

/// Rejects a body made only of whitespace.
pub fn validate_file_body(body: &str) -> Result<(), ExtractionError> {
    if body.trim().is_empty() {
        return Err(ExtractionError::EmptyContent);
    }
    Ok(())
}

pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), ExtractionError> {
    if size > max_size {
        return Err(ExtractionError::InvalidFileSize {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Reads the whole source as UTF-8 text.
pub fn read_content<R: Read>(mut reader: R) -> Result<String, ExtractionError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

/// Turns an uploaded file into CSV text.
///
/// The file name must end with `.csv` and the content must not be blank.
///
/// # Examples
///
/// ```
/// use warehouse_csv::extract::extract_content;
/// use warehouse_csv::error::ExtractionError;
///
/// let body = extract_content("products.csv", "Name\nhod001\n".as_bytes()).unwrap();
/// assert_eq!(body, "Name\nhod001\n");
///
/// let error = extract_content("products.xlsx", "Name".as_bytes()).unwrap_err();
/// assert!(matches!(error, ExtractionError::InvalidFormat(_)));
/// ```
pub fn extract_content<R: Read>(file_name: &str, reader: R) -> Result<String, ExtractionError> {
    validate_file_extension(file_name)?;
    let body = read_content(reader)?;
    validate_file_body(&body)?;

    debug!("Extracted {} bytes from {}", body.len(), file_name);
    Ok(body)
}
