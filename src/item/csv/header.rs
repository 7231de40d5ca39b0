use std::collections::HashSet;

use log::debug;

use crate::error::SchemaError;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Removes a leading byte-order mark.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text)
}

/// Checks the header row of a file against the expected headers.
///
/// A byte-order mark is stripped from the first actual header only. Headers are compared as
/// sets, so order and duplicates do not matter. On mismatch the first expected header absent
/// from the file is reported with its 1-based position in `expected`; when nothing is missing
/// the extra headers found in the file are reported instead.
///
/// # Examples
///
/// ```
/// use warehouse_csv::item::csv::header::validate_headers;
/// use warehouse_csv::error::SchemaError;
///
/// let expected = ["Name", "Product Group", "Sale Price"];
/// assert!(validate_headers(&["\u{feff}Sale Price", "Name", "Product Group"], &expected).is_ok());
///
/// let error = validate_headers(&["Name", "Sale Price"], &expected).unwrap_err();
/// assert_eq!(
///     error,
///     SchemaError::MissingHeader { column: 2, label: "Product Group".to_string() }
/// );
/// ```
pub fn validate_headers<A, E>(actual: &[A], expected: &[E]) -> Result<(), SchemaError>
where
    A: AsRef<str>,
    E: AsRef<str>,
{
    let actual: Vec<&str> = actual
        .iter()
        .enumerate()
        .map(|(i, header)| match i {
            0 => strip_bom(header.as_ref()),
            _ => header.as_ref(),
        })
        .collect();

    let actual_set: HashSet<&str> = actual.iter().copied().collect();
    let expected_set: HashSet<&str> = expected.iter().map(AsRef::as_ref).collect();
    if actual_set == expected_set {
        return Ok(());
    }

    if let Some((position, label)) = expected
        .iter()
        .map(AsRef::as_ref)
        .enumerate()
        .find(|(_, header)| !actual_set.contains(header))
    {
        debug!("Header '{}' missing at column {}", label, position + 1);
        return Err(SchemaError::MissingHeader {
            column: position + 1,
            label: label.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let unexpected: Vec<String> = actual
        .into_iter()
        .filter(|header| !expected_set.contains(header) && seen.insert(*header))
        .map(str::to_string)
        .collect();
    debug!("Unexpected headers {:?}", unexpected);
    Err(SchemaError::UnexpectedHeaders { unexpected })
}
