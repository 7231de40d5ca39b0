use std::collections::HashMap;

use log::{debug, error};

use crate::{
    core::{message::MessageSource, preference::Preference, row::CsvRow},
    error::{ExportError, ExportTarget},
    item::csv::csv_writer::export_raw,
};

/// Builds a CSV error report from decoded records and the error codes found for them.
///
/// Each record contributes its filtered values when `fields` is non-empty, its full values
/// otherwise. The codes registered under the record's index are translated through `messages`
/// and appended as trailing columns; records without an entry keep their natural width. The
/// report is always written with [`Preference::standard`] and formula escaping.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use warehouse_csv::core::message::MessageCatalog;
/// use warehouse_csv::core::row::{CsvRow, GenericRow};
/// use warehouse_csv::item::csv::error_report::compose_error_report;
///
/// let mut messages = MessageCatalog::new();
/// messages.insert("salePrice.empty", "Sale Price is Empty");
///
/// let mut row = GenericRow::new().with("name", Some("hod001")).with("salePrice", None);
/// row.set_index(2);
/// let errors = HashMap::from([(2, vec!["salePrice.empty".to_string()])]);
///
/// let headers = ["Name", "Sale Price"];
/// let report = compose_error_report(&messages, &errors, &[row], &headers, &[]).unwrap();
/// assert_eq!(
///     String::from_utf8(report).unwrap(),
///     "Name,Sale Price\r\nhod001,,Sale Price is Empty\r\n"
/// );
/// ```
pub fn compose_error_report<M, T, H>(
    messages: &M,
    errors: &HashMap<u64, Vec<String>>,
    records: &[T],
    headers: &[H],
    fields: &[String],
) -> Result<Vec<u8>, ExportError>
where
    M: MessageSource + ?Sized,
    T: CsvRow,
    H: AsRef<str>,
{
    debug!(
        "Composing error report for {} records, {} with errors",
        records.len(),
        errors.len()
    );

    let translated: HashMap<u64, Vec<String>> = errors
        .iter()
        .map(|(index, codes)| (*index, messages.messages(codes)))
        .collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut values = if fields.is_empty() {
                record.row_values()
            } else {
                record.row_values_filtered(fields)
            };
            if let Some(row_messages) = translated.get(&record.index()) {
                values.extend(row_messages.iter().cloned());
            }
            values
        })
        .collect();

    export_raw(
        headers,
        &rows,
        &Preference::standard(),
        ExportTarget::ErrorReport,
    )
    .inspect_err(|err| error!("Failed to write export error report: {}", err))
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::core::{message::MessageCatalog, row::GenericRow};

    fn catalog() -> MessageCatalog {
        let mut catalog = MessageCatalog::new();
        catalog.insert("salePrice.empty", "Sale Price is Empty");
        catalog.insert("name.invalid", "=Name is invalid");
        catalog
    }

    fn row(index: u64, name: &str, sale_price: Option<&str>) -> GenericRow {
        let mut row = GenericRow::new()
            .with("name", Some(name))
            .with("productGroup", Some("7Z46"))
            .with("salePrice", sale_price);
        row.set_index(index);
        row
    }

    #[test]
    fn messages_become_trailing_columns() -> Result<(), Box<dyn Error>> {
        let records = [row(1, "hod001", None), row(2, "hod002", Some("12"))];
        let errors = HashMap::from([(1, vec!["salePrice.empty".to_string()])]);

        let report = compose_error_report(
            &catalog(),
            &errors,
            &records,
            &["Name", "Product Group", "Sale Price"],
            &[],
        )?;

        assert_eq!(
            String::from_utf8(report)?,
            "Name,Product Group,Sale Price\r\n\
             hod001,7Z46,,Sale Price is Empty\r\n\
             hod002,7Z46,12\r\n"
        );
        Ok(())
    }

    #[test]
    fn filtered_fields_keep_canonical_order() -> Result<(), Box<dyn Error>> {
        let records = [row(3, "hod003", Some("5"))];
        let errors = HashMap::from([(
            3,
            vec!["salePrice.empty".to_string(), "unknown.code".to_string()],
        )]);
        let fields = vec!["salePrice".to_string(), "name".to_string()];

        let report = compose_error_report(
            &catalog(),
            &errors,
            &records,
            &["Name", "Sale Price"],
            &fields,
        )?;

        assert_eq!(
            String::from_utf8(report)?,
            "Name,Sale Price\r\nhod003,5,Sale Price is Empty,unknown.code\r\n"
        );
        Ok(())
    }

    #[test]
    fn translated_messages_are_sanitized() -> Result<(), Box<dyn Error>> {
        let records = [row(2, "+hod002", Some("1"))];
        let errors = HashMap::from([(2, vec!["name.invalid".to_string()])]);

        let fields = ["name".to_string()];
        let report = compose_error_report(&catalog(), &errors, &records, &["Name"], &fields)?;

        assert_eq!(
            String::from_utf8(report)?,
            "Name\r\nhod002,Name is invalid\r\n"
        );
        Ok(())
    }

    #[test]
    fn errors_for_unknown_indexes_are_ignored() -> Result<(), Box<dyn Error>> {
        let records = [row(2, "hod002", Some("1"))];
        let errors = HashMap::from([(7, vec!["salePrice.empty".to_string()])]);

        let fields = ["name".to_string()];
        let report = compose_error_report(&catalog(), &errors, &records, &["Name"], &fields)?;

        assert_eq!(String::from_utf8(report)?, "Name\r\nhod002\r\n");
        Ok(())
    }
}
