use std::{
    collections::HashMap,
    io::{Read, Write},
};

use log::debug;

use crate::{
    core::{
        message::MessageSource, preference::Preference, row::CsvRow, schema::CsvSchema,
        transform::TransformChain,
    },
    error::{CsvError, DecodeError, ExportError, ExportTarget, IndexedDecodeError, SchemaError},
    extract,
    item::csv::{csv_reader, csv_writer, error_report, header, trim},
};

/// Entry point bundling every CSV operation behind one object.
///
/// The service owns the [`MessageSource`] used for error reports and a default
/// [`Preference`] used by the operations that do not take one. It holds no other state, so a
/// single instance can be shared between threads when the message source allows it.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use warehouse_csv::core::message::MessageCatalog;
/// use warehouse_csv::core::row::{CsvRow, GenericRow};
/// use warehouse_csv::core::schema::CsvSchema;
/// use warehouse_csv::service::CsvService;
///
/// let mut catalog = MessageCatalog::new();
/// catalog.insert("salePrice.empty", "Sale Price is Empty");
/// let service = CsvService::new(catalog);
///
/// let schema = CsvSchema::new(&["Name", "Sale Price"], &["name", "salePrice"]).unwrap();
/// let rows: Vec<GenericRow> = service
///     .read_indexed_data("Name,Sale Price\r\nhod001,\r\n", &schema)
///     .unwrap();
/// assert_eq!(rows[0].index(), 2);
///
/// let errors = HashMap::from([(2, vec!["salePrice.empty".to_string()])]);
/// let report = service
///     .export_error_report(&errors, &rows, schema.headers(), &[])
///     .unwrap();
/// assert_eq!(
///     String::from_utf8(report).unwrap(),
///     "Name,Sale Price\r\nhod001,,Sale Price is Empty\r\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CsvService<M: MessageSource> {
    messages: M,
    preference: Preference,
}

impl<M: MessageSource> CsvService<M> {
    /// Creates a service using [`Preference::standard`].
    pub fn new(messages: M) -> Self {
        Self {
            messages,
            preference: Preference::standard(),
        }
    }

    /// Replaces the default preference.
    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preference = preference;
        self
    }

    pub fn preference(&self) -> &Preference {
        &self.preference
    }

    pub fn messages(&self) -> &M {
        &self.messages
    }

    pub fn validate_headers<A, E>(&self, actual: &[A], expected: &[E]) -> Result<(), SchemaError>
    where
        A: AsRef<str>,
        E: AsRef<str>,
    {
        header::validate_headers(actual, expected)
    }

    /// Decodes every data row of `input` with the default preference.
    pub fn read_data<T: CsvRow + Default>(
        &self,
        input: &str,
        schema: &CsvSchema,
    ) -> Result<Vec<T>, DecodeError> {
        self.read_data_with_preference(input, schema, &self.preference)
    }

    pub fn read_data_with_preference<T: CsvRow + Default>(
        &self,
        input: &str,
        schema: &CsvSchema,
        preference: &Preference,
    ) -> Result<Vec<T>, DecodeError> {
        csv_reader::decode_all(input, schema, preference)
    }

    /// Decodes every data row of `input` with the default preference, stamping each record
    /// with its source line.
    pub fn read_indexed_data<T: CsvRow + Default>(
        &self,
        input: &str,
        schema: &CsvSchema,
    ) -> Result<Vec<T>, IndexedDecodeError> {
        self.read_indexed_data_with_preference(input, schema, &self.preference)
    }

    pub fn read_indexed_data_with_preference<T: CsvRow + Default>(
        &self,
        input: &str,
        schema: &CsvSchema,
        preference: &Preference,
    ) -> Result<Vec<T>, IndexedDecodeError> {
        csv_reader::decode_indexed(input, schema, preference)
    }

    /// Extracts an uploaded file and decodes it with source lines.
    ///
    /// The upload is rejected when larger than `max_size` bytes, not named `*.csv` or blank.
    pub fn read_indexed_upload<T, R>(
        &self,
        file_name: &str,
        size: u64,
        max_size: u64,
        content: R,
        schema: &CsvSchema,
    ) -> Result<Vec<T>, CsvError>
    where
        T: CsvRow + Default,
        R: Read,
    {
        extract::validate_file_size(size, max_size)?;
        let body = extract::extract_content(file_name, content)?;
        Ok(self.read_indexed_data(&body, schema)?)
    }

    /// Decodes rows into maps keyed by the header labels of `input`.
    pub fn read_to_map(
        &self,
        input: &str,
        preference: &Preference,
    ) -> Result<Vec<HashMap<String, String>>, DecodeError> {
        csv_reader::read_to_map(input, preference)
    }

    /// Removes trailing blank rows using the default preference's delimiter.
    pub fn trim(&self, input: &str) -> String {
        trim::trim_trailing_blank_rows_with(input, self.preference.delimiter)
    }

    /// Encodes records with the default preference.
    ///
    /// `fields` selects and orders the exported fields, empty meaning all of them.
    /// `transforms` is either empty or holds one chain per exported column.
    pub fn export_data<T, H, F>(
        &self,
        records: &[T],
        headers: &[H],
        fields: &[F],
        transforms: &[TransformChain],
    ) -> Result<Vec<u8>, ExportError>
    where
        T: CsvRow,
        H: AsRef<str>,
        F: AsRef<str>,
    {
        self.export_data_with_preference(records, headers, fields, &self.preference, transforms)
    }

    pub fn export_data_with_preference<T, H, F>(
        &self,
        records: &[T],
        headers: &[H],
        fields: &[F],
        preference: &Preference,
        transforms: &[TransformChain],
    ) -> Result<Vec<u8>, ExportError>
    where
        T: CsvRow,
        H: AsRef<str>,
        F: AsRef<str>,
    {
        csv_writer::export_records(records, headers, fields, preference, transforms)
    }

    /// Encodes records into `writer` with the default preference.
    pub fn export_data_to_writer<W, T, H, F>(
        &self,
        writer: W,
        records: &[T],
        headers: &[H],
        fields: &[F],
    ) -> Result<W, ExportError>
    where
        W: Write,
        T: CsvRow,
        H: AsRef<str>,
        F: AsRef<str>,
    {
        self.export_data_to_writer_with_preference(
            writer,
            records,
            headers,
            fields,
            &self.preference,
        )
    }

    pub fn export_data_to_writer_with_preference<W, T, H, F>(
        &self,
        writer: W,
        records: &[T],
        headers: &[H],
        fields: &[F],
        preference: &Preference,
    ) -> Result<W, ExportError>
    where
        W: Write,
        T: CsvRow,
        H: AsRef<str>,
        F: AsRef<str>,
    {
        csv_writer::export_records_to_writer(writer, records, headers, fields, preference, &[])
    }

    /// Writes pre-built rows verbatim with the default preference.
    pub fn export_raw<H, V>(&self, headers: &[H], rows: &[Vec<V>]) -> Result<Vec<u8>, ExportError>
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        csv_writer::export_raw(headers, rows, &self.preference, ExportTarget::Export)
    }

    /// Builds the error report of `records`, translating the codes with the service's
    /// message source.
    pub fn export_error_report<T, H>(
        &self,
        errors: &HashMap<u64, Vec<String>>,
        records: &[T],
        headers: &[H],
        fields: &[String],
    ) -> Result<Vec<u8>, ExportError>
    where
        T: CsvRow,
        H: AsRef<str>,
    {
        debug!("Exporting error report");
        error_report::compose_error_report(&self.messages, errors, records, headers, fields)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::{
        core::{
            message::MessageCatalog,
            preference::Preference,
            row::GenericRow,
            transform::{TransformChain, UpperCase},
        },
        error::{ExtractionError, keys},
    };

    fn service() -> CsvService<MessageCatalog> {
        CsvService::new(MessageCatalog::new())
    }

    fn schema() -> CsvSchema {
        CsvSchema::new(&["Name", "Product Group"], &["name", "productGroup"]).unwrap()
    }

    #[test]
    fn default_preference_drives_reads_and_exports() -> Result<(), Box<dyn Error>> {
        let service = service().with_preference(Preference::tab());
        let rows: Vec<GenericRow> =
            service.read_data("Name\tProduct Group\nhod001\t7z46\n", &schema())?;

        let upper = TransformChain::of(UpperCase);
        let bytes = service.export_data(
            &rows,
            schema().headers(),
            &["name", "productGroup"],
            &[TransformChain::new(), upper],
        )?;

        assert_eq!(
            String::from_utf8(bytes)?,
            "Name\tProduct Group\nhod001\t7Z46\n"
        );
        Ok(())
    }

    #[test]
    fn trim_uses_default_delimiter() {
        let service = service().with_preference(Preference::tab());
        assert_eq!(service.trim("a\tb\n1\t2\n\t\n"), "a\tb\n1\t2");
    }

    #[test]
    fn export_to_writer_returns_the_sink() -> Result<(), Box<dyn Error>> {
        let rows = [GenericRow::new()
            .with("name", Some("hod001"))
            .with("productGroup", None)];
        let sink = service().export_data_to_writer(
            Vec::new(),
            &rows,
            schema().headers(),
            &["productGroup", "name"],
        )?;

        assert_eq!(
            String::from_utf8(sink)?,
            "Name,Product Group\r\n,hod001\r\n"
        );
        Ok(())
    }

    #[test]
    fn upload_failures_map_to_error_keys() {
        let service = service();
        let cases = [
            ("products.txt", 10, "Name,Product Group\n", keys::CSV_INVALID_FORMAT),
            ("products.csv", 10_000, "Name,Product Group\n", keys::CSV_INVALID_FILE_SIZE),
            ("products.csv", 10, "  \n", keys::CSV_EMPTY_FILE_CONTENT),
            ("products.csv", 10, "Name\nhod001\n", keys::CSV_IMPORT_INVALID_HEADERS),
            ("products.csv", 10, "Name,Product Group\n", keys::CSV_IMPORT_ERROR),
            ("products.csv", 10, "Name,Product Group\nhod001\n", keys::CSV_IMPORT_INVALID_CONTENT),
        ];

        for (file_name, size, body, key) in cases {
            let error = service
                .read_indexed_upload::<GenericRow, _>(
                    file_name,
                    size,
                    1024,
                    body.as_bytes(),
                    &schema(),
                )
                .unwrap_err();
            assert_eq!(error.error_key(), key, "{file_name} {body:?}");
            assert!(error.is_client_error());
        }
    }

    #[test]
    fn upload_is_decoded() -> Result<(), Box<dyn Error>> {
        let rows: Vec<GenericRow> = service().read_indexed_upload(
            "products.csv",
            40,
            1024,
            "\u{feff}Name,Product Group\nhod001,7Z46\n,\n".as_bytes(),
            &schema(),
        )?;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index(), 2);
        assert_eq!(rows[0].get("productGroup"), Some("7Z46"));
        Ok(())
    }

    #[test]
    fn oversized_upload_is_not_read() {
        let error = service()
            .read_indexed_upload::<GenericRow, _>(
                "products.csv",
                2048,
                1024,
                "".as_bytes(),
                &schema(),
            )
            .unwrap_err();

        assert!(matches!(
            error,
            CsvError::Extraction(ExtractionError::InvalidFileSize { .. })
        ));
    }
}
