use std::{borrow::Cow, fs::File, io::Write, path::Path};

use csv::{QuoteStyle, Writer, WriterBuilder};
use log::debug;

use crate::{
    core::{
        preference::{CellEncoder, Preference},
        row::CsvRow,
        transform::TransformChain,
    },
    error::{ExportError, ExportTarget, InvalidSchema},
};

/// Writes CSV rows, passing every cell through the preference's [`CellEncoder`].
///
/// Cells are encoded (quoted, escaped, sanitized) before they reach the underlying
/// [`csv::Writer`], which only joins them with the delimiter and terminates rows. Rows may
/// have different lengths.
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::preference::{CellEncoder, Preference};
/// use warehouse_csv::item::csv::csv_writer::CsvRowWriterBuilder;
///
/// let mut writer = CsvRowWriterBuilder::new()
///     .preference(Preference::standard().with_encoder(CellEncoder::EscapeFormula))
///     .from_writer(vec![]);
/// writer.write_values(&["Name", "Comment"]).unwrap();
/// writer.write_values(&["=cmd", "a,b", "extra"]).unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "Name,Comment\r\ncmd,\"a,b\",extra\r\n");
/// ```
pub struct CsvRowWriter<W: Write> {
    writer: Writer<W>,
    preference: Preference,
    target: ExportTarget,
    rows: usize,
}

impl<W: Write> CsvRowWriter<W> {
    /// Writes one row of already serialized values.
    ///
    /// A row that encodes to no bytes at all (no values, or a single empty one) is written as
    /// `""` so that it still reads back as one empty cell.
    pub fn write_values<V: AsRef<str>>(&mut self, values: &[V]) -> Result<(), ExportError> {
        let encoded: Vec<Cow<'_, str>> = values
            .iter()
            .map(|value| self.preference.encode(value.as_ref()))
            .collect();
        let result = self
            .writer
            .write_record(encoded.iter().map(|cell| cell.as_bytes()));
        match result {
            Ok(()) => {
                self.rows += 1;
                Ok(())
            }
            Err(error) => Err(self.write_error(error)),
        }
    }

    /// Writes one record.
    ///
    /// With an empty `fields` list the record's full [`CsvRow::row_values`] are written,
    /// otherwise the named fields in the given order. A non-empty `transforms` list holds one
    /// chain per written column.
    pub fn write_row<T, F>(
        &mut self,
        row: &T,
        fields: &[F],
        transforms: &[TransformChain],
    ) -> Result<(), ExportError>
    where
        T: CsvRow + ?Sized,
        F: AsRef<str>,
    {
        let values: Vec<Option<String>> = if fields.is_empty() {
            row.row_values()
                .into_iter()
                .map(|value| (!value.is_empty()).then_some(value))
                .collect()
        } else {
            fields
                .iter()
                .map(|field| row.field(field.as_ref()))
                .collect::<Result<_, _>>()
                .map_err(|source| ExportError::Field {
                    target: self.target,
                    row: self.rows,
                    source,
                })?
        };

        if !transforms.is_empty() && transforms.len() != values.len() {
            return Err(InvalidSchema::TransformCount {
                headers: values.len(),
                transforms: transforms.len(),
            }
            .into());
        }

        let mut cells = Vec::with_capacity(values.len());
        for (column, value) in values.into_iter().enumerate() {
            let value = match transforms.get(column) {
                Some(chain) => chain
                    .execute(value)
                    .map_err(|source| ExportError::Transform {
                        target: self.target,
                        row: self.rows,
                        column: column + 1,
                        source,
                    })?,
                None => value,
            };
            cells.push(value.unwrap_or_default());
        }
        self.write_values(&cells)
    }

    /// Flushes the internal buffer and the underlying writer.
    pub fn flush(&mut self) -> Result<(), ExportError> {
        self.writer.flush().map_err(|source| ExportError::Io {
            target: self.target,
            source,
        })
    }

    /// Number of rows written so far, header included.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, ExportError> {
        let target = self.target;
        self.writer
            .into_inner()
            .map_err(|error| ExportError::Io {
                target,
                source: error.into_error(),
            })
    }

    fn write_error(&self, source: csv::Error) -> ExportError {
        ExportError::Write {
            target: self.target,
            source,
        }
    }
}

/// Builder for a [`CsvRowWriter`].
///
/// Defaults to [`Preference::standard`] and the [`ExportTarget::Export`] target.
#[derive(Debug, Clone, Copy)]
pub struct CsvRowWriterBuilder {
    preference: Preference,
    target: ExportTarget,
}

impl Default for CsvRowWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRowWriterBuilder {
    pub fn new() -> Self {
        Self {
            preference: Preference::standard(),
            target: ExportTarget::Export,
        }
    }

    pub fn preference(mut self, preference: Preference) -> Self {
        self.preference = preference;
        self
    }

    /// Export path reported in errors.
    pub fn target(mut self, target: ExportTarget) -> Self {
        self.target = target;
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> CsvRowWriter<W> {
        let wtr = WriterBuilder::new()
            .delimiter(self.preference.delimiter)
            .terminator(self.preference.terminator.to_csv())
            // cells arrive already quoted by the encoder
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .has_headers(false)
            .from_writer(wtr);

        CsvRowWriter {
            writer: wtr,
            preference: self.preference,
            target: self.target,
            rows: 0,
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvRowWriter<File>, ExportError> {
        let file = File::create(path).map_err(|source| ExportError::Io {
            target: self.target,
            source,
        })?;
        Ok(self.from_writer(file))
    }
}

/// Writes a header line then one line per record into `writer`.
///
/// Every cell goes through [`CellEncoder::EscapeFormula`] whatever encoder `preference`
/// carries.
pub fn export_records_to_writer<W, T, H, F>(
    writer: W,
    records: &[T],
    headers: &[H],
    fields: &[F],
    preference: &Preference,
    transforms: &[TransformChain],
) -> Result<W, ExportError>
where
    W: Write,
    T: CsvRow,
    H: AsRef<str>,
    F: AsRef<str>,
{
    debug!("Start exporting {} records", records.len());
    let mut wtr = CsvRowWriterBuilder::new()
        .preference(preference.with_encoder(CellEncoder::EscapeFormula))
        .from_writer(writer);

    wtr.write_values(headers)?;
    for record in records {
        wtr.write_row(record, fields, transforms)?;
    }

    let writer = wtr.into_inner()?;
    debug!("End exporting records");
    Ok(writer)
}

/// [`export_records_to_writer`] into a fresh buffer.
pub fn export_records<T, H, F>(
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
    export_records_to_writer(Vec::new(), records, headers, fields, preference, transforms)
}

/// Writes a header line and pre-built rows verbatim, rows may be ragged.
///
/// Every cell goes through [`CellEncoder::EscapeFormula`] whatever encoder `preference`
/// carries.
pub fn export_raw<H, V>(
    headers: &[H],
    rows: &[Vec<V>],
    preference: &Preference,
    target: ExportTarget,
) -> Result<Vec<u8>, ExportError>
where
    H: AsRef<str>,
    V: AsRef<str>,
{
    let mut wtr = CsvRowWriterBuilder::new()
        .preference(preference.with_encoder(CellEncoder::EscapeFormula))
        .target(target)
        .from_writer(Vec::new());

    wtr.write_values(headers)?;
    for row in rows {
        wtr.write_values(row)?;
    }
    wtr.into_inner()
}
