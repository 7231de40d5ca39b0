use std::collections::HashMap;

use csv::{Position, Reader, ReaderBuilder, StringRecord, Terminator, Trim};
use log::{debug, error};

use crate::{
    core::{preference::Preference, row::CsvRow, schema::CsvSchema},
    error::{DecodeError, IndexedDecodeError, RowError},
    item::csv::{
        header::{strip_bom, validate_headers},
        trim::trim_trailing_blank_rows_with,
    },
};

/// Decodes CSV text into [`CsvRow`] records according to a [`CsvSchema`].
///
/// The whole document is held in memory. Decoding is atomic: the first offending row fails
/// the call and no partial result is returned.
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::row::{CsvRow, GenericRow};
/// use warehouse_csv::core::schema::CsvSchema;
/// use warehouse_csv::item::csv::csv_reader::CsvRowReaderBuilder;
///
/// let schema = CsvSchema::new(&["Name", "Product Group"], &["name", "productGroup"]).unwrap();
/// let data = "Name,Product Group\nhod001,7Z46\n,,\n";
///
/// let rows: Vec<GenericRow> = CsvRowReaderBuilder::new()
///     .from_text(data, &schema)
///     .read_indexed()
///     .unwrap();
///
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].get("productGroup"), Some("7Z46"));
/// assert_eq!(rows[0].index(), 2);
/// ```
pub struct CsvRowReader<'a> {
    input: &'a str,
    schema: &'a CsvSchema,
    preference: Preference,
}

/// Where and why a row failed.
struct RowFailure {
    column: Option<usize>,
    cause: RowError,
}

impl RowFailure {
    fn at(column: usize, cause: impl Into<RowError>) -> Self {
        RowFailure {
            column: Some(column + 1),
            cause: cause.into(),
        }
    }
}

impl<'a> CsvRowReader<'a> {
    /// Decodes every data row. Fails with [`DecodeError::Empty`] when there is none.
    pub fn read_all<T: CsvRow + Default>(&self) -> Result<Vec<T>, DecodeError> {
        self.decode(strip_bom(self.input), false)
    }

    /// Trims trailing blank rows, decodes every data row and stamps each record with its
    /// 1-based source line, the header being line 1.
    pub fn read_indexed<T: CsvRow + Default>(&self) -> Result<Vec<T>, IndexedDecodeError> {
        let input =
            trim_trailing_blank_rows_with(strip_bom(self.input), self.preference.delimiter);
        Ok(self.decode(&input, true)?)
    }

    fn decode<T: CsvRow + Default>(
        &self,
        input: &str,
        indexed: bool,
    ) -> Result<Vec<T>, DecodeError> {
        debug!("Start reading CSV");
        let mut reader = csv_reader(input, &self.preference);
        let mut lines = SourceLines::new(input);

        let headers = reader
            .headers()
            .map_err(|error| parse_failure(input, error))?
            .clone();
        validate_headers(&headers.iter().collect::<Vec<_>>(), self.schema.headers())?;

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => return Err(parse_failure(input, error)),
            }

            let position = record.position().cloned().unwrap_or_else(Position::new);
            let (start, line) = lines.locate(position.byte());
            let end = reader.position().byte();
            ensure_closed_quotes(input, start, line, end, &self.preference)?;

            let mut row = T::default();
            if let Err(failure) = self.populate(&mut row, &record) {
                error!(
                    "Failed reading CSV at file row = {} and column = {}",
                    line,
                    failure
                        .column
                        .map_or_else(|| "?".to_string(), |c| c.to_string())
                );
                return Err(DecodeError::Malformed {
                    line,
                    column: failure.column,
                    content: raw_text(input, start, Some(end)),
                    cause: failure.cause,
                });
            }

            if indexed {
                row.set_index(line);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            error!("No data was imported");
            return Err(DecodeError::Empty);
        }

        debug!("End reading CSV: {} rows", rows.len());
        Ok(rows)
    }

    fn populate<T: CsvRow>(&self, row: &mut T, record: &StringRecord) -> Result<(), RowFailure> {
        if record.len() != self.schema.len() {
            return Err(RowFailure::at(
                record.len().min(self.schema.len()),
                RowError::ColumnCount {
                    expected: self.schema.len(),
                    actual: record.len(),
                },
            ));
        }

        for (column, cell) in record.iter().enumerate() {
            let Some(field) = self.schema.binding(column) else {
                continue;
            };
            let value = (!cell.is_empty()).then(|| cell.to_string());
            let value = match self.schema.transform(column) {
                Some(chain) => chain
                    .execute(value)
                    .map_err(|error| RowFailure::at(column, error))?,
                None => value,
            };
            row.set_field(field, value)
                .map_err(|error| RowFailure::at(column, error))?;
        }

        Ok(())
    }
}

/// Builder for a [`CsvRowReader`]. Defaults to [`Preference::standard`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvRowReaderBuilder {
    preference: Preference,
}

impl CsvRowReaderBuilder {
    pub fn new() -> Self {
        Self {
            preference: Preference::standard(),
        }
    }

    pub fn preference(mut self, preference: Preference) -> Self {
        self.preference = preference;
        self
    }

    /// Overrides only the delimiter of the current preference.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.preference.delimiter = delimiter;
        self
    }

    pub fn from_text<'a>(self, input: &'a str, schema: &'a CsvSchema) -> CsvRowReader<'a> {
        CsvRowReader {
            input,
            schema,
            preference: self.preference,
        }
    }
}

/// Decodes every data row of `input` into records.
pub fn decode_all<T: CsvRow + Default>(
    input: &str,
    schema: &CsvSchema,
    preference: &Preference,
) -> Result<Vec<T>, DecodeError> {
    CsvRowReaderBuilder::new()
        .preference(*preference)
        .from_text(input, schema)
        .read_all()
}

/// Decodes every data row of `input` into records stamped with their source line.
pub fn decode_indexed<T: CsvRow + Default>(
    input: &str,
    schema: &CsvSchema,
    preference: &Preference,
) -> Result<Vec<T>, IndexedDecodeError> {
    CsvRowReaderBuilder::new()
        .preference(*preference)
        .from_text(input, schema)
        .read_indexed()
}

/// Reads every data row into a map keyed by the file's own headers.
///
/// Empty cells are kept as empty strings. A row whose length differs from the header row
/// fails the call.
pub fn read_to_map(
    input: &str,
    preference: &Preference,
) -> Result<Vec<HashMap<String, String>>, DecodeError> {
    let input = strip_bom(input);
    let mut reader = csv_reader(input, preference);
    let headers = reader
        .headers()
        .map_err(|error| parse_failure(input, error))?
        .clone();

    let mut lines = SourceLines::new(input);
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(error) => return Err(parse_failure(input, error)),
        }

        let position = record.position().cloned().unwrap_or_else(Position::new);
        let (start, line) = lines.locate(position.byte());
        ensure_closed_quotes(input, start, line, reader.position().byte(), preference)?;

        if record.len() != headers.len() {
            return Err(DecodeError::Malformed {
                line,
                column: Some(record.len().min(headers.len()) + 1),
                content: raw_text(input, start, None),
                cause: RowError::ColumnCount {
                    expected: headers.len(),
                    actual: record.len(),
                },
            });
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }

    Ok(rows)
}

fn csv_reader<'a>(input: &'a str, preference: &Preference) -> Reader<&'a [u8]> {
    ReaderBuilder::new()
        .delimiter(preference.delimiter)
        .quote(preference.quote)
        .double_quote(true)
        // accept CR, LF and CRLF whatever the export terminator is
        .terminator(Terminator::CRLF)
        .trim(if preference.ignore_surrounding_spaces {
            Trim::All
        } else {
            Trim::None
        })
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes())
}

fn parse_failure(input: &str, error: csv::Error) -> DecodeError {
    let position = error.position().cloned().unwrap_or_else(Position::new);
    let (start, line) = SourceLines::new(input).locate(position.byte());
    error!("Failed parsing CSV at file row = {}: {}", line, error);
    DecodeError::Malformed {
        line,
        column: None,
        content: raw_text(input, start, None),
        cause: RowError::Parse(error),
    }
}

/// Fails when the record starting at `start` runs to the end of the input with a quoted cell
/// still open. The parser accepts that silently and folds every following line into the cell.
fn ensure_closed_quotes(
    input: &str,
    start: usize,
    line: u64,
    end: u64,
    preference: &Preference,
) -> Result<(), DecodeError> {
    if usize::try_from(end).is_ok_and(|end| end < input.len()) {
        return Ok(());
    }
    let span = input.as_bytes().get(start..).unwrap_or_default();
    let Some(column) = open_quoted_cell(span, preference.delimiter, preference.quote) else {
        return Ok(());
    };

    error!(
        "Failed reading CSV at file row = {} and column = {}: unterminated quote",
        line,
        column + 1
    );
    Err(DecodeError::Malformed {
        line,
        column: Some(column + 1),
        content: raw_text(input, start, None),
        cause: RowError::UnterminatedQuote,
    })
}

/// 0-based column of the quoted cell left open at the end of `record`, if any.
///
/// A quote only opens a cell as its first byte, and a doubled quote inside a quoted cell is an
/// escaped quote.
fn open_quoted_cell(record: &[u8], delimiter: u8, quote: u8) -> Option<usize> {
    let mut column = 0;
    let mut cell_start = true;
    let mut quoted = false;
    let mut bytes = record.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        if quoted {
            if byte == quote && bytes.next_if_eq(&quote).is_none() {
                quoted = false;
            }
            continue;
        }
        match byte {
            b'\r' | b'\n' => return None,
            _ if byte == delimiter => {
                column += 1;
                cell_start = true;
                continue;
            }
            _ if byte == quote && cell_start => quoted = true,
            _ => {}
        }
        cell_start = false;
    }

    quoted.then_some(column)
}

/// Maps byte offsets of the parsed text to 1-based physical lines.
///
/// Record positions reported by the parser may point at the line break ending the previous
/// record or at blank lines before it, so the record starts at the first byte after them.
/// CRLF, LF and a lone CR each end one line. Offsets are expected in increasing order.
struct SourceLines<'a> {
    input: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> SourceLines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    /// First content byte at or after `byte` and the line it sits on.
    fn locate(&mut self, byte: u64) -> (usize, u64) {
        let len = self.input.len();
        let mut start = usize::try_from(byte).map_or(len, |byte| byte.min(len));
        while start < len && matches!(self.input[start], b'\r' | b'\n') {
            start += 1;
        }

        if start < self.offset {
            self.offset = 0;
            self.line = 1;
        }
        self.line += count_line_breaks(&self.input[self.offset..start]);
        self.offset = start;
        (start, self.line)
    }
}

fn count_line_breaks(bytes: &[u8]) -> u64 {
    let mut count = 0;
    let mut previous = 0;
    for &byte in bytes {
        if byte == b'\r' || (byte == b'\n' && previous != b'\r') {
            count += 1;
        }
        previous = byte;
    }
    count
}

/// Untokenized text of a row, from `start` to `end` or to the end of its line.
fn raw_text(input: &str, start: usize, end: Option<u64>) -> String {
    let Some(rest) = input.get(start..) else {
        return String::new();
    };
    let rest = rest.trim_start_matches(['\r', '\n']);
    let start = input.len() - rest.len();
    let text = match end.and_then(|end| usize::try_from(end).ok()) {
        Some(end) if end > start => rest.get(..end - start).unwrap_or(rest),
        _ => rest.split(['\r', '\n']).next().unwrap_or_default(),
    };
    text.trim_end_matches(['\r', '\n']).to_string()
}
