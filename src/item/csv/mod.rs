//! CSV support for importing and exporting typed rows.
//!
//! This module provides the pieces that turn CSV text into [`CsvRow`](crate::core::row::CsvRow)
//! records and back, along with the checks and clean-ups applied around them.
//!
//! # Module Architecture
//!
//! 1. **header**: validates the header row of a document against the expected schema.
//!
//! 2. **trim**: drops trailing rows that hold nothing but delimiters and whitespace.
//!
//! 3. **CsvRowReader**: decodes data rows positionally into records, optionally stamping
//!    each one with its source line.
//!
//! 4. **CsvRowWriter**: encodes records or raw rows through the preference's cell encoder.
//!
//! 5. **error_report**: merges translated error messages into rows as trailing columns.
//!
//! Readers and writers follow the builder pattern for configuration.
//!
//! # Examples
//!
//! ## Decoding with source lines
//!
//! ```
//! use warehouse_csv::core::row::{CsvRow, GenericRow};
//! use warehouse_csv::core::schema::CsvSchema;
//! use warehouse_csv::item::csv::csv_reader::CsvRowReaderBuilder;
//!
//! let schema = CsvSchema::new(&["Name", "Sale Price"], &["name", "salePrice"]).unwrap();
//! let csv_data = "\
//! Name,Sale Price
//! hod001,12
//!
//! hod002,
//! ,
//! ";
//!
//! let rows: Vec<GenericRow> = CsvRowReaderBuilder::new()
//!     .from_text(csv_data, &schema)
//!     .read_indexed()
//!     .unwrap();
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].index(), 2);
//! assert_eq!(rows[1].index(), 4);
//! assert_eq!(rows[1].get("salePrice"), None);
//! ```
//!
//! ## Exporting records
//!
//! ```
//! use warehouse_csv::core::preference::Preference;
//! use warehouse_csv::core::row::GenericRow;
//! use warehouse_csv::item::csv::csv_writer::export_records;
//!
//! let rows = vec![GenericRow::new().with("name", Some("-hod001")).with("salePrice", Some("1,5"))];
//! let bytes = export_records(
//!     &rows,
//!     &["Name", "Sale Price"],
//!     &["name", "salePrice"],
//!     &Preference::standard(),
//!     &[],
//! )
//! .unwrap();
//!
//! assert_eq!(String::from_utf8(bytes).unwrap(), "Name,Sale Price\r\nhod001,\"1,5\"\r\n");
//! ```

/// Decoding of data rows into records.
pub mod csv_reader;

/// Encoding of records and raw rows.
pub mod csv_writer;

/// Annotated error report export.
pub mod error_report;

/// Header row validation.
pub mod header;

/// Trailing blank row removal.
pub mod trim;
