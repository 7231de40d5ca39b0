#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Warehouse CSV

 CSV import and export for warehouse data, keeping track of where every row came from so that
 validation errors found later can be written back next to the rows that caused them.

 ## Core Concepts

- **CsvRow:** A typed record. Readers create it with `Default`, fill it column by column and
  stamp it with its source line; writers read it back field by field.
- **CsvSchema:** The expected header labels, the record field bound to each column and an
  optional chain of cell transforms per column.
- **Preference:** The CSV dialect (delimiter, quote, line terminator) and the cell encoder
  used on export.
- **MessageSource:** Translates error codes into the messages shown in error reports.
- **CsvService:** One object exposing every import and export operation.

 ## Features

| **Operation**            | **Description**                                                   |
|--------------------------|-------------------------------------------------------------------|
| header validation        | Set comparison with the first missing header and its position     |
| decoding                 | Positional decoding with per-cell transforms, empty cell = `None` |
| indexed decoding         | Trailing blank rows trimmed, each record stamped with its line    |
| export                   | Records or raw rows, formula triggers stripped from every cell    |
| error report             | Translated error messages appended as trailing columns            |
| upload extraction        | Extension, size and blank body checks                             |

 ## Getting Started

```rust
# use std::collections::HashMap;
# use warehouse_csv::{
#     core::{
#         message::MessageCatalog,
#         row::{CsvRow, GenericRow},
#         schema::CsvSchemaBuilder,
#         transform::{TransformChain, UpperCase},
#     },
#     error::CsvError,
#     service::CsvService,
# };
fn main() -> Result<(), CsvError> {
    let csv = "\u{feff}Name,Product Group,Sale Price
hod001,7z46,
hod002,8b12,12
,,
";

    let schema = CsvSchemaBuilder::new()
        .column("Name", "name")
        .column_with("Product Group", "productGroup", TransformChain::of(UpperCase))
        .column("Sale Price", "salePrice")
        .build()?;

    let mut catalog = MessageCatalog::new();
    catalog.insert("salePrice.empty", "Sale Price is Empty");
    let service = CsvService::new(catalog);

    let rows: Vec<GenericRow> = service.read_indexed_data(csv, &schema)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].index(), 2);
    assert_eq!(rows[0].get("productGroup"), Some("7Z46"));

    let errors: HashMap<u64, Vec<String>> = rows
        .iter()
        .filter(|row| row.get("salePrice").is_none())
        .map(|row| (row.index(), vec!["salePrice.empty".to_string()]))
        .collect();

    let report = service.export_error_report(&errors, &rows, schema.headers(), &[])?;
    assert_eq!(
        String::from_utf8_lossy(&report),
        "Name,Product Group,Sale Price\r\nhod001,7Z46,,Sale Price is Empty\r\nhod002,8B12,12\r\n"
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core abstractions: rows, schemas, transforms, dialects and messages
pub mod core;

/// Error types and catalog keys
pub mod error;

#[doc(inline)]
pub use error::*;

/// Checks and extraction of uploaded CSV files
pub mod extract;

/// CSV readers, writers and reports
pub mod item;

/// Facade over every operation
pub mod service;
