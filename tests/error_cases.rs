mod common;

use common::{FIELDS, HEADERS, Product, init_logger};
use warehouse_csv::{
    core::{
        message::MessageCatalog,
        schema::{CsvSchema, CsvSchemaBuilder},
        transform::{TransformChain, TransformResult},
    },
    error::{
        CsvError, DecodeError, FieldError, IndexedDecodeError, InvalidSchema, RowError,
        SchemaError, TransformError, keys,
    },
    service::CsvService,
};

fn headers_line() -> String {
    format!("{}\n", HEADERS.join(","))
}

fn schema() -> CsvSchema {
    CsvSchema::new(&HEADERS, &FIELDS).unwrap()
}

fn service() -> CsvService<MessageCatalog> {
    init_logger();
    CsvService::new(MessageCatalog::new())
}

#[test]
fn header_only_document_has_no_data() {
    let service = service();

    let error = service
        .read_data::<Product>(&headers_line(), &schema())
        .unwrap_err();
    assert!(matches!(error, DecodeError::Empty));

    let error = service
        .read_indexed_data::<Product>(&headers_line(), &schema())
        .unwrap_err();
    assert!(matches!(error, IndexedDecodeError::NoDataImported));
    assert_eq!(CsvError::from(error).error_key(), keys::CSV_IMPORT_ERROR);
}

#[test]
fn header_followed_by_blank_rows_has_no_data() {
    let input = format!("{}\n,,,,\n, , ,,\n", headers_line());

    let error = service()
        .read_indexed_data::<Product>(&input, &schema())
        .unwrap_err();

    assert!(matches!(error, IndexedDecodeError::NoDataImported));
}

#[test]
fn empty_input_without_schema_has_no_data() {
    let empty = CsvSchemaBuilder::new().build().unwrap();

    let error = service().read_data::<Product>("", &empty).unwrap_err();

    assert!(matches!(error, DecodeError::Empty));
}

#[test]
fn empty_input_misses_the_first_header() {
    let error = service().read_data::<Product>("", &schema()).unwrap_err();

    assert!(matches!(
        error,
        DecodeError::Schema(SchemaError::MissingHeader { column: 1, .. })
    ));
}

#[test]
fn each_missing_header_is_reported() {
    let service = service();

    for (position, missing) in HEADERS.iter().enumerate() {
        let headers: Vec<&str> = HEADERS.iter().copied().filter(|h| h != missing).collect();
        let input = format!("{}\nhod001,7Z46,1,2\n", headers.join(","));

        let error = service
            .read_indexed_data::<Product>(&input, &schema())
            .unwrap_err();

        match error {
            IndexedDecodeError::InvalidHeaders(SchemaError::MissingHeader { column, label }) => {
                assert_eq!(column, position + 1);
                assert_eq!(label, *missing);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn empty_header_cell_is_a_missing_header() {
    let input = "Name,Product Group,Sale Price,,Article\nhod001,7Z46,1234567890,,";

    let error = service()
        .read_indexed_data::<Product>(input, &schema())
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "invalid headers: missing header 'Purchase Price' expected at column 4"
    );
    assert!(matches!(
        error,
        IndexedDecodeError::InvalidHeaders(SchemaError::MissingHeader { column: 4, .. })
    ));
}

#[test]
fn incorrect_expected_headers_are_rejected() {
    let input = format!("{}hod001,7z46,ek12345678,,", headers_line());
    let schema = CsvSchema::new(
        &["Name123", "Product$@#e Group", "Sale453al Price", "Purchase Price", "Article"],
        &FIELDS,
    )
    .unwrap();

    let error = service()
        .read_indexed_data::<Product>(&input, &schema)
        .unwrap_err();

    let error = CsvError::from(error);
    assert_eq!(error.error_key(), keys::CSV_IMPORT_INVALID_HEADERS);
    assert!(error.is_client_error());
}

#[test]
fn extra_header_is_rejected() {
    let input = format!("{},Comment\nhod001,7Z46,1,,,x\n", HEADERS.join(","));

    let error = service()
        .read_indexed_data::<Product>(&input, &schema())
        .unwrap_err();

    assert!(matches!(
        error,
        IndexedDecodeError::InvalidHeaders(SchemaError::UnexpectedHeaders { unexpected })
            if unexpected == vec!["Comment".to_string()]
    ));
}

#[test]
fn bindings_unknown_to_the_record_fail_the_row() {
    let input = format!("{}hod001,7Z46,1234567890,,", headers_line());
    let schema = CsvSchema::new(&HEADERS, &HEADERS).unwrap();
    let service = service();

    let error = service.read_data::<Product>(&input, &schema).unwrap_err();
    match error {
        DecodeError::Malformed {
            line,
            column,
            cause: RowError::Field(FieldError::Unknown(field)),
            ..
        } => {
            assert_eq!(line, 2);
            assert_eq!(column, Some(1));
            assert_eq!(field, "Name");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let error = service
        .read_indexed_data::<Product>(&input, &schema)
        .unwrap_err();
    assert!(matches!(
        error,
        IndexedDecodeError::InvalidContent { line: 2, ref content, .. }
            if content == "hod001,7Z46,1234567890,,"
    ));
    assert_eq!(
        CsvError::from(error).error_key(),
        keys::CSV_IMPORT_INVALID_CONTENT
    );
}

#[test]
fn short_row_reports_line_and_content() {
    let input = format!("{}hod001,7Z46,1\nhod002,8B12,2,,\n", headers_line());

    let error = service()
        .read_indexed_data::<Product>(&input, &schema())
        .unwrap_err();

    match error {
        IndexedDecodeError::InvalidContent {
            line,
            content,
            cause,
        } => {
            assert_eq!(line, 2);
            assert_eq!(content, "hod001,7Z46,1");
            assert!(matches!(
                cause,
                RowError::ColumnCount {
                    expected: 5,
                    actual: 3
                }
            ));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn failing_transform_aborts_the_whole_decode() {
    let reject_prices = TransformChain::of(|value: String| -> TransformResult {
        value
            .parse::<u64>()
            .map(|_| value.clone())
            .map_err(|_| TransformError::new(format!("'{value}' is not a price")))
    });
    let schema = schema()
        .transforms(vec![
            TransformChain::new(),
            TransformChain::new(),
            reject_prices,
            TransformChain::new(),
            TransformChain::new(),
        ])
        .unwrap();
    let input = format!("{}hod001,7Z46,12,,\nhod002,7Z46,twelve,,\n", headers_line());

    let error = service()
        .read_data::<Product>(&input, &schema)
        .unwrap_err();

    match error {
        DecodeError::Malformed {
            line,
            column,
            cause: RowError::Transform(error),
            ..
        } => {
            assert_eq!(line, 3);
            assert_eq!(column, Some(3));
            assert_eq!(error, TransformError::new("'twelve' is not a price"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn mismatched_schema_is_rejected_before_reading() {
    let error = CsvSchema::new(&HEADERS, &FIELDS[..4]).unwrap_err();
    assert_eq!(
        error,
        InvalidSchema::BindingCount {
            headers: 5,
            bindings: 4
        }
    );

    let error = schema()
        .transforms(vec![TransformChain::new(); 2])
        .unwrap_err();
    assert_eq!(
        error,
        InvalidSchema::TransformCount {
            headers: 5,
            transforms: 2
        }
    );
    assert!(!CsvError::from(error).is_client_error());
}

#[test]
fn crlf_row_content_has_no_line_breaks() {
    let input = format!(
        "{}\r\nhod001,7Z46,1,,\r\n\r\nhod002,7Z46\r\nhod003,7Z46,3,,\r\n",
        HEADERS.join(",")
    );

    let error = service()
        .read_indexed_data::<Product>(&input, &schema())
        .unwrap_err();

    match error {
        IndexedDecodeError::InvalidContent { line, content, .. } => {
            assert_eq!(line, 4);
            assert_eq!(content, "hod002,7Z46");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unterminated_quote_fails_instead_of_merging_rows() {
    let input = format!("{}hod001,\"7Z46,1,,\nhod002,7Z46,2,,\n", headers_line());

    let error = service()
        .read_indexed_data::<Product>(&input, &schema())
        .unwrap_err();

    match error {
        IndexedDecodeError::InvalidContent {
            line,
            content,
            cause,
        } => {
            assert_eq!(line, 2);
            assert_eq!(content, "hod001,\"7Z46,1,,");
            assert!(matches!(cause, RowError::UnterminatedQuote));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
