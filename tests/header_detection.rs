use freight_invoice_ingest::ingestion::{header_search_order, locate, row_looks_like_header};
use freight_invoice_ingest::types::{RawGrid, Value};
use freight_invoice_ingest::vendor::Vendor;

const ALL_VENDORS: [Vendor; 4] = [Vendor::FedEx, Vendor::Ups, Vendor::Usps, Vendor::Unknown];

fn fedex_header() -> Vec<&'static str> {
    vec![
        "Tracking Number",
        "Invoice Date",
        "Ship Date",
        "Service Type",
        "Net Charge",
        "Recipient State",
    ]
}

#[test]
fn fedex_header_below_three_preamble_rows() {
    let grid = RawGrid::from_text_rows(vec![
        vec!["FedEx Invoice Detail"],
        vec!["Account Number", "123456789"],
        vec!["Invoice Total", "$24.82"],
        fedex_header(),
        vec!["794612345678", "08/02/2025", "07/30/2025", "FedEx Ground", "$19.82", "CA"],
    ]);
    assert_eq!(locate(&grid, Vendor::FedEx, 10), Some(3));
    // Unknown vendor scans from row 0 but the preamble rows are too narrow.
    assert_eq!(locate(&grid, Vendor::Unknown, 10), Some(3));
}

#[test]
fn header_at_row_zero_is_found_after_preferred_rows() {
    let grid = RawGrid::from_text_rows(vec![
        fedex_header(),
        vec!["794612345678", "08/02/2025", "07/30/2025", "FedEx Ground", "$19.82", "CA"],
        vec!["794612345679", "08/02/2025", "07/31/2025", "FedEx 2Day", "$5.00", "NY"],
    ]);
    assert_eq!(locate(&grid, Vendor::FedEx, 10), Some(0));
}

#[test]
fn result_is_always_below_max_rows() {
    let mut rows: Vec<Vec<&str>> = vec![vec!["1", "2", "3", "4"]; 12];
    rows[11] = fedex_header();
    let grid = RawGrid::from_text_rows(rows);
    for vendor in ALL_VENDORS {
        for max_rows in 0..=12 {
            if let Some(idx) = locate(&grid, vendor, max_rows) {
                assert!(idx < max_rows, "{vendor} returned {idx} for max_rows={max_rows}");
            }
        }
    }
}

#[test]
fn search_orders_cover_every_row_once() {
    for vendor in ALL_VENDORS {
        let mut order = header_search_order(vendor, 10);
        order.sort_unstable();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }
}

#[test]
fn narrow_rows_never_qualify() {
    let rows = [
        vec!["Tracking Number", "Invoice Date", "Billed Weight"],
        vec!["Tracking Number", "", "Invoice Date", "", "Billed Weight"],
    ];
    for row in rows {
        let mut grid = RawGrid::from_text_rows(vec![row]);
        let cells: Vec<Value> = grid.rows.remove(0);
        for vendor in ALL_VENDORS {
            assert!(!row_looks_like_header(&cells, vendor));
        }
    }
}

#[test]
fn totals_rows_are_rejected() {
    let grid = RawGrid::from_text_rows(vec![vec![
        "Tracking Number",
        "Invoice Date",
        "Billed Weight",
        "Total",
        "$1,234.50",
    ]]);
    for vendor in ALL_VENDORS {
        assert!(!row_looks_like_header(&grid.rows[0], vendor));
    }
}

#[test]
fn all_numeric_grid_has_no_header() {
    let grid = RawGrid::from_text_rows(vec![vec!["1", "2.5", "3", "4", "5"]; 10]);
    for vendor in ALL_VENDORS {
        assert_eq!(locate(&grid, vendor, 10), None);
    }
}

#[test]
fn spreadsheet_numbers_count_as_numeric() {
    let row = vec![
        Value::Utf8("Tracking Number".into()),
        Value::Utf8("Invoice Date".into()),
        Value::Float64(1.0),
        Value::Float64(2.0),
        Value::Int64(3),
    ];
    assert!(!row_looks_like_header(&row, Vendor::FedEx));
}
