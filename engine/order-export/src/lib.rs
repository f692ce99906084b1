//! Order export
//!
//! Turns stored orders into an `.xlsx` workbook with a single `Orders`
//! sheet: one header row of column names, then one row per order.

use order_store::StoredOrder;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;

/// Name of the worksheet holding the orders
pub const SHEET_NAME: &str = "Orders";

/// File name offered to the browser for the monthly download
pub const MONTHLY_EXPORT_FILE_NAME: &str = "orders_this_month.xlsx";

/// MIME type of the generated workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Header row, in the order of the `orders` table columns
pub const COLUMNS: [&str; 12] = [
    "id",
    "width",
    "height",
    "bottom_space",
    "weight",
    "quantity",
    "type",
    "printing_method",
    "color_count",
    "hand_attachment",
    "price",
    "date",
];

/// Errors raised while building the workbook
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Too many orders for one sheet: {0}")]
    TooManyRows(usize),
}

/// Cell value for one column of an order row
enum Cell<'a> {
    Number(f64),
    Text(&'a str),
}

fn row_cells(order: &StoredOrder) -> [Cell<'_>; 12] {
    [
        Cell::Number(order.id as f64),
        Cell::Number(order.width),
        Cell::Number(order.height),
        Cell::Number(order.bottom_space),
        Cell::Number(order.weight),
        Cell::Number(order.quantity as f64),
        Cell::Text(order.product_type.as_str()),
        Cell::Text(order.printing_method.as_str()),
        Cell::Number(f64::from(order.color_count)),
        Cell::Text(order.hand_attachment.as_str()),
        Cell::Number(order.price),
        Cell::Text(&order.date),
    ]
}

fn fill_sheet(worksheet: &mut Worksheet, orders: &[StoredOrder]) -> Result<(), ExportError> {
    worksheet.set_name(SHEET_NAME)?;

    let header = Format::new().set_bold();
    for (col, name) in (0u16..).zip(COLUMNS) {
        worksheet.write_string_with_format(0, col, name, &header)?;
    }

    for (index, order) in orders.iter().enumerate() {
        // Row 0 is the header
        let row = u32::try_from(index + 1).map_err(|_| ExportError::TooManyRows(orders.len()))?;
        for (col, cell) in (0u16..).zip(row_cells(order)) {
            match cell {
                Cell::Number(value) => worksheet.write_number(row, col, value)?,
                Cell::Text(value) => worksheet.write_string(row, col, value)?,
            };
        }
    }

    Ok(())
}

/// Build an `.xlsx` workbook from `orders` and return its bytes
pub fn export_orders(orders: &[StoredOrder]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    fill_sheet(workbook.add_worksheet(), orders)?;

    let bytes = workbook.save_to_buffer()?;
    tracing::info!("Exported {} orders ({} bytes)", orders.len(), bytes.len());

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_store::NewOrder;
    use pricing_engine::{price, OrderSpec};
    use std::io::{Cursor, Read};

    fn create_test_orders(count: i64) -> Vec<StoredOrder> {
        (1..=count)
            .map(|id| {
                let spec = OrderSpec {
                    width: 10.0,
                    height: 5.0,
                    bottom_space: 2.0,
                    quantity: id,
                    product_type: "type2".into(),
                    printing_method: "none".into(),
                    color_count: 0,
                    hand_attachment: "none".into(),
                };
                let quote = price(&spec);
                NewOrder::new(spec, quote).into_stored(id, format!("2026-10-{:02}T12:00:00.000Z", id))
            })
            .collect()
    }

    #[test]
    fn test_export_produces_zip_container() {
        let bytes = export_orders(&create_test_orders(3)).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_workbook_contents() {
        let orders = create_test_orders(2);
        let bytes = export_orders(&orders).unwrap();

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(&format!("name=\"{SHEET_NAME}\"")));

        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        for column in COLUMNS {
            assert!(strings.contains(&format!("<t>{column}</t>")), "{column}");
        }
        assert!(strings.contains("<t>type2</t>"));
        assert!(strings.contains("<t>2026-10-02T12:00:00.000Z</t>"));

        // Header plus one row per order, weight in column E
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<row r=\"1\""));
        assert!(sheet.contains("<row r=\"3\""));
        assert!(!sheet.contains("<row r=\"4\""));
        assert!(sheet.contains("<c r=\"E2\""));
        assert!(sheet.contains(&format!("<v>{}</v>", orders[0].weight)));
    }

    #[test]
    fn test_empty_export_is_valid() {
        let bytes = export_orders(&[]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_row_cells_follow_columns() {
        let orders = create_test_orders(1);
        let cells = row_cells(&orders[0]);

        assert_eq!(cells.len(), COLUMNS.len());
        assert!(matches!(cells[0], Cell::Number(id) if id == 1.0));
        assert!(matches!(cells[6], Cell::Text("type2")));
        assert!(matches!(cells[9], Cell::Text("none")));
        assert!(matches!(cells[11], Cell::Text("2026-10-01T12:00:00.000Z")));
    }
}
