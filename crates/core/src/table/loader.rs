use crate::table::types::{SalesRow, SalesTable};
use anyhow::Context;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The byte stream is not a well-formed delimited table.
    Parse(String),
    /// A required column is absent; names the first one missing.
    Schema { missing_column: &'static str },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(detail) => write!(f, "could not parse upload as a table: {detail}"),
            LoadError::Schema { missing_column } => {
                write!(f, "missing required column: {missing_column}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    sales: usize,
    date: usize,
    profit: Option<usize>,
    order_id: Option<usize>,
    product: Option<usize>,
}

impl SalesTable {
    pub fn from_csv_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::from_csv_bytes(&bytes)?)
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let text = decode_bytes(bytes);

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| LoadError::Parse(e.to_string()))?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::Parse("input has no header row".to_string()));
        }

        let columns = resolve_columns(&headers)?;

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record.map_err(|e| LoadError::Parse(e.to_string()))?;
            match parse_row(&record, &columns) {
                Some(row) => rows.push(row),
                None => dropped += 1,
            }
        }

        Ok(SalesTable::new(
            rows,
            columns.profit.is_some(),
            columns.order_id.is_some(),
            columns.product.is_some(),
            dropped,
        ))
    }
}

/// Uploads are usually UTF-8; spreadsheet exports occasionally arrive as
/// Windows-1252, which is decoded losslessly for the ASCII range we care about.
fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnIndex, LoadError> {
    let find = |wanted: &[&str]| {
        headers
            .iter()
            .position(|h| wanted.contains(&normalize_header(h).as_str()))
    };

    // Required columns are checked Sales-first so the reported missing
    // column is deterministic.
    let Some(sales) = find(&["sales"]) else {
        return Err(LoadError::Schema {
            missing_column: "Sales",
        });
    };
    let Some(date) = find(&["date"]) else {
        return Err(LoadError::Schema {
            missing_column: "Date",
        });
    };

    Ok(ColumnIndex {
        sales,
        date,
        profit: find(&["profit"]),
        order_id: find(&["order id", "order_id", "orderid"]),
        product: find(&["product"]),
    })
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Returns `None` when the row must be dropped: unparseable date or sales.
/// Missing optional fields stay `None` on the row instead.
fn parse_row(record: &csv::StringRecord, columns: &ColumnIndex) -> Option<SalesRow> {
    let date = parse_date(record.get(columns.date)?)?;
    let sales = parse_sales(record.get(columns.sales)?)?;

    let opt_f64 = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    let opt_string = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Some(SalesRow {
        date,
        sales,
        profit: opt_f64(columns.profit),
        order_id: opt_string(columns.order_id),
        product: opt_string(columns.product),
    })
}

/// Accepts ISO (`YYYY-MM-DD`) and US (`MM/DD/YYYY`) forms.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Sales must be a finite, non-negative number; anything else drops the row
/// rather than being coerced to zero.
fn parse_sales(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> SalesTable {
        SalesTable::from_csv_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn loads_minimal_table_sorted_by_date() {
        let t = table("Date,Sales\n2024-02-01,150\n2024-01-01,100\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(t.rows()[0].sales, 100.0);
        assert_eq!(t.rows()[1].sales, 150.0);
        assert_eq!(t.dropped_rows, 0);
    }

    #[test]
    fn missing_sales_column_is_schema_error() {
        let err = SalesTable::from_csv_bytes(b"Date,Amount\n2024-01-01,5\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::Schema {
                missing_column: "Sales"
            }
        );
    }

    #[test]
    fn sales_is_reported_before_date_when_both_missing() {
        let err = SalesTable::from_csv_bytes(b"Product,Amount\na,5\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::Schema {
                missing_column: "Sales"
            }
        );
    }

    #[test]
    fn missing_date_column_is_schema_error() {
        let err = SalesTable::from_csv_bytes(b"Sales,Product\n5,a\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::Schema {
                missing_column: "Date"
            }
        );
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let t = table("date, SALES ,PRODUCT\n2024-01-01,10,Widget\n");
        assert_eq!(t.len(), 1);
        assert!(t.has_product_column);
        assert_eq!(t.rows()[0].product.as_deref(), Some("Widget"));
    }

    #[test]
    fn accepts_us_date_format() {
        let t = table("Date,Sales\n01/31/2024,10\n");
        assert_eq!(t.rows()[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn unparseable_date_or_sales_drops_the_row() {
        let t = table("Date,Sales\nnot-a-date,10\n2024-01-01,abc\n2024-01-02,50\n");
        assert_eq!(t.len(), 1);
        assert_eq!(t.dropped_rows, 2);
        assert_eq!(t.rows()[0].sales, 50.0);
    }

    #[test]
    fn negative_or_non_finite_sales_drops_the_row() {
        let t = table("Date,Sales\n2024-01-01,-5\n2024-01-02,NaN\n2024-01-03,inf\n2024-01-04,7\n");
        assert_eq!(t.len(), 1);
        assert_eq!(t.dropped_rows, 3);
    }

    #[test]
    fn optional_columns_keep_null_per_row() {
        let t = table(
            "Date,Sales,Profit,Order ID,Product\n\
             2024-01-01,100,20,A-1,Widget\n\
             2024-01-02,50,,,\n",
        );
        assert!(t.has_profit_column && t.has_order_id_column && t.has_product_column);
        assert_eq!(t.rows()[0].profit, Some(20.0));
        assert_eq!(t.rows()[1].profit, None);
        assert_eq!(t.rows()[1].order_id, None);
        assert_eq!(t.rows()[1].product, None);
    }

    #[test]
    fn absent_optional_columns_are_flagged_absent() {
        let t = table("Date,Sales\n2024-01-01,100\n");
        assert!(!t.has_profit_column);
        assert!(!t.has_order_id_column);
        assert!(!t.has_product_column);
    }

    #[test]
    fn uneven_record_is_a_parse_error() {
        let err = SalesTable::from_csv_bytes(b"Date,Sales\n2024-01-01,1,extra\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let err = SalesTable::from_csv_bytes(b"").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn decodes_windows_1252_product_names() {
        let mut bytes = b"Date,Sales,Product\n2024-01-01,10,Caf".to_vec();
        bytes.push(0xE9); // 'e' acute in Windows-1252, invalid as bare UTF-8
        bytes.extend_from_slice(b"\n");
        let t = SalesTable::from_csv_bytes(&bytes).unwrap();
        assert_eq!(t.rows()[0].product.as_deref(), Some("Caf\u{e9}"));
    }

    #[test]
    fn filter_product_keeps_matching_rows_only() {
        let t = table(
            "Date,Sales,Product\n\
             2024-01-01,10,A\n\
             2024-01-02,20,B\n\
             2024-01-03,30,A\n",
        );
        let filtered = t.filter_product("A");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.rows().iter().all(|r| r.product.as_deref() == Some("A")));
        assert!(t.filter_product("missing").is_empty());
    }

    #[test]
    fn sales_tail_returns_last_n_oldest_first() {
        let t = table("Date,Sales\n2024-01-01,1\n2024-01-02,2\n2024-01-03,3\n");
        assert_eq!(t.sales_tail(2), vec![2.0, 3.0]);
        assert_eq!(t.sales_tail(10), vec![1.0, 2.0, 3.0]);
    }
}
