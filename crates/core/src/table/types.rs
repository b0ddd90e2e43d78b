use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
    pub date: NaiveDate,
    pub sales: f64,
    pub profit: Option<f64>,
    pub order_id: Option<String>,
    pub product: Option<String>,
}

/// Cleaned upload, sorted ascending by date. Owned by a single pipeline
/// invocation; never shared across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTable {
    rows: Vec<SalesRow>,

    pub has_profit_column: bool,
    pub has_order_id_column: bool,
    pub has_product_column: bool,

    /// Raw rows dropped during cleaning (unparseable date/sales).
    pub dropped_rows: usize,
}

impl SalesTable {
    pub(crate) fn new(
        mut rows: Vec<SalesRow>,
        has_profit_column: bool,
        has_order_id_column: bool,
        has_product_column: bool,
        dropped_rows: usize,
    ) -> Self {
        rows.sort_by_key(|r| r.date);
        Self {
            rows,
            has_profit_column,
            has_order_id_column,
            has_product_column,
            dropped_rows,
        }
    }

    pub fn rows(&self) -> &[SalesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_row(&self) -> Option<&SalesRow> {
        self.rows.last()
    }

    /// Rows whose product matches `name` exactly, as a fresh table.
    pub fn filter_product(&self, name: &str) -> Self {
        let rows: Vec<SalesRow> = self
            .rows
            .iter()
            .filter(|r| r.product.as_deref() == Some(name))
            .cloned()
            .collect();

        Self {
            rows,
            has_profit_column: self.has_profit_column,
            has_order_id_column: self.has_order_id_column,
            has_product_column: self.has_product_column,
            dropped_rows: 0,
        }
    }

    /// Sales values of the last `n` rows, oldest first.
    pub fn sales_tail(&self, n: usize) -> Vec<f64> {
        let start = self.rows.len().saturating_sub(n);
        self.rows[start..].iter().map(|r| r.sales).collect()
    }
}
