use crate::domain::metrics::{DashboardMetrics, KpiSet, TopEntity, TrendPoint};
use crate::table::SalesTable;
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

pub const TOP_ENTITY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// No rows survived cleaning; KPI computation is undefined.
    EmptyTable,
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::EmptyTable => write!(f, "sales table has no usable rows"),
        }
    }
}

impl std::error::Error for MetricsError {}

pub fn extract(table: &SalesTable) -> Result<DashboardMetrics, MetricsError> {
    let rows = table.rows();
    if rows.is_empty() {
        return Err(MetricsError::EmptyTable);
    }

    // Sum in full precision; rounding happens once per output value below.
    let total_sales: f64 = rows.iter().map(|r| r.sales).sum();
    let average_sales = total_sales / rows.len() as f64;
    let latest_sales = rows[rows.len() - 1].sales;

    let growth_percent = if rows.len() >= 2 {
        let prior = rows[rows.len() - 2].sales;
        let latest = rows[rows.len() - 1].sales;
        // Zero prior sales would divide by zero; report "undefined" instead.
        (prior != 0.0).then(|| round2((latest - prior) / prior * 100.0))
    } else {
        None
    };

    let total_profit_raw = table.has_profit_column.then(|| {
        rows.iter()
            .filter_map(|r| r.profit)
            .sum::<f64>()
    });

    let order_count = table.has_order_id_column.then(|| {
        rows.iter()
            .filter_map(|r| r.order_id.as_deref())
            .collect::<HashSet<_>>()
            .len() as u64
    });

    let gross_margin_percent = total_profit_raw
        .filter(|_| total_sales != 0.0)
        .map(|profit| round2(profit / total_sales * 100.0));

    let kpis = KpiSet {
        total_sales: round2(total_sales),
        average_sales: round2(average_sales),
        latest_sales: round2(latest_sales),
        growth_percent,
        total_profit: total_profit_raw.map(round2),
        order_count,
        gross_margin_percent,
    };

    Ok(DashboardMetrics {
        kpis,
        trend: monthly_trend(table),
        top_products: top_products(table),
    })
}

/// One point per calendar month with at least one row, ascending.
/// Months with no rows are absent, not zero-filled.
fn monthly_trend(table: &SalesTable) -> Vec<TrendPoint> {
    let mut by_month = BTreeMap::<NaiveDate, f64>::new();
    for row in table.rows() {
        *by_month.entry(month_start(row.date)).or_insert(0.0) += row.sales;
    }

    by_month
        .into_iter()
        .map(|(month, total)| TrendPoint {
            month,
            total_sales: round2(total),
        })
        .collect()
}

/// Top products by summed sales, descending, ties kept in first-encountered
/// order, truncated to `TOP_ENTITY_LIMIT`. `None` unless at least one row
/// carries a product.
fn top_products(table: &SalesTable) -> Option<Vec<TopEntity>> {
    if !table.rows().iter().any(|r| r.product.is_some()) {
        return None;
    }

    let mut totals = HashMap::<&str, (f64, usize)>::new();
    for (idx, row) in table.rows().iter().enumerate() {
        let Some(product) = row.product.as_deref() else {
            continue;
        };
        let entry = totals.entry(product).or_insert((0.0, idx));
        entry.0 += row.sales;
    }

    let mut entities: Vec<(&str, f64, usize)> = totals
        .into_iter()
        .map(|(name, (total, first_idx))| (name, total, first_idx))
        .collect();
    entities.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.2.cmp(&b.2))
    });
    entities.truncate(TOP_ENTITY_LIMIT);

    Some(
        entities
            .into_iter()
            .map(|(name, total, _)| TopEntity {
                name: name.to_string(),
                total_sales: round2(total),
            })
            .collect(),
    )
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 is valid for every month")
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
