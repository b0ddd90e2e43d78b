use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub total_sales: f64,
    pub average_sales: f64,
    pub latest_sales: f64,

    /// Percent change between the last two chronological rows.
    /// `None` with fewer than 2 rows, or when the prior value is zero.
    pub growth_percent: Option<f64>,

    // Only populated when the source column exists in the upload.
    pub total_profit: Option<f64>,
    pub order_count: Option<u64>,
    pub gross_margin_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First day of the calendar month the point aggregates.
    pub month: NaiveDate,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntity {
    pub name: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub kpis: KpiSet,
    pub trend: Vec<TrendPoint>,
    pub top_products: Option<Vec<TopEntity>>,
}
