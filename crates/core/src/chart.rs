use crate::domain::series::{ForecastPoint, ForecastSeries, PointKind};
use crate::table::SalesTable;

/// How many trailing observations the chart shows next to the forecast.
pub const ACTUAL_TAIL_LEN: usize = 30;

/// The last `n` rows as chart points tagged `Actual`, oldest first.
pub fn actual_tail(table: &SalesTable, n: usize) -> Vec<ForecastPoint> {
    let rows = table.rows();
    let start = rows.len().saturating_sub(n);
    rows[start..]
        .iter()
        .map(|r| ForecastPoint {
            date: r.date,
            value: r.sales,
            kind: PointKind::Actual,
        })
        .collect()
}

/// Concatenates the actual tail and the forecast segment in chronological
/// order. The last actual date appears twice (once per segment): that is the
/// bridge point, kept on purpose so the two line styles connect without a gap.
pub fn build_series(
    actual_tail: Vec<ForecastPoint>,
    forecast_segment: Vec<ForecastPoint>,
) -> ForecastSeries {
    let mut points = actual_tail;
    points.extend(forecast_segment);
    ForecastSeries { points }
}
