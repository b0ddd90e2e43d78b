use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Segment tag carried per point so the chart layer can style
/// actual (solid) and forecast (dashed) runs separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Actual,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub kind: PointKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point of the forecast segment, i.e. the bridge point.
    pub fn bridge(&self) -> Option<&ForecastPoint> {
        self.points.iter().find(|p| p.kind == PointKind::Forecast)
    }
}
