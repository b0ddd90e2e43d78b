use crate::domain::series::{ForecastPoint, PointKind};
use chrono::{Duration, NaiveDate};
use std::fmt;

/// One-step relative swing allowed over the whole horizon, anchored at the
/// last observed value (not compounding day over day).
pub const CLIP_LOWER_FACTOR: f64 = 0.7;
pub const CLIP_UPPER_FACTOR: f64 = 1.3;

pub const SMOOTHING_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Reconciliation needs at least one observed value to anchor on.
    EmptyActual,
    /// A non-finite value entered or was produced by reconciliation.
    /// Upstream validation should make this unreachable; fail fast rather
    /// than let NaN reach the chart.
    NumericCorruption { stage: &'static str },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::EmptyActual => write!(f, "actual series is empty"),
            ReconcileError::NumericCorruption { stage } => {
                write!(f, "non-finite value during reconciliation ({stage})")
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledValues {
    pub values: Vec<f64>,
    /// True when the flat fallback was used because the generated forecast
    /// was missing or unusable.
    pub degraded: bool,
}

/// Turns whatever the generation service returned into a usable forecast of
/// exactly `horizon_days` values: length-normalize, clip into
/// `[last * 0.7, last * 1.3]`, smooth with a centered same-length moving
/// average. A missing or unusable `raw_forecast` falls back to repeating the
/// last actual value unchanged; that path never errors.
pub fn reconcile(
    actual: &[f64],
    raw_forecast: Option<&[f64]>,
    horizon_days: usize,
) -> Result<ReconciledValues, ReconcileError> {
    let last_actual = *actual.last().ok_or(ReconcileError::EmptyActual)?;
    if actual.iter().any(|v| !v.is_finite()) {
        return Err(ReconcileError::NumericCorruption { stage: "actual" });
    }

    let usable = raw_forecast.filter(|raw| !raw.is_empty() && raw.iter().all(|v| v.is_finite()));

    let Some(raw) = usable else {
        return Ok(ReconciledValues {
            values: vec![last_actual; horizon_days],
            degraded: true,
        });
    };

    let mut values = normalize_length(raw, horizon_days);
    clip_to_band(&mut values, last_actual);
    let values = smooth_same_length(&values);

    if values.iter().any(|v| !v.is_finite()) {
        return Err(ReconcileError::NumericCorruption { stage: "smooth" });
    }

    Ok(ReconciledValues {
        values,
        degraded: false,
    })
}

/// Exactly `horizon_days` values: truncate a long reply, pad a short one by
/// repeating its last value.
fn normalize_length(raw: &[f64], horizon_days: usize) -> Vec<f64> {
    let mut values: Vec<f64> = raw.iter().copied().take(horizon_days).collect();
    if let Some(&last) = values.last() {
        while values.len() < horizon_days {
            values.push(last);
        }
    }
    values
}

fn clip_to_band(values: &mut [f64], last_actual: f64) {
    let lower = last_actual * CLIP_LOWER_FACTOR;
    let upper = last_actual * CLIP_UPPER_FACTOR;
    for value in values {
        *value = value.clamp(lower, upper);
    }
}

/// Centered moving average, window `min(SMOOTHING_WINDOW, len)`, preserving
/// length. Edge points average over the in-range neighbors only; no
/// out-of-range padding.
fn smooth_same_length(values: &[f64]) -> Vec<f64> {
    let window = SMOOTHING_WINDOW.min(values.len());
    if window <= 1 {
        return values.to_vec();
    }

    let radius = window / 2;
    let last = values.len() - 1;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(last);
            let span = &values[lo..=hi];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect()
}

/// The forecast segment as dated points: one bridge point at the last actual
/// date (so the rendered segments connect without a gap), then one point per
/// horizon day.
pub fn forecast_segment(
    last_actual_date: NaiveDate,
    last_actual: f64,
    values: &[f64],
) -> Vec<ForecastPoint> {
    let mut points = Vec::with_capacity(values.len() + 1);
    points.push(ForecastPoint {
        date: last_actual_date,
        value: last_actual,
        kind: PointKind::Forecast,
    });
    for (offset, &value) in values.iter().enumerate() {
        points.push(ForecastPoint {
            date: last_actual_date + Duration::days(offset as i64 + 1),
            value,
            kind: PointKind::Forecast,
        });
    }
    points
}
