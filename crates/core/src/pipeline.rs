use crate::chart;
use crate::domain::metrics::DashboardMetrics;
use crate::domain::series::ForecastSeries;
use crate::forecast::reconcile;
use crate::forecast::{ForecastClient, GenerateInput, RecommendInput};
use crate::metrics::{self, MetricsError};
use crate::table::SalesTable;

/// One user-triggered "generate forecast" action.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub horizon_days: usize,
    /// Restrict the forecast to one product; `None` covers the whole table.
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub series: ForecastSeries,
    /// True when the flat fallback replaced an unusable generated forecast;
    /// the host should tell the user a degraded forecast is shown.
    pub degraded: bool,
    pub explanation: Option<String>,
    pub recommendations: Option<String>,
}

pub fn run_dashboard(table: &SalesTable) -> Result<DashboardMetrics, MetricsError> {
    metrics::extract(table)
}

/// Loader -> (external generation) -> reconciler -> series assembly.
/// Generation failures degrade to the flat fallback; only structural
/// problems (empty table, corrupted numerics) surface as errors.
pub async fn run_forecast(
    table: &SalesTable,
    client: &dyn ForecastClient,
    request: &ForecastRequest,
) -> anyhow::Result<ForecastRun> {
    let filtered;
    let table = match &request.product {
        Some(product) => {
            filtered = table.filter_product(product);
            &filtered
        }
        None => table,
    };

    let last = table.last_row().ok_or(MetricsError::EmptyTable)?;
    let (last_date, last_sales) = (last.date, last.sales);

    let actual = table.sales_tail(chart::ACTUAL_TAIL_LEN);
    let input = GenerateInput::try_new(request.horizon_days, actual.clone())?;

    let raw = match client.generate_forecast(input).await {
        Ok(raw) => Some(raw),
        Err(err) => {
            tracing::warn!(error = %err, "forecast generation failed; using flat fallback");
            None
        }
    };

    let reconciled = reconcile::reconcile(
        &actual,
        raw.as_ref().map(|r| r.values.as_slice()),
        request.horizon_days,
    )?;

    let explanation = if reconciled.degraded {
        None
    } else {
        raw.as_ref().and_then(|r| r.explanation.clone())
    };

    let recommendations = if reconciled.degraded {
        None
    } else {
        let rec_input = RecommendInput {
            horizon_days: request.horizon_days,
            actual: actual.clone(),
            forecast: reconciled.values.clone(),
        };
        match client.generate_recommendations(rec_input).await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(error = %err, "recommendation generation failed; omitting actions");
                None
            }
        }
    };

    let segment = reconcile::forecast_segment(last_date, last_sales, &reconciled.values);
    let tail = chart::actual_tail(table, chart::ACTUAL_TAIL_LEN);

    Ok(ForecastRun {
        series: chart::build_series(tail, segment),
        degraded: reconciled.degraded,
        explanation,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PointKind;
    use crate::forecast::{Provider, RawForecast};

    struct StubClient {
        values: Vec<f64>,
        explanation: Option<String>,
    }

    #[async_trait::async_trait]
    impl ForecastClient for StubClient {
        fn provider(&self) -> Provider {
            Provider::Groq
        }

        async fn generate_forecast(&self, _input: GenerateInput) -> anyhow::Result<RawForecast> {
            Ok(RawForecast {
                values: self.values.clone(),
                explanation: self.explanation.clone(),
            })
        }

        async fn generate_recommendations(
            &self,
            _input: RecommendInput,
        ) -> anyhow::Result<String> {
            Ok("- Keep inventory steady.".to_string())
        }
    }

    struct FailingClient;

    #[async_trait::async_trait]
    impl ForecastClient for FailingClient {
        fn provider(&self) -> Provider {
            Provider::Groq
        }

        async fn generate_forecast(&self, _input: GenerateInput) -> anyhow::Result<RawForecast> {
            anyhow::bail!("service unavailable")
        }

        async fn generate_recommendations(
            &self,
            _input: RecommendInput,
        ) -> anyhow::Result<String> {
            anyhow::bail!("service unavailable")
        }
    }

    fn table(csv: &str) -> SalesTable {
        SalesTable::from_csv_bytes(csv.as_bytes()).unwrap()
    }

    fn three_day_table() -> SalesTable {
        table("Date,Sales\n2024-01-01,90\n2024-01-02,95\n2024-01-03,100\n")
    }

    #[tokio::test]
    async fn run_covers_tail_bridge_and_horizon() {
        let t = three_day_table();
        let client = StubClient {
            values: vec![100.0; 5],
            explanation: Some("Stable demand.".to_string()),
        };
        let request = ForecastRequest {
            horizon_days: 5,
            product: None,
        };

        let run = run_forecast(&t, &client, &request).await.unwrap();
        assert!(!run.degraded);
        // 3 actual points + bridge + 5 horizon days.
        assert_eq!(run.series.len(), 3 + 1 + 5);
        assert_eq!(run.explanation.as_deref(), Some("Stable demand."));
        assert!(run.recommendations.is_some());

        let bridge = run.series.bridge().unwrap();
        assert_eq!(bridge.value, 100.0);
        assert_eq!(bridge.date, t.last_row().unwrap().date);
    }

    #[tokio::test]
    async fn failed_generation_degrades_to_flat_forecast() {
        let t = three_day_table();
        let request = ForecastRequest {
            horizon_days: 4,
            product: None,
        };

        let run = run_forecast(&t, &FailingClient, &request).await.unwrap();
        assert!(run.degraded);
        assert_eq!(run.explanation, None);
        assert_eq!(run.recommendations, None);

        let forecast_values: Vec<f64> = run
            .series
            .points
            .iter()
            .filter(|p| p.kind == PointKind::Forecast)
            .map(|p| p.value)
            .collect();
        assert_eq!(forecast_values, vec![100.0; 5]); // bridge + 4 horizon days
    }

    #[tokio::test]
    async fn product_filter_restricts_the_forecast_basis() {
        let t = table(
            "Date,Sales,Product\n\
             2024-01-01,10,A\n\
             2024-01-02,999,B\n\
             2024-01-03,20,A\n",
        );
        let client = StubClient {
            values: vec![20.0; 3],
            explanation: None,
        };
        let request = ForecastRequest {
            horizon_days: 3,
            product: Some("A".to_string()),
        };

        let run = run_forecast(&t, &client, &request).await.unwrap();
        // 2 matching rows + bridge + horizon; B's spike never enters.
        assert_eq!(run.series.len(), 2 + 1 + 3);
        assert!(run.series.points.iter().all(|p| p.value <= 26.0));
    }

    #[tokio::test]
    async fn unknown_product_surfaces_empty_table() {
        let t = three_day_table();
        let request = ForecastRequest {
            horizon_days: 3,
            product: Some("missing".to_string()),
        };

        let err = run_forecast(&t, &FailingClient, &request).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<MetricsError>(),
            Some(&MetricsError::EmptyTable)
        );
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_runs() {
        let t = three_day_table();
        let client = StubClient {
            values: vec![104.0, 96.0, 111.0, 90.0, 120.0],
            explanation: Some("Choppy but bounded.".to_string()),
        };
        let request = ForecastRequest {
            horizon_days: 5,
            product: None,
        };

        let a = run_forecast(&t, &client, &request).await.unwrap();
        let b = run_forecast(&t, &client, &request).await.unwrap();
        assert_eq!(a, b);
    }
}
