pub mod error;
pub mod groq;
pub mod parse;
pub mod reconcile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
}

/// Prompt inputs for one forecast generation. Validated up front so no
/// non-finite value ever reaches reconciliation.
#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub horizon_days: usize,
    pub actual: Vec<f64>,
}

impl GenerateInput {
    pub fn try_new(horizon_days: usize, actual: Vec<f64>) -> anyhow::Result<Self> {
        anyhow::ensure!(horizon_days >= 1, "horizon must be at least 1 day");
        anyhow::ensure!(!actual.is_empty(), "actual series must be non-empty");
        anyhow::ensure!(
            actual.iter().all(|v| v.is_finite()),
            "actual series contains a non-finite value"
        );
        Ok(Self {
            horizon_days,
            actual,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecommendInput {
    pub horizon_days: usize,
    pub actual: Vec<f64>,
    pub forecast: Vec<f64>,
}

/// Parsed reply from the generation service, before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    pub values: Vec<f64>,
    pub explanation: Option<String>,
}

#[async_trait::async_trait]
pub trait ForecastClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate_forecast(&self, input: GenerateInput) -> anyhow::Result<RawForecast>;

    async fn generate_recommendations(&self, input: RecommendInput) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_rejects_zero_horizon() {
        assert!(GenerateInput::try_new(0, vec![1.0]).is_err());
    }

    #[test]
    fn input_rejects_empty_actuals() {
        assert!(GenerateInput::try_new(30, vec![]).is_err());
    }

    #[test]
    fn input_rejects_non_finite_actuals() {
        assert!(GenerateInput::try_new(30, vec![1.0, f64::NAN]).is_err());
        assert!(GenerateInput::try_new(30, vec![f64::INFINITY]).is_err());
    }
}
