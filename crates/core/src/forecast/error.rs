use crate::forecast::Provider;
use serde_json::Value;
use std::fmt;

/// Carries enough of the failed exchange to debug the generation service
/// without re-running it. Recovered from via the flat-forecast fallback.
#[derive(Debug, Clone)]
pub struct ForecastDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for ForecastDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "forecast service error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for ForecastDiagnosticsError {}
