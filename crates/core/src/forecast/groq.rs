use crate::config::Settings;
use crate::forecast::error::ForecastDiagnosticsError;
use crate::forecast::parse;
use crate::forecast::{ForecastClient, GenerateInput, Provider, RawForecast, RecommendInput};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_groq_api_key()?.to_string();
        let base_url =
            std::env::var("GROQ_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GROQ_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn create_chat(&self, prompt: String) -> anyhow::Result<ChatResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("forecast service request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read forecast service response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(ForecastDiagnosticsError {
                provider: Provider::Groq,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        serde_json::from_str::<ChatResponse>(&text)
            .with_context(|| format!("failed to decode forecast service response: {text}"))
    }

    fn forecast_prompt(input: &GenerateInput) -> String {
        let horizon = input.horizon_days;
        [
            "You are a sales forecasting assistant.".to_string(),
            format!("Given the past {} days of sales data:", input.actual.len()),
            format!("{:?}", input.actual),
            String::new(),
            format!("Forecast the next {horizon} days of sales as a list of {horizon} numeric values."),
            String::new(),
            "Rules:".to_string(),
            "- Base your forecast on the dataset (increasing, decreasing, or stable).".to_string(),
            "- No flattening or constraining unless extreme outliers are present.".to_string(),
            String::new(),
            "Then, in 2 sentences, explain the likely trend (rising, falling, or stable).".to_string(),
            "Respond in this exact format:".to_string(),
            "[forecast_list]".to_string(),
            "Explanation: your_text_here".to_string(),
        ]
        .join("\n")
    }

    fn recommend_prompt(input: &RecommendInput) -> String {
        [
            "You are a sales analyst. Based on the following sales forecast:".to_string(),
            format!("{:?}", input.forecast),
            "and recent actual data:".to_string(),
            format!("{:?}", input.actual),
            String::new(),
            "Identify the trend (rising, falling, or stable), and provide 3 specific, actionable".to_string(),
            format!(
                "recommendations for improving or sustaining sales performance over the next {} days.",
                input.horizon_days
            ),
            "Focus on marketing, inventory, and pricing strategies.".to_string(),
            "Format your response in short, concise phrasing as bullet points.".to_string(),
        ]
        .join("\n")
    }

    fn response_content(res: &ChatResponse) -> anyhow::Result<&str> {
        let content = res
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ForecastDiagnosticsError {
                provider: Provider::Groq,
                stage: "response",
                detail: "reply carried no message content".to_string(),
                raw_output: None,
                raw_response_json: None,
            }
            .into());
        }
        Ok(content)
    }
}

#[async_trait::async_trait]
impl ForecastClient for GroqClient {
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    async fn generate_forecast(&self, input: GenerateInput) -> anyhow::Result<RawForecast> {
        let res = self.create_chat(Self::forecast_prompt(&input)).await?;
        let content = Self::response_content(&res)?;

        parse::parse_reply(content).map_err(|err| {
            ForecastDiagnosticsError {
                provider: Provider::Groq,
                stage: "parse",
                detail: format!("{err:#}"),
                raw_output: Some(content.to_string()),
                raw_response_json: None,
            }
            .into()
        })
    }

    async fn generate_recommendations(&self, input: RecommendInput) -> anyhow::Result<String> {
        let res = self.create_chat(Self::recommend_prompt(&input)).await?;
        let content = Self::response_content(&res)?;
        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}
