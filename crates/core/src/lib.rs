pub mod chart;
pub mod domain;
pub mod forecast;
pub mod metrics;
pub mod pipeline;
pub mod table;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub groq_api_key: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                groq_api_key: std::env::var("GROQ_API_KEY").ok(),
            })
        }

        pub fn require_groq_api_key(&self) -> anyhow::Result<&str> {
            self.groq_api_key
                .as_deref()
                .context("GROQ_API_KEY is required")
        }
    }
}
