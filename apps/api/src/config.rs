use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails with context if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    /// Chat webhook for shortage alerts. Unset means alerts are logged and dropped.
    pub slack_webhook_url: Option<String>,
    pub erp_base_url: String,
    pub erp_api_token: String,
    /// Lookahead window (days) for the asset demand forecast.
    pub forecast_window_days: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: require_env("LLM_API_KEY")?,
            slack_webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            erp_base_url: require_env("ERP_BASE_URL")?,
            erp_api_token: require_env("ERP_API_TOKEN")?,
            forecast_window_days: std::env::var("FORECAST_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .context("FORECAST_WINDOW_DAYS must be a whole number of days")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
