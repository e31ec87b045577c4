use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_SOW_CLIENT_ROUTE: &str = "/sow-generator";

/// Application configuration loaded from environment variables.
///
/// The provider credential is optional at startup: a missing key is reported
/// per request as a configuration error so the rest of the API stays usable.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub use_mock_recommendations: bool,
    pub sow_client_route: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            use_mock_recommendations: optional_env("USE_MOCK_RECOMMENDATIONS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            sow_client_route: optional_env("SOW_CLIENT_ROUTE")
                .unwrap_or_else(|| DEFAULT_SOW_CLIENT_ROUTE.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            use_mock_recommendations: false,
            sow_client_route: DEFAULT_SOW_CLIENT_ROUTE.to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Reads a variable, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Boolean-like flag parsing: `1`, `true`, `yes`, `on` (any case) are true.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
