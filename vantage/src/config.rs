/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Placeholder key accepted by the provider for demo symbols.
pub const DEFAULT_API_KEY: &str = "demo";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Configuration for the Vantage client.
#[derive(Debug, Clone)]
pub struct VantageConfig {
    /// Base URL of the market-data provider (e.g. `https://www.alphavantage.co`).
    pub base_url: String,
    /// API key sent as the `apikey` query parameter.
    pub api_key: String,
}

impl VantageConfig {
    /// Build a config for `base_url`, reading the API key from the environment.
    ///
    /// Falls back to [`DEFAULT_API_KEY`] when the variable is unset or empty.
    pub fn from_env(base_url: &str) -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        Self {
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

impl Default for VantageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: DEFAULT_API_KEY.into(),
        }
    }
}
