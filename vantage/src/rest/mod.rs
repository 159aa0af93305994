pub mod endpoints;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::VantageConfig;
use crate::error::{Result, VantageError};

/// Provider field that signals a rate-limit condition.
const NOTE_FIELD: &str = "Note";
/// Newer wording of the same rate-limit notice.
const INFORMATION_FIELD: &str = "Information";
/// Provider field carrying a request error (e.g. unknown symbol).
const ERROR_FIELD: &str = "Error Message";

/// HTTP client wrapper for the provider's `/query` endpoint.
#[derive(Debug, Clone)]
pub struct VantageHttpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VantageHttpClient {
    pub fn new(config: &VantageConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// GET `/query?function=...` and decode the JSON body into `T`.
    ///
    /// Provider notices are checked before the body is decoded, so a rate
    /// limit is reported even when the rest of the payload looks valid.
    pub async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/query", self.base_url);
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        query.push(("function", function));
        query.extend_from_slice(params);
        query.push(("apikey", self.api_key.as_str()));

        debug!(function, "provider request");
        let resp = self.client.get(&url).query(&query).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(VantageError::Http {
                status,
                message: body,
            });
        }

        let body = resp.text().await?;
        let value: Value = serde_json::from_str(&body)?;
        check_notice(&value)?;
        serde_json::from_value(value).map_err(VantageError::Json)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map provider notices embedded in an otherwise successful response to errors.
pub fn check_notice(value: &Value) -> Result<()> {
    if let Some(note) = notice_text(value, NOTE_FIELD) {
        warn!(note = %note, "provider rate limit");
        return Err(VantageError::RateLimited(note));
    }
    if let Some(info) = notice_text(value, INFORMATION_FIELD) {
        warn!(info = %info, "provider rate limit");
        return Err(VantageError::RateLimited(info));
    }
    if let Some(msg) = notice_text(value, ERROR_FIELD) {
        return Err(VantageError::Provider(msg));
    }
    Ok(())
}

fn notice_text(value: &Value, field: &str) -> Option<String> {
    let v = value.get(field)?;
    Some(match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    })
}
