//! HTTP client for the dashboard API
//!
//! Used by the CLI to pull datasets from a running utilize-api instance.
//! Timeouts are reported distinctly from other transport failures so the
//! caller can suggest a retry instead of a connectivity check.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::constants;
use crate::dataset::{DeviceDataResponse, InitialDataResponse};

/// Failure modes of a dashboard API call
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned HTTP {0}")]
    Http(u16),
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Client bound to one API base URL
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
}

impl DashboardClient {
    /// Build a client with the standard request timeout.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(constants::FETCH_TIMEOUT_SECS))
    }

    /// Build a client with the configured request timeout.
    pub fn from_config(base_url: &str, cfg: &DashboardConfig) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(cfg.fetch_timeout_secs))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    /// GET /api/initial-data: the device catalog keyed by AE title.
    pub async fn fetch_initial_data(&self) -> Result<InitialDataResponse, ApiError> {
        let body: InitialDataResponse = self.get_json("/api/initial-data").await?;
        if let Some(msg) = &body.error {
            return Err(ApiError::Backend(msg.clone()));
        }
        Ok(body)
    }

    /// GET /api/device-data/{ae_title}: the full dataset for one device.
    pub async fn fetch_device_data(&self, ae_title: &str) -> Result<DeviceDataResponse, ApiError> {
        let body: DeviceDataResponse =
            self.get_json(&format!("/api/device-data/{ae_title}")).await?;
        if let Some(msg) = &body.error {
            return Err(ApiError::Backend(msg.clone()));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = DashboardClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_from_config_builds_with_custom_timeout() {
        let cfg = DashboardConfig {
            fetch_timeout_secs: 5,
            ..Default::default()
        };
        assert!(DashboardClient::from_config("http://localhost:8000", &cfg).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::Timeout.to_string(), "request timed out");
        assert_eq!(ApiError::Http(404).to_string(), "server returned HTTP 404");
        assert_eq!(
            ApiError::Backend("boom".to_string()).to_string(),
            "backend error: boom"
        );
    }
}
