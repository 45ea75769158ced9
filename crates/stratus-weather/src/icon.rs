//! Fetcher for condition pictograms.

use reqwest::Client;

use crate::types::{WeatherError, WeatherIcon};

const DEFAULT_BASE_URL: &str = "https://openweathermap.org";

/// HTTP client for condition icons.
#[derive(Debug, Clone)]
pub struct IconFetcher {
    client: Client,
    base_url: String,
}

impl IconFetcher {
    /// Create a fetcher against the default endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a fetcher against a non-default endpoint. Used by tests.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            // Only the primary weather call carries a timeout bound.
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the icon for `icon_id` and decode it. No retry.
    pub async fn fetch(&self, icon_id: &str) -> Result<WeatherIcon, WeatherError> {
        let url = format!("{}/img/wn/{}@2x.png", self.base_url, icon_id);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(WeatherError::Api {
                message: format!("Icon request failed with status {}", response.status()),
            });
        }

        let bytes = response.bytes().await?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| WeatherError::Decode(format!("not a decodable image: {}", e)))?;

        tracing::debug!(
            "Fetched icon {} ({}x{})",
            icon_id,
            decoded.width(),
            decoded.height()
        );

        Ok(WeatherIcon {
            png: bytes.to_vec(),
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

impl Default for IconFetcher {
    fn default() -> Self {
        Self::new()
    }
}
