//! Client for the current-conditions endpoint.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::types::{UnitSystem, WeatherError, WeatherReading};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const STATUS_OK: i64 = 200;

/// The service reports its status field as a number on success and as a
/// string on most error responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusCode {
    Number(i64),
    Text(String),
}

impl StatusCode {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// Expected shape of the current-conditions response.
///
/// Error responses omit everything except `cod` and `message`, so the
/// payload fields stay optional and are checked after the status field.
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    cod: StatusCode,
    message: Option<String>,
    name: Option<String>,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
    main: Option<MainEntry>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainEntry {
    temp: f64,
    humidity: u8,
}

/// HTTP client for current weather conditions.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Create a client against the default endpoint.
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default endpoint. Used by tests.
    pub fn with_base_url(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions for `city`.
    ///
    /// The caller validates that `api_key` and `city` are non-empty before
    /// invoking this; the client performs no validation of its own and has
    /// no side effects beyond the network call.
    pub async fn fetch_current(
        &self,
        api_key: &str,
        city: &str,
        units: UnitSystem,
    ) -> Result<WeatherReading, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", units.as_query_value()),
            ])
            .send()
            .await?;

        // The service signals errors through the body's status field, so
        // the body is parsed regardless of the HTTP status.
        let body: CurrentResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;

        match body.cod.as_i64() {
            Some(STATUS_OK) => {}
            _ => {
                let message = body.message.unwrap_or_else(|| "Error".to_string());
                tracing::warn!("Weather request for {} failed: {}", city, message);
                return Err(WeatherError::Api { message });
            }
        }

        let name = body
            .name
            .ok_or_else(|| WeatherError::Decode("missing location name".to_string()))?;
        let condition = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Decode("missing weather conditions".to_string()))?;
        let main = body
            .main
            .ok_or_else(|| WeatherError::Decode("missing main readings".to_string()))?;

        tracing::debug!("Fetched current conditions for {}", name);

        Ok(WeatherReading {
            city: name,
            description: condition.description,
            temperature: main.temp,
            humidity: main.humidity,
            icon_id: condition.icon,
            fetched_at: Utc::now(),
        })
    }
}
