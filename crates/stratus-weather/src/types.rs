use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit system sent to the weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

/// A single observation of current conditions. Not persisted.
#[derive(Debug, Clone)]
pub struct WeatherReading {
    /// Location name as reported by the service.
    pub city: String,
    /// Condition description, lowercase as reported (e.g. "clear sky").
    pub description: String,
    pub temperature: f64,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    /// Short code for the condition pictogram (e.g. "01d").
    pub icon_id: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Multi-line summary shown in the result area.
    pub fn display_text(&self) -> String {
        format!(
            "{}: {}\nTemp: {}°\nHumidity: {}%",
            self.city,
            title_case(&self.description),
            self.temperature,
            self.humidity
        )
    }
}

/// A condition icon fetched from the image endpoint.
///
/// Holds the original encoded bytes alongside the dimensions obtained by
/// decoding them, so callers can hand the bytes to any image view.
#[derive(Debug, Clone)]
pub struct WeatherIcon {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Capitalize the first letter of each space-separated word and lowercase
/// the rest.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Weather fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered but its status field was not the success value.
    #[error("{message}")]
    Api { message: String },
    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),
}
