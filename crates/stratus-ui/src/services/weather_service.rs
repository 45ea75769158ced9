//! Weather backend: fetch work off the UI thread.
//!
//! Each fetch action spawns one worker thread that performs both network
//! calls sequentially and reports back over an mpsc channel. The model's
//! `poll_channel` drains the channel on the UI thread; the worker never
//! touches view state.

use std::sync::mpsc;
use std::sync::Arc;

use base64::Engine as _;
use stratus_weather::{
    IconFetcher, UnitSystem, WeatherClient, WeatherError, WeatherIcon, WeatherReading,
};

/// Error type surfaced to the user for a failed fetch cycle.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// A required field was empty. Raised synchronously, before any
    /// background work starts.
    MissingInput,
    Network(String),
    /// Message reported by the weather service itself (e.g. "city not found").
    Api(String),
    Decode(String),
    NotInitialized,
}

/// Check the required fields. Must pass before any worker is spawned;
/// a failure here means zero network calls.
pub fn validate_request(api_key: &str, city: &str) -> Result<(), FetchError> {
    if api_key.trim().is_empty() || city.trim().is_empty() {
        return Err(FetchError::MissingInput);
    }
    Ok(())
}

impl From<WeatherError> for FetchError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::Network(e) => FetchError::Network(e.to_string()),
            WeatherError::Api { message } => FetchError::Api(message),
            WeatherError::Decode(msg) => FetchError::Decode(msg),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::MissingInput => write!(f, "Please provide API key and city"),
            FetchError::Network(s) => write!(f, "Network error: {}", s),
            // Service messages are shown verbatim.
            FetchError::Api(s) => write!(f, "{}", s),
            FetchError::Decode(s) => write!(f, "Invalid response: {}", s),
            FetchError::NotInitialized => write!(f, "Weather service not initialized"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Field values captured from the window for one fetch cycle.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub api_key: String,
    pub city: String,
    pub units: UnitSystem,
}

/// Messages sent from the worker back to the UI thread.
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of the full fetch chain: conditions, then icon.
    FetchDone(Result<(WeatherReading, WeatherIcon), FetchError>),
}

/// Spawn one worker thread for a fetch cycle.
///
/// The worker calls the weather endpoint first and the icon endpoint on
/// success, then sends a single `FetchDone`. It runs to completion or
/// failure; there is no cancellation. If the receiving side is gone by the
/// time it finishes, the send fails silently and the result is dropped.
pub fn request_fetch(
    tx: &mpsc::Sender<WeatherServiceMessage>,
    client: Arc<WeatherClient>,
    icons: Arc<IconFetcher>,
    request: FetchRequest,
) {
    let tx = tx.clone();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to create fetch runtime: {}", e);
                let _ = tx.send(WeatherServiceMessage::FetchDone(Err(
                    FetchError::NotInitialized,
                )));
                return;
            }
        };

        let result = runtime.block_on(async {
            let reading = client
                .fetch_current(&request.api_key, &request.city, request.units)
                .await?;
            let icon = icons.fetch(&reading.icon_id).await?;
            Ok::<_, WeatherError>((reading, icon))
        });

        if let Err(e) = &result {
            tracing::error!("Fetch cycle for {} failed: {}", request.city, e);
        }

        let _ = tx.send(WeatherServiceMessage::FetchDone(
            result.map_err(FetchError::from),
        ));
    });
}

/// Encode an icon as a `data:` URL consumable by a QML Image source.
pub fn icon_data_url(icon: &WeatherIcon) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&icon.png)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        assert_eq!(
            format!("{}", FetchError::MissingInput),
            "Please provide API key and city"
        );
        assert_eq!(
            format!("{}", FetchError::Api("city not found".into())),
            "city not found"
        );
        assert!(format!("{}", FetchError::Network("timeout".into())).contains("Network"));
        assert!(format!("{}", FetchError::Decode("bad body".into())).contains("Invalid response"));
        assert!(format!("{}", FetchError::NotInitialized).contains("not initialized"));
    }

    #[test]
    fn validate_request_rejects_empty_fields() {
        assert!(matches!(
            validate_request("", "Paris"),
            Err(FetchError::MissingInput)
        ));
        assert!(matches!(
            validate_request("secret", ""),
            Err(FetchError::MissingInput)
        ));
        assert!(matches!(
            validate_request("   ", "Paris"),
            Err(FetchError::MissingInput)
        ));
        assert!(validate_request("secret", "Paris").is_ok());
    }

    #[test]
    fn fetch_error_from_weather_error_keeps_api_message() {
        let err = FetchError::from(WeatherError::Api {
            message: "city not found".to_string(),
        });
        assert!(matches!(&err, FetchError::Api(m) if m == "city not found"));
    }

    #[test]
    fn icon_data_url_has_png_prefix() {
        let icon = WeatherIcon {
            png: vec![1, 2, 3],
            width: 1,
            height: 1,
        };
        let url = icon_data_url(&icon);
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
