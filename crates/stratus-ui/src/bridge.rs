//! Process-wide services shared by the QML models.
//!
//! The settings path and the HTTP clients are injected once at startup and
//! held in statics so any model instantiated by the QML engine can reach
//! them.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use stratus_weather::{IconFetcher, WeatherClient};

static SETTINGS_PATH: OnceLock<PathBuf> = OnceLock::new();
static WEATHER_CLIENT: OnceLock<Arc<WeatherClient>> = OnceLock::new();
static ICON_FETCHER: OnceLock<Arc<IconFetcher>> = OnceLock::new();

/// Initialize shared services. Call once at application startup, before the
/// QML engine instantiates any model.
pub fn initialize_services(settings_path: PathBuf) -> bool {
    if SETTINGS_PATH.set(settings_path).is_err() {
        tracing::warn!("UI services already initialized");
        return true;
    }

    let client = match WeatherClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("Failed to create weather client: {}", e);
            return false;
        }
    };

    let _ = WEATHER_CLIENT.set(client);
    let _ = ICON_FETCHER.set(Arc::new(IconFetcher::new()));

    tracing::info!("UI services initialized");
    true
}

/// Path of the persisted settings file. None before initialization.
pub fn settings_path() -> Option<&'static Path> {
    SETTINGS_PATH.get().map(PathBuf::as_path)
}

/// Shared weather client. None before initialization.
pub fn weather_client() -> Option<Arc<WeatherClient>> {
    WEATHER_CLIENT.get().cloned()
}

/// Shared icon fetcher. None before initialization.
pub fn icon_fetcher() -> Option<Arc<IconFetcher>> {
    ICON_FETCHER.get().cloned()
}
