//! Weather window model for QML.
//!
//! Owns the input fields, guards and dispatches fetch cycles, and applies
//! results marshaled back from the worker thread.

use core::pin::Pin;
use std::sync::mpsc;

use cxx_qt::CxxQtType;
use cxx_qt_lib::QString;
use stratus_core::Settings;
use stratus_weather::UnitSystem;

use crate::bridge;
use crate::services::weather_service::{
    self, FetchRequest, WeatherServiceMessage,
};

#[cxx_qt::bridge]
pub mod qobject {
    unsafe extern "C++" {
        include!("cxx-qt-lib/qstring.h");
        type QString = cxx_qt_lib::QString;
    }

    extern "RustQt" {
        #[qobject]
        #[qml_element]
        #[qproperty(bool, loading)]
        #[qproperty(QString, api_key)]
        #[qproperty(QString, city)]
        #[qproperty(QString, units)]
        #[qproperty(QString, result_text)]
        #[qproperty(QString, icon_source)]
        #[qproperty(QString, updated_at)]
        #[qproperty(QString, warning_message)]
        type WeatherModel = super::WeatherModelRust;

        /// Seed the field properties from the persisted settings.
        #[qinvokable]
        fn load_settings(self: Pin<&mut WeatherModel>);

        /// Start one fetch cycle from the current field values.
        #[qinvokable]
        fn fetch_weather(self: Pin<&mut WeatherModel>);

        /// Poll for async operation results. Call this from a QML Timer.
        #[qinvokable]
        fn poll_channel(self: Pin<&mut WeatherModel>);

        #[qsignal]
        fn weather_changed(self: Pin<&mut WeatherModel>);

        #[qsignal]
        fn fetch_failed(self: Pin<&mut WeatherModel>, message: QString);
    }
}

pub struct WeatherModelRust {
    loading: bool,
    api_key: QString,
    city: QString,
    units: QString,
    result_text: QString,
    icon_source: QString,
    updated_at: QString,
    warning_message: QString,
    rx: Option<mpsc::Receiver<WeatherServiceMessage>>,
    /// Field values of the in-flight cycle; persisted on success.
    pending: Option<FetchRequest>,
}

impl Default for WeatherModelRust {
    fn default() -> Self {
        Self {
            loading: false,
            api_key: QString::default(),
            city: QString::default(),
            units: QString::from("metric"),
            result_text: QString::from("Weather info will appear here"),
            icon_source: QString::default(),
            updated_at: QString::default(),
            warning_message: QString::default(),
            rx: None,
            pending: None,
        }
    }
}

impl qobject::WeatherModel {
    pub fn load_settings(mut self: Pin<&mut Self>) {
        let Some(path) = bridge::settings_path() else {
            tracing::warn!("Settings path not initialized; fields stay at defaults");
            return;
        };

        let settings = Settings::load(path);
        self.as_mut().set_api_key(QString::from(&settings.api));
        self.as_mut().set_city(QString::from(&settings.city));
        self.as_mut()
            .set_units(QString::from(settings.units.as_str()));
    }

    pub fn fetch_weather(mut self: Pin<&mut Self>) {
        // Overlapping cycles are suppressed; the QML trigger is disabled
        // while loading as well.
        if self.as_ref().rust().loading {
            tracing::debug!("Fetch already in progress; ignoring trigger");
            return;
        }

        let api_key = self.as_ref().rust().api_key.to_string().trim().to_string();
        let city = self.as_ref().rust().city.to_string().trim().to_string();
        let units = match self.as_ref().rust().units.to_string().as_str() {
            "imperial" => UnitSystem::Imperial,
            _ => UnitSystem::Metric,
        };

        if let Err(e) = weather_service::validate_request(&api_key, &city) {
            // Validation failure is synchronous: inline warning, no worker.
            self.as_mut().set_warning_message(QString::from(&e.to_string()));
            return;
        }

        let (client, icons) = match (bridge::weather_client(), bridge::icon_fetcher()) {
            (Some(c), Some(i)) => (c, i),
            _ => {
                self.as_mut()
                    .fetch_failed(QString::from("Weather service not initialized"));
                return;
            }
        };

        self.as_mut().set_warning_message(QString::default());
        self.as_mut().set_loading(true);

        let request = FetchRequest {
            api_key,
            city,
            units,
        };

        let (tx, rx) = mpsc::channel();
        self.as_mut().rust_mut().rx = Some(rx);
        self.as_mut().rust_mut().pending = Some(request.clone());

        weather_service::request_fetch(&tx, client, icons, request);
    }

    /// Drain the service channel on the UI thread and apply the result.
    pub fn poll_channel(mut self: Pin<&mut Self>) {
        let msg = match self
            .as_ref()
            .rust()
            .rx
            .as_ref()
            .and_then(|rx| rx.try_recv().ok())
        {
            Some(m) => m,
            None => return,
        };

        match msg {
            WeatherServiceMessage::FetchDone(result) => {
                self.as_mut().set_loading(false);
                let pending = self.as_mut().rust_mut().pending.take();
                self.as_mut().rust_mut().rx = None;

                match result {
                    Ok((reading, icon)) => {
                        self.as_mut()
                            .set_result_text(QString::from(&reading.display_text()));
                        self.as_mut()
                            .set_icon_source(QString::from(&weather_service::icon_data_url(&icon)));
                        self.as_mut().set_updated_at(QString::from(
                            &reading.fetched_at.format("%H:%M").to_string(),
                        ));
                        self.as_mut().weather_changed();

                        if let Some(request) = pending {
                            save_settings(&request);
                        }
                    }
                    Err(e) => {
                        // Previous text and icon stay; nothing is persisted.
                        self.as_mut().fetch_failed(QString::from(&e.to_string()));
                    }
                }
            }
        }
    }
}

/// Persist the submitted field values. Only ever called on the UI thread,
/// after a fully successful fetch.
fn save_settings(request: &FetchRequest) {
    let Some(path) = bridge::settings_path() else {
        tracing::warn!("Settings path not initialized; skipping save");
        return;
    };

    let units = match request.units {
        UnitSystem::Metric => stratus_core::UnitSystem::Metric,
        UnitSystem::Imperial => stratus_core::UnitSystem::Imperial,
    };

    let settings = Settings {
        api: request.api_key.clone(),
        city: request.city.clone(),
        units,
    };

    if let Err(e) = settings.save(path) {
        tracing::warn!("Failed to save settings: {}", e);
    }
}
