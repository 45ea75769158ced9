pub mod bridge;
pub mod models;
pub mod services;

// Re-export cxx-qt generated types
pub use models::weather_model::qobject::WeatherModel;
