//! Weather service for Stratus
//!
//! Fetches current conditions from an OpenWeatherMap-compatible endpoint
//! and downloads condition icons for display.

pub mod client;
pub mod icon;
pub mod types;

pub use client::WeatherClient;
pub use icon::IconFetcher;
pub use types::*;
