//! Controller-level tests for the fetch chain: one worker thread per
//! request, results marshaled over the channel, no partial success.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use stratus_ui::services::weather_service::{
    icon_data_url, request_fetch, FetchError, FetchRequest, WeatherServiceMessage,
};
use stratus_weather::{IconFetcher, UnitSystem, WeatherClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 200, 80, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn paris_body() -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "name": "Paris",
        "weather": [
            { "description": "clear sky", "icon": "01d" }
        ],
        "main": { "temp": 21.5, "humidity": 40 }
    })
}

fn recv_result(
    rx: &mpsc::Receiver<WeatherServiceMessage>,
) -> Result<(stratus_weather::WeatherReading, stratus_weather::WeatherIcon), FetchError> {
    let WeatherServiceMessage::FetchDone(result) =
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
    result
}

#[test]
fn fetch_chain_success_reports_reading_and_icon() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (weather_server, icon_server) = rt.block_on(async {
        let weather_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
            .mount(&weather_server)
            .await;

        let icon_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/wn/01d@2x.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(tiny_png(), "image/png"))
            .mount(&icon_server)
            .await;

        (weather_server, icon_server)
    });

    let client = Arc::new(WeatherClient::with_base_url(&weather_server.uri()).unwrap());
    let icons = Arc::new(IconFetcher::with_base_url(&icon_server.uri()));
    let (tx, rx) = mpsc::channel();

    request_fetch(
        &tx,
        client,
        icons,
        FetchRequest {
            api_key: "secret".to_string(),
            city: "Paris".to_string(),
            units: UnitSystem::Metric,
        },
    );

    let (reading, icon) = recv_result(&rx).unwrap();
    assert_eq!(
        reading.display_text(),
        "Paris: Clear Sky\nTemp: 21.5°\nHumidity: 40%"
    );
    assert_eq!(icon.width, 4);
    assert!(icon_data_url(&icon).starts_with("data:image/png;base64,"));
}

#[test]
fn fetch_chain_surfaces_service_message_and_skips_icon() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (weather_server, _icon_server, icons) = rt.block_on(async {
        let weather_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&weather_server)
            .await;

        // The icon endpoint must not be hit when the primary call fails.
        let icon_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&icon_server)
            .await;

        let icons = Arc::new(IconFetcher::with_base_url(&icon_server.uri()));
        (weather_server, icon_server, icons)
    });

    let client = Arc::new(WeatherClient::with_base_url(&weather_server.uri()).unwrap());
    let (tx, rx) = mpsc::channel();

    request_fetch(
        &tx,
        client,
        icons,
        FetchRequest {
            api_key: "secret".to_string(),
            city: "Nowhereville".to_string(),
            units: UnitSystem::Metric,
        },
    );

    let err = recv_result(&rx).unwrap_err();
    assert!(matches!(&err, FetchError::Api(m) if m == "city not found"));
    assert_eq!(err.to_string(), "city not found");
}

#[test]
fn fetch_chain_fails_whole_cycle_when_icon_fails() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (weather_server, icon_server) = rt.block_on(async {
        let weather_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
            .mount(&weather_server)
            .await;

        let icon_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/wn/01d@2x.png"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&icon_server)
            .await;

        (weather_server, icon_server)
    });

    let client = Arc::new(WeatherClient::with_base_url(&weather_server.uri()).unwrap());
    let icons = Arc::new(IconFetcher::with_base_url(&icon_server.uri()));
    let (tx, rx) = mpsc::channel();

    request_fetch(
        &tx,
        client,
        icons,
        FetchRequest {
            api_key: "secret".to_string(),
            city: "Paris".to_string(),
            units: UnitSystem::Metric,
        },
    );

    // A failed icon fetch fails the whole cycle: no reading is delivered.
    let err = recv_result(&rx).unwrap_err();
    assert!(matches!(err, FetchError::Api(_)), "got {:?}", err);
}

#[test]
fn fetch_result_is_dropped_when_receiver_is_gone() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let weather_server = rt.block_on(async {
        let weather_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&weather_server)
            .await;
        weather_server
    });

    let client = Arc::new(WeatherClient::with_base_url(&weather_server.uri()).unwrap());
    let icons = Arc::new(IconFetcher::new());
    let (tx, rx) = mpsc::channel();

    // Window teardown mid-fetch: the receiving side disappears before the
    // worker completes. The send must fail silently, not panic.
    drop(rx);
    request_fetch(
        &tx,
        client,
        icons,
        FetchRequest {
            api_key: "secret".to_string(),
            city: "Paris".to_string(),
            units: UnitSystem::Metric,
        },
    );

    // Give the worker time to finish; nothing to assert beyond no panic.
    std::thread::sleep(Duration::from_millis(500));
}
