use anyhow::Result;
use cxx_qt_lib::{QGuiApplication, QQmlApplicationEngine, QString, QUrl};

fn main() -> Result<()> {
    // Initialize logging
    stratus_core::init()?;

    // Settings live at a fixed path resolved once at startup.
    let settings_path = stratus_core::Settings::default_path();
    if !stratus_ui::bridge::initialize_services(settings_path.clone()) {
        anyhow::bail!("Failed to initialize weather services");
    }

    tracing::info!(
        "Stratus started (settings: {})",
        settings_path.display()
    );

    let mut app = QGuiApplication::new();
    let mut engine = QQmlApplicationEngine::new();

    if let Some(engine) = engine.as_mut() {
        engine.load(&QUrl::from_local_file(&QString::from("qml/main.qml")));
    }

    if let Some(app) = app.as_mut() {
        app.exec();
    }

    Ok(())
}
