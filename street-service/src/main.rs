use service_core::observability::init_tracing;
use street_service::config::StreetConfig;
use street_service::services::init_metrics;
use street_service::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Must run before any metric is recorded
    init_metrics();

    let config = StreetConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "street-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start street-service: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    application.run_until_stopped().await
}
