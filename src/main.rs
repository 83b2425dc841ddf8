use axum::{
    routing::{get, post},
    Router,
};
use fiscal_analytics_rust::{api, create_pool, AnalyticsService, AppConfig};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // Fail fast on incomplete DB_* configuration
    let config = AppConfig::from_env()?;
    info!("Starting dashboard backend with config: {:?}", config);

    let pool = create_pool(&config.database.url()).await?;
    info!("Database pool created");

    let service = Arc::new(AnalyticsService::new(pool));

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/filters", get(api::filter_options))
        .route("/api/dashboard", post(api::dashboard))
        .route("/api/refresh", post(api::refresh))
        .route("/api/export/xlsx", post(api::export_xlsx))
        .route("/api/export/csv", post(api::export_csv))
        .with_state(service)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/filters      - sidebar filter values");
    info!("  POST /api/dashboard    - KPIs and aggregations for a filter");
    info!("  POST /api/export/xlsx  - download filtered records (Excel)");
    info!("  POST /api/export/csv   - download filtered records (CSV)");
    info!("  POST /api/refresh      - reload the extraction snapshot");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
