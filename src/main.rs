mod app_state;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

use axum::{routing::get, routing::patch, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::delivery::LogDelivery;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing gig-dispatch server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("tasks_created_total", "Total tasks created and broadcast");
    metrics::describe_counter!(
        "task_responses_total",
        "Total worker accept/reject responses resolved"
    );
    metrics::describe_counter!(
        "otp_verifications_total",
        "Total successful service OTP verifications"
    );
    metrics::describe_counter!("tasks_completed_total", "Total tasks completed and settled");
    metrics::describe_histogram!(
        "settlement_amount",
        "Total earning settled per completed task"
    );

    // Initialize database connection pool
    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run database migrations
    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // OTP delivery channel (log-backed stand-in for an SMS gateway)
    let delivery = Arc::new(LogDelivery);

    // Create shared application state
    let state = AppState::new(db_pool, delivery, config.order_id_retries);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/v1/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks_for_worker),
        )
        .route("/api/v1/tasks/respond", patch(routes::tasks::respond))
        .route("/api/v1/tasks/request-otp", post(routes::tasks::request_otp))
        .route("/api/v1/tasks/verify-otp", post(routes::tasks::verify_otp))
        .route("/api/v1/tasks/complete", post(routes::tasks::complete))
        .route("/api/v1/workers", post(routes::workers::register))
        .route("/api/v1/workers/{worker_id}", get(routes::workers::profile))
        .route(
            "/api/v1/workers/{worker_id}/availability",
            patch(routes::workers::set_availability),
        )
        .route(
            "/api/v1/workers/{worker_id}/earnings",
            get(routes::workers::earnings),
        )
        .route("/api/v1/services", get(routes::catalog::lookup_service))
        .route(
            "/api/v1/proof/{order_id}",
            post(routes::proof::upload_proof).get(routes::proof::list_proofs),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting gig-dispatch on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
