//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{GeminiAdapter, SqliteStore},
    config::Config,
    error::ApiError,
    web::{
        documents::{
            create_document_handler, delete_document_handler, generate_document_handler,
            get_document_handler, list_documents_handler,
        },
        export_route::export_document_handler,
        sections::{
            patch_section_handler, refine_section_handler, regenerate_section_handler,
            section_comment_handler, section_feedback_handler,
        },
        service::{debug_generate_handler, health_handler, root_handler},
        state::AppState,
    },
};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;
    let store = Arc::new(SqliteStore::new(pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    if config.gemini_api_key.is_none() {
        info!("GEMINI_API_KEY not set; every generation will use the local fallbacks.");
    }
    let generator = Arc::new(
        GeminiAdapter::new(
            config.gemini_endpoint.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
            config.gemini_auth_style,
            Duration::from_secs(config.gemini_timeout_secs),
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?,
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        generator,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .route(
            "/api/documents",
            get(list_documents_handler).post(create_document_handler),
        )
        .route("/api/document/{id}", get(get_document_handler))
        .route("/api/documents/{id}", delete(delete_document_handler))
        .route("/api/documents/{id}/generate", post(generate_document_handler))
        .route("/api/documents/{id}/export", get(export_document_handler))
        .route("/api/sections/{id}", patch(patch_section_handler))
        .route("/api/sections/{id}/refine", post(refine_section_handler))
        .route("/api/sections/{id}/regenerate", post(regenerate_section_handler))
        .route("/api/sections/{id}/feedback", post(section_feedback_handler))
        .route("/api/sections/{id}/comment", post(section_comment_handler))
        .route("/api/debug/generate", post(debug_generate_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
