//! services/api/src/web/service.rs
//!
//! Service-level handlers: the info root, the health probe, and the debug
//! generation endpoint (the one path where a remote failure surfaces to
//! the caller instead of falling back).

use crate::export::ExportFormat;
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub async fn root_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "message": "docsmith backend",
        "generation_available": app_state.config.gemini_api_key.is_some(),
        "docx_available": ExportFormat::Docx.available(),
        "pptx_available": ExportFormat::Pptx.available(),
        "pdf_available": ExportFormat::Pdf.available(),
    }))
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
pub struct DebugGeneratePayload {
    prompt: Option<String>,
}

pub async fn debug_generate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<DebugGeneratePayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let prompt = payload.prompt.unwrap_or_default().trim().to_string();
    if prompt.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "prompt required".to_string()));
    }

    match app_state.generator.generate(&prompt).await {
        Ok(text) => Ok(Json(json!({ "prompt": prompt, "text": text }))),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("generation failed: {err}"),
        )),
    }
}
