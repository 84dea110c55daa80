//! services/api/src/web/documents.rs
//!
//! Axum handlers for the document-level endpoints: list, create, fetch,
//! delete, and whole-document generation.

use crate::web::generation;
use crate::web::port_error_response;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use docsmith_core::domain::{Document, DocumentDetail};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct OwnerParams {
    owner_email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateDocumentPayload {
    title: Option<String>,
    owner_email: Option<String>,
}

#[derive(Deserialize)]
pub struct GeneratePayload {
    prompt: Option<String>,
    theme: Option<String>,
    pages: Option<i64>,
}

/// Lists the owner's documents, newest first. Without an owner the list is
/// empty; one user never sees another's documents.
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<OwnerParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_email = params.owner_email.unwrap_or_default().trim().to_string();
    if owner_email.is_empty() {
        return Ok(Json(Vec::<Document>::new()));
    }

    let documents = app_state
        .store
        .list_documents(&owner_email)
        .await
        .map_err(port_error_response)?;
    Ok(Json(documents))
}

pub async fn create_document_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_email = payload.owner_email.unwrap_or_default().trim().to_string();
    if owner_email.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "owner_email is required".to_string()));
    }
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let document = app_state
        .store
        .create_document(&title, &owner_email)
        .await
        .map_err(port_error_response)?;

    let detail = DocumentDetail {
        document,
        sections: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Fetches the full document aggregate. When an owner is given, a mismatch
/// reads as not-found rather than forbidden.
pub async fn get_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
    Query(params): Query<OwnerParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let detail = app_state
        .store
        .document_detail(document_id)
        .await
        .map_err(port_error_response)?;

    let owner_email = params.owner_email.unwrap_or_default().trim().to_string();
    if !owner_email.is_empty() && detail.document.owner_email != owner_email {
        return Err((StatusCode::NOT_FOUND, "document not found".to_string()));
    }

    Ok(Json(detail))
}

pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .store
        .delete_document(document_id)
        .await
        .map_err(port_error_response)?;
    Ok(Json(json!({ "ok": true })))
}

/// Regenerates the whole document from a prompt: existing sections (and
/// their children) are erased, then every page is generated and persisted.
pub async fn generate_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<GeneratePayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let prompt = payload.prompt.unwrap_or_default().trim().to_string();
    if prompt.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "prompt is required".to_string()));
    }
    let theme = payload
        .theme
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let pages = payload.pages.unwrap_or(1);

    let detail = generation::generate_document(
        app_state.store.as_ref(),
        app_state.generator.as_ref(),
        document_id,
        &prompt,
        theme.as_deref(),
        pages,
    )
    .await
    .map_err(port_error_response)?;

    Ok(Json(detail))
}
