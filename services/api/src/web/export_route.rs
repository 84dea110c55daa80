//! services/api/src/web/export_route.rs
//!
//! The export endpoint: projects a document's sections into the requested
//! file format and returns it as a download attachment.

use crate::export::{self, ExportError, ExportFormat};
use crate::web::port_error_response;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use docsmith_core::domain::Section;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ExportParams {
    format: Option<String>,
}

pub async fn export_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let format_name = params.format.unwrap_or_else(|| "docx".to_string());
    let format = ExportFormat::parse(&format_name).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("unknown format '{}'", format_name.to_lowercase()),
        )
    })?;

    let detail = app_state
        .store
        .document_detail(document_id)
        .await
        .map_err(port_error_response)?;

    let title = if detail.document.title.trim().is_empty() {
        format!("Document_{document_id}")
    } else {
        detail.document.title.clone()
    };
    let sections: Vec<Section> = detail.sections.into_iter().map(|s| s.section).collect();

    let bytes = export::render(format, &title, &sections).map_err(|err| match err {
        ExportError::Unavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        ExportError::Build(_, _) => {
            error!("export failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    })?;

    let filename = export::safe_filename(&title, format.extension());
    let headers = [
        (header::CONTENT_TYPE, format.mime().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes))
}
