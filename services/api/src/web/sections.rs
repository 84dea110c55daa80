//! services/api/src/web/sections.rs
//!
//! Axum handlers for the section-level endpoints: manual edit, refine,
//! regenerate, feedback and comments.

use crate::web::generation;
use crate::web::port_error_response;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use docsmith_core::domain::{Comment, Refinement};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct PatchSectionPayload {
    heading: Option<String>,
    text: Option<String>,
}

#[derive(Deserialize)]
pub struct RefinePayload {
    prompt: Option<String>,
    current_text: Option<String>,
}

#[derive(Deserialize)]
pub struct FeedbackPayload {
    liked: Option<bool>,
}

#[derive(Deserialize)]
pub struct CommentPayload {
    comment: Option<String>,
}

#[derive(Serialize)]
pub struct RefineResponse {
    revised_text: String,
    refinements: Vec<Refinement>,
}

#[derive(Serialize)]
pub struct RegenerateResponse {
    id: Uuid,
    text: String,
    refinements: Vec<Refinement>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

/// Manual in-place edit of a section's heading and/or text.
pub async fn patch_section_handler(
    State(app_state): State<Arc<AppState>>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<PatchSectionPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let section = app_state
        .store
        .update_section(section_id, payload.heading.as_deref(), payload.text.as_deref())
        .await
        .map_err(port_error_response)?;
    Ok(Json(section))
}

pub async fn refine_section_handler(
    State(app_state): State<Arc<AppState>>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<RefinePayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let prompt = payload.prompt.unwrap_or_default().trim().to_string();
    if prompt.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "prompt required".to_string()));
    }

    let (revised_text, refinements) = generation::refine_section(
        app_state.store.as_ref(),
        app_state.generator.as_ref(),
        section_id,
        &prompt,
        payload.current_text.as_deref(),
    )
    .await
    .map_err(port_error_response)?;

    Ok(Json(RefineResponse {
        revised_text,
        refinements,
    }))
}

pub async fn regenerate_section_handler(
    State(app_state): State<Arc<AppState>>,
    Path(section_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (text, refinements) = generation::regenerate_section(
        app_state.store.as_ref(),
        app_state.generator.as_ref(),
        section_id,
    )
    .await
    .map_err(port_error_response)?;

    Ok(Json(RegenerateResponse {
        id: section_id,
        text,
        refinements,
    }))
}

pub async fn section_feedback_handler(
    State(app_state): State<Arc<AppState>>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<FeedbackPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let liked = payload
        .liked
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "liked must be provided".to_string()))?;

    app_state
        .store
        .record_feedback(section_id, liked)
        .await
        .map_err(port_error_response)?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn section_comment_handler(
    State(app_state): State<Arc<AppState>>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let comment = payload.comment.unwrap_or_default().trim().to_string();
    if comment.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "comment required".to_string()));
    }

    let comment = app_state
        .store
        .insert_comment(section_id, &comment)
        .await
        .map_err(port_error_response)?;
    Ok(Json(CommentResponse { comment }))
}
