//! crates/docsmith_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Document, DocumentDetail, Refinement, Section};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence boundary for documents, sections and their child records.
///
/// Ordering contract: sections by `position, id`; refinements by
/// `created_at` descending; comments by `created_at` ascending; document
/// lists newest-first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // --- Documents ---
    async fn create_document(&self, title: &str, owner_email: &str) -> PortResult<Document>;

    async fn list_documents(&self, owner_email: &str) -> PortResult<Vec<Document>>;

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document>;

    /// The full aggregate: document, sections in order, children in order.
    async fn document_detail(&self, document_id: Uuid) -> PortResult<DocumentDetail>;

    /// Deletes the document, its sections and every child row.
    async fn delete_document(&self, document_id: Uuid) -> PortResult<()>;

    // --- Sections ---
    /// Deletes all sections of a document, purging refinements, comments
    /// and feedback first so no child row outlives its section.
    async fn clear_sections(&self, document_id: Uuid) -> PortResult<()>;

    async fn insert_section(
        &self,
        document_id: Uuid,
        position: i64,
        heading: &str,
        text: &str,
    ) -> PortResult<Section>;

    async fn get_section(&self, section_id: Uuid) -> PortResult<Section>;

    /// In-place edit of heading and/or text. `None` leaves a field untouched.
    async fn update_section(
        &self,
        section_id: Uuid,
        heading: Option<&str>,
        text: Option<&str>,
    ) -> PortResult<Section>;

    async fn set_section_text(&self, section_id: Uuid, text: &str) -> PortResult<()>;

    // --- Children ---
    async fn insert_refinement(
        &self,
        section_id: Uuid,
        prompt: &str,
        revised_text: &str,
    ) -> PortResult<Refinement>;

    async fn refinements_for_section(&self, section_id: Uuid) -> PortResult<Vec<Refinement>>;

    async fn insert_comment(&self, section_id: Uuid, comment: &str) -> PortResult<Comment>;

    /// Records an immutable feedback row and caches the value on the section.
    async fn record_feedback(&self, section_id: Uuid, liked: bool) -> PortResult<()>;
}

/// Remote text generation boundary: one natural-language prompt in, one
/// usable text out. Transport retries and response normalization live
/// behind this trait; callers treat any error as "use the local fallback".
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}
