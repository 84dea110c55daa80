//! crates/docsmith_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database, but carry serde derives
//! because the HTTP layer serializes them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A top-level, user-owned container of ordered pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
}

/// One page of document content. Mutated in place by refine/regenerate;
/// its history lives in [`Refinement`] records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub document_id: Uuid,
    /// Defines render order. Not required to be contiguous.
    pub position: i64,
    pub heading: String,
    pub text: String,
    /// Cache of the most recent feedback value, if any.
    pub last_feedback: Option<bool>,
}

/// Immutable snapshot of one generate/refine/regenerate event on a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refinement {
    pub id: Uuid,
    pub section_id: Uuid,
    pub prompt: String,
    pub revised_text: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable comment attached to a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub section_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable liked/disliked record attached to a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub section_id: Uuid,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

/// A section together with its children, in their contract order:
/// refinements newest-first, comments oldest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDetail {
    #[serde(flatten)]
    pub section: Section,
    pub refinements: Vec<Refinement>,
    pub comments: Vec<Comment>,
}

/// A document together with all of its sections, ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub sections: Vec<SectionDetail>,
}
