//! services/api/src/web/generation.rs
//!
//! Orchestration of the document-level generate operation and the
//! section-level refine/regenerate operations over the two core ports.
//!
//! Every remote failure is caught per call and replaced with the local
//! fallback, so these operations complete for the caller even while the
//! generation service is down. Partial success is the expected steady
//! state under intermittent remote failures.

use docsmith_core::domain::{DocumentDetail, Refinement};
use docsmith_core::fallback::{fallback_page, fallback_refine};
use docsmith_core::ports::{DocumentStore, PortResult, TextGenerationService};
use tracing::warn;
use uuid::Uuid;

use crate::web::prompts;

/// Page counts are clamped to this inclusive range.
pub const MIN_PAGES: i64 = 1;
pub const MAX_PAGES: i64 = 30;

/// Erases all existing sections of the document (children purged first)
/// and regenerates each page independently and sequentially. Each page is
/// persisted together with an initial refinement record equal to its
/// generated text. A failed remote call for one page never aborts the
/// remaining pages.
pub async fn generate_document(
    store: &dyn DocumentStore,
    generator: &dyn TextGenerationService,
    document_id: Uuid,
    user_prompt: &str,
    theme: Option<&str>,
    pages: i64,
) -> PortResult<DocumentDetail> {
    let pages = pages.clamp(MIN_PAGES, MAX_PAGES) as usize;

    // Not-found surfaces before any mutation.
    store.get_document(document_id).await?;
    store.clear_sections(document_id).await?;

    for index in 0..pages {
        let heading = format!("Page {}", index + 1);
        let page_prompt = prompts::page_prompt(index, pages, user_prompt, theme);

        let page_text = match generator.generate(&page_prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!(page = index + 1, error = %err, "generation failed, using local fallback");
                fallback_page(index, pages, user_prompt)
            }
        };

        let section = store
            .insert_section(document_id, index as i64, &heading, &page_text)
            .await?;
        store
            .insert_refinement(section.id, &page_prompt, &page_text)
            .await?;
    }

    store.document_detail(document_id).await
}

/// Applies a refinement instruction to one section: the remote call on
/// success, the deterministic local transform on any failure. Persists an
/// immutable refinement record (prompt = the raw user instruction) and
/// updates the section text in place.
pub async fn refine_section(
    store: &dyn DocumentStore,
    generator: &dyn TextGenerationService,
    section_id: Uuid,
    instruction: &str,
    current_text: Option<&str>,
) -> PortResult<(String, Vec<Refinement>)> {
    let section = store.get_section(section_id).await?;
    let base_text = current_text.unwrap_or(&section.text);
    let full_prompt = prompts::refine_prompt(base_text, instruction);

    let revised_text = match generator.generate(&full_prompt).await {
        Ok(text) => text,
        Err(err) => {
            warn!(section = %section_id, error = %err, "refine failed, using local fallback");
            fallback_refine(base_text, instruction)
        }
    };

    store
        .insert_refinement(section_id, instruction, &revised_text)
        .await?;
    store.set_section_text(section_id, &revised_text).await?;

    let refinements = store.refinements_for_section(section_id).await?;
    Ok((revised_text, refinements))
}

/// Regenerates one section as a fresh page with similar topic and intent.
/// The recorded refinement carries the fixed regenerate marker prompt.
pub async fn regenerate_section(
    store: &dyn DocumentStore,
    generator: &dyn TextGenerationService,
    section_id: Uuid,
) -> PortResult<(String, Vec<Refinement>)> {
    let section = store.get_section(section_id).await?;
    let document_title = match store.get_document(section.document_id).await {
        Ok(document) => document.title,
        Err(_) => "this document".to_string(),
    };

    let regen_prompt =
        prompts::regenerate_prompt(&document_title, &section.heading, &section.text);

    let new_text = match generator.generate(&regen_prompt).await {
        Ok(text) => text,
        Err(err) => {
            warn!(section = %section_id, error = %err, "regenerate failed, using local fallback");
            fallback_refine(&section.text, "regenerate")
        }
    };

    store
        .insert_refinement(section_id, prompts::REGENERATE_MARKER, &new_text)
        .await?;
    store.set_section_text(section_id, &new_text).await?;

    let refinements = store.refinements_for_section(section_id).await?;
    Ok((new_text, refinements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SqliteStore;
    use async_trait::async_trait;
    use docsmith_core::ports::PortError;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A scripted generator: fails every call whose (zero-based) sequence
    /// number is in `fail_calls`, otherwise echoes a numbered answer.
    struct ScriptedGenerator {
        calls: AtomicUsize,
        fail_calls: Vec<usize>,
    }

    impl ScriptedGenerator {
        fn new(fail_calls: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_calls,
            }
        }
    }

    #[async_trait]
    impl TextGenerationService for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> PortResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_calls.contains(&call) {
                Err(PortError::Unexpected("remote unavailable".to_string()))
            } else {
                Ok(format!("generated text {call}"))
            }
        }
    }

    async fn test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn seeded_store(pool: &SqlitePool) -> (SqliteStore, Uuid) {
        let store = SqliteStore::new(pool.clone());
        store.run_migrations().await.unwrap();
        let doc = store.create_document("Doc", "a@example.com").await.unwrap();
        (store, doc.id)
    }

    #[tokio::test]
    async fn generates_n_sections_with_initial_refinements() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let generator = ScriptedGenerator::new(vec![]);

        let detail = generate_document(&store, &generator, doc_id, "topic", None, 4)
            .await
            .unwrap();

        assert_eq!(detail.sections.len(), 4);
        for (i, section) in detail.sections.iter().enumerate() {
            assert_eq!(section.section.position, i as i64);
            assert_eq!(section.section.heading, format!("Page {}", i + 1));
            assert_eq!(section.refinements.len(), 1);
            assert_eq!(section.refinements[0].revised_text, section.section.text);
        }
    }

    #[tokio::test]
    async fn page_count_is_clamped() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let generator = ScriptedGenerator::new(vec![]);

        let detail = generate_document(&store, &generator, doc_id, "topic", None, 99)
            .await
            .unwrap();
        assert_eq!(detail.sections.len(), MAX_PAGES as usize);

        let detail = generate_document(&store, &generator, doc_id, "topic", None, 0)
            .await
            .unwrap();
        assert_eq!(detail.sections.len(), 1);
    }

    #[tokio::test]
    async fn failed_pages_fall_back_without_aborting_the_rest() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let generator = ScriptedGenerator::new(vec![1]);

        let detail = generate_document(&store, &generator, doc_id, "topic", None, 3)
            .await
            .unwrap();

        assert_eq!(detail.sections.len(), 3);
        assert!(detail.sections[0].section.text.starts_with("generated text"));
        assert!(detail.sections[1]
            .section
            .text
            .contains("placeholder content for page 2 of 3"));
        assert!(detail.sections[2].section.text.starts_with("generated text"));
        // The fallback page still gets its initial refinement record.
        assert_eq!(detail.sections[1].refinements.len(), 1);
    }

    #[tokio::test]
    async fn regenerating_a_document_leaves_no_orphans() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let generator = ScriptedGenerator::new(vec![]);

        let detail = generate_document(&store, &generator, doc_id, "topic", None, 3)
            .await
            .unwrap();
        // Attach extra children so the purge has something to do.
        let first = detail.sections[0].section.id;
        store.insert_comment(first, "keep this?").await.unwrap();
        store.record_feedback(first, true).await.unwrap();

        let detail = generate_document(&store, &generator, doc_id, "topic", None, 2)
            .await
            .unwrap();
        assert_eq!(detail.sections.len(), 2);

        for table in ["refinements", "comments", "feedback"] {
            let orphans: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(*) FROM {table} WHERE section_id NOT IN (SELECT id FROM sections)"
            ))
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(orphans, 0, "{table} has orphaned rows");
        }
    }

    #[tokio::test]
    async fn refine_uses_fallback_and_records_history() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let always_fail = ScriptedGenerator::new((0..10).collect());

        let section = store
            .insert_section(doc_id, 0, "Page 1", "one two three four")
            .await
            .unwrap();

        let (revised, refinements) = refine_section(
            &store,
            &always_fail,
            section.id,
            "shorten to 2 words",
            None,
        )
        .await
        .unwrap();

        assert_eq!(revised, "one two…");
        assert_eq!(refinements.len(), 1);
        assert_eq!(refinements[0].prompt, "shorten to 2 words");
        assert_eq!(store.get_section(section.id).await.unwrap().text, "one two…");
    }

    #[tokio::test]
    async fn refine_prefers_caller_supplied_text() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let always_fail = ScriptedGenerator::new((0..10).collect());

        let section = store
            .insert_section(doc_id, 0, "Page 1", "stored text")
            .await
            .unwrap();

        let (revised, _) = refine_section(
            &store,
            &always_fail,
            section.id,
            "make it formal",
            Some("caller text"),
        )
        .await
        .unwrap();

        assert_eq!(revised, "In a more formal tone: caller text");
    }

    #[tokio::test]
    async fn regenerate_records_marker_prompt() {
        let pool = test_pool().await;
        let (store, doc_id) = seeded_store(&pool).await;
        let generator = ScriptedGenerator::new(vec![]);

        let section = store
            .insert_section(doc_id, 0, "Page 1", "old text")
            .await
            .unwrap();

        let (new_text, refinements) = regenerate_section(&store, &generator, section.id)
            .await
            .unwrap();

        assert!(new_text.starts_with("generated text"));
        assert_eq!(refinements[0].prompt, prompts::REGENERATE_MARKER);
        assert_eq!(store.get_section(section.id).await.unwrap().text, new_text);
    }

    #[tokio::test]
    async fn operations_on_missing_entities_are_not_found() {
        let pool = test_pool().await;
        let (store, _) = seeded_store(&pool).await;
        let generator = ScriptedGenerator::new(vec![]);

        let err = generate_document(&store, &generator, Uuid::new_v4(), "topic", None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));

        let err = refine_section(&store, &generator, Uuid::new_v4(), "shorten", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
