//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DocumentStore` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docsmith_core::domain::{
    Comment, Document, DocumentDetail, Refinement, Section, SectionDetail,
};
use docsmith_core::ports::{DocumentStore, PortError, PortResult};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new `SqliteStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    title: String,
    owner_email: String,
    created_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            title: self.title,
            owner_email: self.owner_email,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SectionRecord {
    id: Uuid,
    document_id: Uuid,
    position: i64,
    heading: String,
    text: String,
    last_feedback: Option<bool>,
}
impl SectionRecord {
    fn to_domain(self) -> Section {
        Section {
            id: self.id,
            document_id: self.document_id,
            position: self.position,
            heading: self.heading,
            text: self.text,
            last_feedback: self.last_feedback,
        }
    }
}

#[derive(FromRow)]
struct RefinementRecord {
    id: Uuid,
    section_id: Uuid,
    prompt: String,
    revised_text: String,
    created_at: DateTime<Utc>,
}
impl RefinementRecord {
    fn to_domain(self) -> Refinement {
        Refinement {
            id: self.id,
            section_id: self.section_id,
            prompt: self.prompt,
            revised_text: self.revised_text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CommentRecord {
    id: Uuid,
    section_id: Uuid,
    comment: String,
    created_at: DateTime<Utc>,
}
impl CommentRecord {
    fn to_domain(self) -> Comment {
        Comment {
            id: self.id,
            section_id: self.section_id,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn create_document(&self, title: &str, owner_email: &str) -> PortResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            title: title.to_string(),
            owner_email: owner_email.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO documents (id, title, owner_email, created_at) VALUES (?, ?, ?, ?)")
            .bind(document.id)
            .bind(&document.title)
            .bind(&document.owner_email)
            .bind(document.created_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(document)
    }

    async fn list_documents(&self, owner_email: &str) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT id, title, owner_email, created_at
            FROM documents
            WHERE owner_email = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, title, owner_email, created_at FROM documents WHERE id = ?",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))?;

        Ok(record.to_domain())
    }

    async fn document_detail(&self, document_id: Uuid) -> PortResult<DocumentDetail> {
        let document = self.get_document(document_id).await?;

        let sections = sqlx::query_as::<_, SectionRecord>(
            r#"
            SELECT id, document_id, position, heading, text, last_feedback
            FROM sections
            WHERE document_id = ?
            ORDER BY position, id
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut details = Vec::with_capacity(sections.len());
        for record in sections {
            let section = record.to_domain();
            let refinements = self.refinements_for_section(section.id).await?;
            let comments = sqlx::query_as::<_, CommentRecord>(
                r#"
                SELECT id, section_id, comment, created_at
                FROM comments
                WHERE section_id = ?
                ORDER BY created_at
                "#,
            )
            .bind(section.id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?
            .into_iter()
            .map(|r| r.to_domain())
            .collect();

            details.push(SectionDetail {
                section,
                refinements,
                comments,
            });
        }

        Ok(DocumentDetail {
            document,
            sections: details,
        })
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        // Existence check first so a bad id reads as not-found, not a no-op.
        self.get_document(document_id).await?;
        self.clear_sections(document_id).await?;
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn clear_sections(&self, document_id: Uuid) -> PortResult<()> {
        // Children first so no row ever references a deleted section.
        for table in ["refinements", "comments", "feedback"] {
            let sql = format!(
                "DELETE FROM {table} WHERE section_id IN (SELECT id FROM sections WHERE document_id = ?)"
            );
            sqlx::query(&sql)
                .bind(document_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        }
        sqlx::query("DELETE FROM sections WHERE document_id = ?")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_section(
        &self,
        document_id: Uuid,
        position: i64,
        heading: &str,
        text: &str,
    ) -> PortResult<Section> {
        let section = Section {
            id: Uuid::new_v4(),
            document_id,
            position,
            heading: heading.to_string(),
            text: text.to_string(),
            last_feedback: None,
        };
        sqlx::query(
            "INSERT INTO sections (id, document_id, position, heading, text) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(section.id)
        .bind(section.document_id)
        .bind(section.position)
        .bind(&section.heading)
        .bind(&section.text)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(section)
    }

    async fn get_section(&self, section_id: Uuid) -> PortResult<Section> {
        let record = sqlx::query_as::<_, SectionRecord>(
            "SELECT id, document_id, position, heading, text, last_feedback FROM sections WHERE id = ?",
        )
        .bind(section_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Section {} not found", section_id)))?;

        Ok(record.to_domain())
    }

    async fn update_section(
        &self,
        section_id: Uuid,
        heading: Option<&str>,
        text: Option<&str>,
    ) -> PortResult<Section> {
        let current = self.get_section(section_id).await?;
        let heading = heading.unwrap_or(&current.heading);
        let text = text.unwrap_or(&current.text);
        sqlx::query("UPDATE sections SET heading = ?, text = ? WHERE id = ?")
            .bind(heading)
            .bind(text)
            .bind(section_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        self.get_section(section_id).await
    }

    async fn set_section_text(&self, section_id: Uuid, text: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE sections SET text = ? WHERE id = ?")
            .bind(text)
            .bind(section_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Section {} not found", section_id)));
        }
        Ok(())
    }

    async fn insert_refinement(
        &self,
        section_id: Uuid,
        prompt: &str,
        revised_text: &str,
    ) -> PortResult<Refinement> {
        let refinement = Refinement {
            id: Uuid::new_v4(),
            section_id,
            prompt: prompt.to_string(),
            revised_text: revised_text.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO refinements (id, section_id, prompt, revised_text, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(refinement.id)
        .bind(refinement.section_id)
        .bind(&refinement.prompt)
        .bind(&refinement.revised_text)
        .bind(refinement.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(refinement)
    }

    async fn refinements_for_section(&self, section_id: Uuid) -> PortResult<Vec<Refinement>> {
        let records = sqlx::query_as::<_, RefinementRecord>(
            r#"
            SELECT id, section_id, prompt, revised_text, created_at
            FROM refinements
            WHERE section_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert_comment(&self, section_id: Uuid, comment: &str) -> PortResult<Comment> {
        // The section must exist; comments never dangle.
        self.get_section(section_id).await?;
        let comment = Comment {
            id: Uuid::new_v4(),
            section_id,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO comments (id, section_id, comment, created_at) VALUES (?, ?, ?, ?)")
            .bind(comment.id)
            .bind(comment.section_id)
            .bind(&comment.comment)
            .bind(comment.created_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(comment)
    }

    async fn record_feedback(&self, section_id: Uuid, liked: bool) -> PortResult<()> {
        self.get_section(section_id).await?;
        sqlx::query("INSERT INTO feedback (id, section_id, liked, created_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4())
            .bind(section_id)
            .bind(liked)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        sqlx::query("UPDATE sections SET last_feedback = ? WHERE id = ?")
            .bind(liked)
            .bind(section_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// An in-memory pool limited to one connection: every query must see
    /// the same database.
    async fn test_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteStore::new(pool);
        store.run_migrations().await.unwrap();
        store
    }

    #[tokio::test]
    async fn create_and_fetch_document() {
        let store = test_store().await;
        let doc = store.create_document("My Report", "a@example.com").await.unwrap();

        let fetched = store.get_document(doc.id).await.unwrap();
        assert_eq!(fetched.title, "My Report");
        assert_eq!(fetched.owner_email, "a@example.com");

        let listed = store.list_documents("a@example.com").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(store.list_documents("b@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let store = test_store().await;
        let err = store.get_document(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn sections_keep_position_order() {
        let store = test_store().await;
        let doc = store.create_document("Doc", "a@example.com").await.unwrap();
        // Insert out of order; the detail must come back sorted.
        store.insert_section(doc.id, 2, "Page 3", "c").await.unwrap();
        store.insert_section(doc.id, 0, "Page 1", "a").await.unwrap();
        store.insert_section(doc.id, 1, "Page 2", "b").await.unwrap();

        let detail = store.document_detail(doc.id).await.unwrap();
        let positions: Vec<i64> = detail.sections.iter().map(|s| s.section.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn clear_sections_purges_all_children() {
        let store = test_store().await;
        let doc = store.create_document("Doc", "a@example.com").await.unwrap();
        let section = store.insert_section(doc.id, 0, "Page 1", "text").await.unwrap();
        store.insert_refinement(section.id, "p", "t").await.unwrap();
        store.insert_comment(section.id, "nice").await.unwrap();
        store.record_feedback(section.id, true).await.unwrap();

        store.clear_sections(doc.id).await.unwrap();

        for table in ["sections", "refinements", "comments", "feedback"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&store.pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{table} should be empty");
        }
    }

    #[tokio::test]
    async fn delete_document_removes_everything() {
        let store = test_store().await;
        let doc = store.create_document("Doc", "a@example.com").await.unwrap();
        let section = store.insert_section(doc.id, 0, "Page 1", "text").await.unwrap();
        store.insert_refinement(section.id, "p", "t").await.unwrap();

        store.delete_document(doc.id).await.unwrap();

        assert!(matches!(store.get_document(doc.id).await, Err(PortError::NotFound(_))));
        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refinements WHERE section_id NOT IN (SELECT id FROM sections)",
        )
        .fetch_one(&store.pool)
        .await
        .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn feedback_caches_latest_value_on_section() {
        let store = test_store().await;
        let doc = store.create_document("Doc", "a@example.com").await.unwrap();
        let section = store.insert_section(doc.id, 0, "Page 1", "text").await.unwrap();
        assert_eq!(section.last_feedback, None);

        store.record_feedback(section.id, true).await.unwrap();
        store.record_feedback(section.id, false).await.unwrap();

        let fetched = store.get_section(section.id).await.unwrap();
        assert_eq!(fetched.last_feedback, Some(false));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[tokio::test]
    async fn update_section_edits_in_place() {
        let store = test_store().await;
        let doc = store.create_document("Doc", "a@example.com").await.unwrap();
        let section = store.insert_section(doc.id, 0, "Page 1", "old").await.unwrap();

        let updated = store
            .update_section(section.id, None, Some("new"))
            .await
            .unwrap();
        assert_eq!(updated.heading, "Page 1");
        assert_eq!(updated.text, "new");

        let err = store
            .update_section(Uuid::new_v4(), Some("x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
