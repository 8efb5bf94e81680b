//! Comment repository implementation

use chrono::NaiveDateTime;
use sqlx::PgPool;
use crate::models::comment::{Comment, CommentStatus};
use crate::utils::errors::EventHubError;
use crate::utils::helpers::{Page, PageRequest};

/// Projection over the comments row aliased as `cm`
const COMMENT_PROJECTION: &str =
    "cm.id, cm.text, cm.event_id, cm.author_id, u.name AS author_name, cm.status, cm.created, cm.updated";

fn select_comments() -> String {
    format!(
        "SELECT {} FROM comments cm JOIN users u ON u.id = cm.author_id",
        COMMENT_PROJECTION
    )
}

#[derive(Clone, Debug)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a PENDING comment
    pub async fn create(&self, event_id: i64, author_id: i64, text: &str, created: NaiveDateTime) -> Result<Comment, EventHubError> {
        let sql = format!(
            r#"
            WITH cm AS (
                INSERT INTO comments (text, event_id, author_id, status, created)
                VALUES ($1, $2, $3, 'PENDING', $4)
                RETURNING *
            )
            SELECT {} FROM cm JOIN users u ON u.id = cm.author_id
            "#,
            COMMENT_PROJECTION
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(text)
            .bind(event_id)
            .bind(author_id)
            .bind(created)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EventHubError::from_write(e, "Comment references a missing event or user"))?;

        Ok(comment)
    }

    /// Find comment by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, EventHubError> {
        let sql = format!("{} WHERE cm.id = $1", select_comments());
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    /// Find comment by ID if `author_id` wrote it
    pub async fn find_by_id_and_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>, EventHubError> {
        let sql = format!("{} WHERE cm.id = $1 AND cm.author_id = $2", select_comments());
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    /// Move a comment from `from` to `to`, optionally replacing the text
    ///
    /// Conflict when the stored status is no longer `from`.
    pub async fn update(
        &self,
        id: i64,
        text: Option<&str>,
        from: CommentStatus,
        to: CommentStatus,
        updated: NaiveDateTime,
    ) -> Result<Comment, EventHubError> {
        let sql = format!(
            r#"
            WITH cm AS (
                UPDATE comments
                SET text = COALESCE($2, text), status = $3, updated = $4
                WHERE id = $1 AND status = $5
                RETURNING *
            )
            SELECT {} FROM cm JOIN users u ON u.id = cm.author_id
            "#,
            COMMENT_PROJECTION
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(text)
            .bind(to)
            .bind(updated)
            .bind(from)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                EventHubError::conflict(format!("Comment with id={} is no longer {}", id, from.as_str()))
            })?;

        Ok(comment)
    }

    /// Comments of an event in one status
    pub async fn list_by_event(&self, event_id: i64, status: CommentStatus, page: PageRequest) -> Result<Page<Comment>, EventHubError> {
        let sql = format!(
            "{} WHERE cm.event_id = $1 AND cm.status = $2 ORDER BY cm.created ASC, cm.id ASC LIMIT $3 OFFSET $4",
            select_comments()
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(event_id)
            .bind(status)
            .bind(page.size)
            .bind(page.from)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(comments))
    }

    /// All comments written by a user
    pub async fn list_by_author(&self, author_id: i64, page: PageRequest) -> Result<Page<Comment>, EventHubError> {
        let sql = format!(
            "{} WHERE cm.author_id = $1 ORDER BY cm.id ASC LIMIT $2 OFFSET $3",
            select_comments()
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(author_id)
            .bind(page.size)
            .bind(page.from)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(comments))
    }

    /// Comments waiting for moderation, oldest first
    pub async fn list_moderation_queue(&self, page: PageRequest) -> Result<Page<Comment>, EventHubError> {
        let sql = format!(
            "{} WHERE cm.status IN ($1, $2) ORDER BY cm.id ASC LIMIT $3 OFFSET $4",
            select_comments()
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(CommentStatus::Pending)
            .bind(CommentStatus::Edited)
            .bind(page.size)
            .bind(page.from)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(comments))
    }
}
