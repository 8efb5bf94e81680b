//! Comment service implementation
//!
//! Authors post and edit comments on published events; admins work through
//! the moderation queue. Deletion only moves a comment to DELETED.

use tracing::info;
use crate::database::DatabaseService;
use crate::models::comment::{Comment, CommentDto, CommentStatus, ModerationDecision, NewCommentRequest, UpdateCommentRequest};
use crate::models::event::EventState;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{now, PageRequest};
use crate::utils::logging::log_admin_action;

#[derive(Clone, Debug)]
pub struct CommentService {
    db: DatabaseService,
}

impl CommentService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i64, event_id: i64, request: NewCommentRequest) -> Result<CommentDto> {
        self.db.ensure_user(user_id).await?;

        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;
        if event.state != EventState::Published {
            return Err(EventHubError::conflict("Only published events can be commented"));
        }

        let comment = self.db.comments.create(event_id, user_id, request.text.trim(), now()).await?;
        info!(comment_id = comment.id, event_id = event_id, user_id = user_id, "Comment created");
        Ok(comment.into())
    }

    /// Author edit, the comment goes back into moderation
    pub async fn update_own(&self, user_id: i64, comment_id: i64, request: UpdateCommentRequest) -> Result<CommentDto> {
        let comment = self.find_own(user_id, comment_id).await?;
        let status = comment.status.on_edit()?;

        let updated = self
            .db
            .comments
            .update(comment_id, Some(request.text.trim()), comment.status, status, now())
            .await?;
        Ok(updated.into())
    }

    pub async fn delete_own(&self, user_id: i64, comment_id: i64) -> Result<()> {
        let comment = self.find_own(user_id, comment_id).await?;
        let status = comment.status.on_delete()?;

        self.db.comments.update(comment_id, None, comment.status, status, now()).await?;
        info!(comment_id = comment_id, user_id = user_id, "Comment deleted by author");
        Ok(())
    }

    pub async fn list_own(&self, user_id: i64, page: PageRequest) -> Result<Vec<CommentDto>> {
        self.db.ensure_user(user_id).await?;

        let comments = self.db.comments.list_by_author(user_id, page).await?;
        Ok(comments.map(CommentDto::from).into_items())
    }

    /// Approved comments of a published event
    pub async fn list_public(&self, event_id: i64, page: PageRequest) -> Result<Vec<CommentDto>> {
        if self.db.events.find_published(event_id).await?.is_none() {
            return Err(EventHubError::not_found("Event", event_id));
        }

        let comments = self
            .db
            .comments
            .list_by_event(event_id, CommentStatus::Approved, page)
            .await?;
        Ok(comments.map(CommentDto::from).into_items())
    }

    /// Comments waiting for a moderation decision
    pub async fn moderation_queue(&self, page: PageRequest) -> Result<Vec<CommentDto>> {
        let comments = self.db.comments.list_moderation_queue(page).await?;
        Ok(comments.map(CommentDto::from).into_items())
    }

    pub async fn moderate(&self, comment_id: i64, decision: ModerationDecision) -> Result<CommentDto> {
        let comment = self.find(comment_id).await?;
        let status = comment.status.on_moderation(decision)?;

        let updated = self.db.comments.update(comment_id, None, comment.status, status, now()).await?;
        log_admin_action("moderate_comment", Some(&comment_id.to_string()), Some(status.as_str()));
        Ok(updated.into())
    }

    pub async fn delete_admin(&self, comment_id: i64) -> Result<()> {
        let comment = self.find(comment_id).await?;
        let status = comment.status.on_delete()?;

        self.db.comments.update(comment_id, None, comment.status, status, now()).await?;
        log_admin_action("delete_comment", Some(&comment_id.to_string()), None);
        Ok(())
    }

    async fn find(&self, comment_id: i64) -> Result<Comment> {
        self.db
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Comment", comment_id))
    }

    async fn find_own(&self, user_id: i64, comment_id: i64) -> Result<Comment> {
        self.db.ensure_user(user_id).await?;
        self.db
            .comments
            .find_by_id_and_author(comment_id, user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Comment", comment_id))
    }
}
