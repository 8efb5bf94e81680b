//! Comment model

use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;
use sqlx::FromRow;
use validator::Validate;

use crate::models::user::UserShortDto;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{date_format, validate_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Deleted,
    Edited,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "PENDING",
            CommentStatus::Approved => "APPROVED",
            CommentStatus::Rejected => "REJECTED",
            CommentStatus::Deleted => "DELETED",
            CommentStatus::Edited => "EDITED",
        }
    }

    /// Statuses waiting in the admin moderation queue
    pub fn awaits_moderation(&self) -> bool {
        matches!(self, CommentStatus::Pending | CommentStatus::Edited)
    }

    /// Author changed the text
    pub fn on_edit(self) -> Result<CommentStatus> {
        match self {
            CommentStatus::Deleted => Err(EventHubError::conflict("A deleted comment cannot be edited")),
            _ => Ok(CommentStatus::Edited),
        }
    }

    /// Author or admin removed the comment
    pub fn on_delete(self) -> Result<CommentStatus> {
        match self {
            CommentStatus::Deleted => Err(EventHubError::conflict("The comment has already been deleted")),
            _ => Ok(CommentStatus::Deleted),
        }
    }

    /// Admin moderation decision
    pub fn on_moderation(self, decision: ModerationDecision) -> Result<CommentStatus> {
        if !self.awaits_moderation() {
            return Err(EventHubError::conflict(format!(
                "Only pending or edited comments can be moderated, current status: {}",
                self.as_str()
            )));
        }
        Ok(match decision {
            ModerationDecision::Approved => CommentStatus::Approved,
            ModerationDecision::Rejected => CommentStatus::Rejected,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationDecision {
    Approved,
    Rejected,
}

/// Comment row joined with its author name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub event_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub status: CommentStatus,
    pub created: NaiveDateTime,
    pub updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCommentRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 1, max = 255))]
    pub text: String,
}

pub type UpdateCommentRequest = NewCommentRequest;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModerateCommentRequest {
    pub status: ModerationDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub event_id: i64,
    pub author: UserShortDto,
    pub status: CommentStatus,
    #[serde(with = "date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "date_format::option")]
    pub updated: Option<NaiveDateTime>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            event_id: comment.event_id,
            author: UserShortDto {
                id: comment.author_id,
                name: comment.author_name,
            },
            status: comment.status,
            created: comment.created,
            updated: comment.updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_edit_reenters_moderation() {
        let edited = CommentStatus::Approved.on_edit().unwrap();
        assert_eq!(edited, CommentStatus::Edited);
        assert!(edited.awaits_moderation());
        assert_eq!(
            edited.on_moderation(ModerationDecision::Approved).unwrap(),
            CommentStatus::Approved
        );
    }

    #[test]
    fn test_deleted_is_terminal() {
        assert_matches!(CommentStatus::Deleted.on_edit(), Err(EventHubError::Conflict(_)));
        assert_matches!(CommentStatus::Deleted.on_delete(), Err(EventHubError::Conflict(_)));
        assert_matches!(
            CommentStatus::Deleted.on_moderation(ModerationDecision::Approved),
            Err(EventHubError::Conflict(_))
        );
        assert_eq!(CommentStatus::Rejected.on_delete().unwrap(), CommentStatus::Deleted);
    }

    #[test]
    fn test_moderation_only_from_queue() {
        assert_eq!(
            CommentStatus::Pending.on_moderation(ModerationDecision::Rejected).unwrap(),
            CommentStatus::Rejected
        );
        assert_matches!(
            CommentStatus::Approved.on_moderation(ModerationDecision::Rejected),
            Err(EventHubError::Conflict(_))
        );
    }

    #[test]
    fn test_text_length_limit() {
        let long = NewCommentRequest { text: "x".repeat(256) };
        assert!(long.validate().is_err());
        let ok = NewCommentRequest { text: "x".repeat(255) };
        assert!(ok.validate().is_ok());
    }
}
