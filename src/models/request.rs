//! Participation request model
//!
//! Besides the row and wire types this module holds the admission rules:
//! which status a new request starts in, and how an owner's bulk status
//! update is split into confirmations and rejections.

use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;
use sqlx::FromRow;
use validator::Validate;

use crate::models::event::{Event, EventState};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::date_format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Confirmed => "CONFIRMED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ParticipationRequest {
    pub id: i64,
    pub event_id: i64,
    pub requester_id: i64,
    pub status: RequestStatus,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRequestDto {
    pub id: i64,
    #[serde(with = "date_format")]
    pub created: NaiveDateTime,
    pub event: i64,
    pub requester: i64,
    pub status: RequestStatus,
}

impl From<ParticipationRequest> for ParticipationRequestDto {
    fn from(request: ParticipationRequest) -> Self {
        Self {
            id: request.id,
            created: request.created,
            event: request.event_id,
            requester: request.requester_id,
            status: request.status,
        }
    }
}

/// Target status of an owner's bulk update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestDecision {
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestStatusUpdateRequest {
    #[validate(length(min = 1, message = "must contain at least one request id"))]
    pub request_ids: Vec<i64>,
    pub status: RequestDecision,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestStatusUpdateResult {
    pub confirmed_requests: Vec<ParticipationRequestDto>,
    pub rejected_requests: Vec<ParticipationRequestDto>,
}

/// Decide the initial status of a join request, or why it is refused
///
/// `has_active_request` tells whether the requester already holds a
/// PENDING or CONFIRMED request for this event.
pub fn admit(event: &Event, requester_id: i64, has_active_request: bool) -> Result<RequestStatus> {
    if event.is_initiated_by(requester_id) {
        return Err(EventHubError::conflict(
            "The initiator of the event cannot request to participate in their own event",
        ));
    }

    if event.state != EventState::Published {
        return Err(EventHubError::conflict(
            "Cannot participate in an unpublished event",
        ));
    }

    if has_active_request {
        return Err(EventHubError::conflict(
            "A participation request for this event already exists",
        ));
    }

    if event.is_full() {
        return Err(EventHubError::conflict(
            "The participant limit of the event has been reached",
        ));
    }

    if event.confirms_automatically() {
        Ok(RequestStatus::Confirmed)
    } else {
        Ok(RequestStatus::Pending)
    }
}

/// Outcome of a bulk update, in the order the ids were supplied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdatePlan {
    pub confirmed: Vec<i64>,
    pub rejected: Vec<i64>,
}

impl StatusUpdatePlan {
    pub fn confirmed_count(&self) -> i32 {
        i32::try_from(self.confirmed.len()).unwrap_or(i32::MAX)
    }
}

/// Split an owner's bulk update into confirmations and rejections
///
/// `targeted` holds the requests of `event` matching the supplied ids, in
/// the supplied order; ids that matched nothing were already dropped.
pub fn plan_status_update(
    event: &Event,
    targeted: &[ParticipationRequest],
    decision: RequestDecision,
) -> Result<StatusUpdatePlan> {
    if decision == RequestDecision::Confirmed && event.is_full() {
        return Err(EventHubError::conflict(
            "The participant limit of the event has been reached",
        ));
    }

    if let Some(request) = targeted.iter().find(|r| r.status != RequestStatus::Pending) {
        return Err(EventHubError::conflict(format!(
            "Request with id={} must have status PENDING but is {}",
            request.id, request.status
        )));
    }

    let mut plan = StatusUpdatePlan::default();
    match decision {
        RequestDecision::Rejected => {
            plan.rejected = targeted.iter().map(|r| r.id).collect();
        }
        RequestDecision::Confirmed => {
            let mut confirmed = event.confirmed_requests;
            for request in targeted {
                if event.has_participant_limit() && confirmed >= event.participant_limit {
                    plan.rejected.push(request.id);
                } else {
                    confirmed += 1;
                    plan.confirmed.push(request.id);
                }
            }
        }
    }

    Ok(plan)
}
