//! Participation request service implementation

use tracing::debug;
use crate::database::DatabaseService;
use crate::models::request::{EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, ParticipationRequestDto};
use crate::utils::errors::{EventHubError, Result};

#[derive(Clone, Debug)]
pub struct RequestService {
    db: DatabaseService,
}

impl RequestService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Submit a request to join an event
    pub async fn join(&self, user_id: i64, event_id: i64) -> Result<ParticipationRequestDto> {
        debug!(user_id = user_id, event_id = event_id, "Joining event");
        let request = self.db.join_event(user_id, event_id).await?;
        Ok(request.into())
    }

    /// Cancel one of the user's requests
    pub async fn cancel(&self, user_id: i64, request_id: i64) -> Result<ParticipationRequestDto> {
        let request = self.db.cancel_request(user_id, request_id).await?;
        Ok(request.into())
    }

    /// Requests submitted by the user
    pub async fn list_own(&self, user_id: i64) -> Result<Vec<ParticipationRequestDto>> {
        self.db.ensure_user(user_id).await?;

        let requests = self.db.requests.list_by_requester(user_id).await?;
        Ok(requests.into_iter().map(ParticipationRequestDto::from).collect())
    }

    /// Requests submitted for an event the user owns
    pub async fn list_for_event(&self, owner_id: i64, event_id: i64) -> Result<Vec<ParticipationRequestDto>> {
        self.db.ensure_user(owner_id).await?;
        if self.db.events.find_by_id_and_initiator(event_id, owner_id).await?.is_none() {
            return Err(EventHubError::not_found("Event", event_id));
        }

        let requests = self.db.requests.list_by_event(event_id).await?;
        Ok(requests.into_iter().map(ParticipationRequestDto::from).collect())
    }

    /// Owner bulk confirmation or rejection
    pub async fn update_statuses(
        &self,
        owner_id: i64,
        event_id: i64,
        update: EventRequestStatusUpdateRequest,
    ) -> Result<EventRequestStatusUpdateResult> {
        let outcome = self.db.update_request_statuses(owner_id, event_id, &update).await?;

        Ok(EventRequestStatusUpdateResult {
            confirmed_requests: outcome.confirmed.into_iter().map(ParticipationRequestDto::from).collect(),
            rejected_requests: outcome.rejected.into_iter().map(ParticipationRequestDto::from).collect(),
        })
    }
}
