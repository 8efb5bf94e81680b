//! Database service layer
//!
//! This module provides a high-level interface to database operations.
//! Participation workflows run inside one transaction that locks the event
//! row first, so capacity checks and counter updates never interleave.

use crate::database::{
    DatabasePool, UserRepository, CategoryRepository, EventRepository, RequestRepository, CommentRepository,
    CompilationRepository,
};
use crate::models::request::{
    admit, plan_status_update, EventRequestStatusUpdateRequest, ParticipationRequest, RequestStatus, StatusUpdatePlan,
};
use crate::utils::errors::EventHubError;
use crate::utils::helpers::now;
use crate::utils::logging::log_request_action;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub events: EventRepository,
    pub requests: RequestRepository,
    pub comments: CommentRepository,
    pub compilations: CompilationRepository,
}

/// Requests changed by a bulk status update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdateOutcome {
    pub confirmed: Vec<ParticipationRequest>,
    pub rejected: Vec<ParticipationRequest>,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            compilations: CompilationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Fail with NotFound unless the user exists
    pub async fn ensure_user(&self, user_id: i64) -> Result<(), EventHubError> {
        if self.users.exists(user_id).await? {
            Ok(())
        } else {
            Err(EventHubError::not_found("User", user_id))
        }
    }

    /// Register user for event
    pub async fn join_event(&self, requester_id: i64, event_id: i64) -> Result<ParticipationRequest, EventHubError> {
        self.ensure_user(requester_id).await?;

        let mut tx = self.pool.begin().await?;

        let event = EventRepository::lock_for_update(&mut *tx, event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        let has_active = RequestRepository::has_active(&mut *tx, event_id, requester_id).await?;
        let status = admit(&event, requester_id, has_active)?;

        let request = RequestRepository::insert(&mut *tx, event_id, requester_id, status, now()).await?;
        if status == RequestStatus::Confirmed {
            EventRepository::add_confirmed(&mut *tx, event_id, 1).await?;
        }

        tx.commit().await?;

        log_request_action(request.id, event_id, "join", status.as_str());
        Ok(request)
    }

    /// Cancel a request on behalf of its requester
    pub async fn cancel_request(&self, requester_id: i64, request_id: i64) -> Result<ParticipationRequest, EventHubError> {
        self.ensure_user(requester_id).await?;

        let known = self
            .requests
            .find_for_requester(request_id, requester_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Request", request_id))?;

        if known.status == RequestStatus::Canceled {
            return Ok(known);
        }

        let mut tx = self.pool.begin().await?;

        // event row first, same order as join and bulk update
        EventRepository::lock_for_update(&mut *tx, known.event_id).await?;
        let request = RequestRepository::lock_for_requester(&mut *tx, request_id, requester_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Request", request_id))?;

        if request.status == RequestStatus::Canceled {
            tx.commit().await?;
            return Ok(request);
        }

        let canceled = RequestRepository::set_status(&mut *tx, request_id, RequestStatus::Canceled).await?;
        if request.status == RequestStatus::Confirmed {
            EventRepository::add_confirmed(&mut *tx, request.event_id, -1).await?;
        }

        tx.commit().await?;

        log_request_action(request_id, request.event_id, "cancel", canceled.status.as_str());
        Ok(canceled)
    }

    /// Confirm or reject pending requests of an owned event
    pub async fn update_request_statuses(
        &self,
        owner_id: i64,
        event_id: i64,
        update: &EventRequestStatusUpdateRequest,
    ) -> Result<StatusUpdateOutcome, EventHubError> {
        self.ensure_user(owner_id).await?;

        let mut tx = self.pool.begin().await?;

        let event = EventRepository::lock_for_update(&mut *tx, event_id)
            .await?
            .filter(|event| event.is_initiated_by(owner_id))
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        let targeted = RequestRepository::lock_targeted(&mut *tx, event_id, &update.request_ids).await?;
        let plan: StatusUpdatePlan = plan_status_update(&event, &targeted, update.status)?;

        let confirmed = RequestRepository::set_status_many(&mut *tx, &plan.confirmed, RequestStatus::Confirmed).await?;
        let rejected = RequestRepository::set_status_many(&mut *tx, &plan.rejected, RequestStatus::Rejected).await?;
        if plan.confirmed_count() > 0 {
            EventRepository::add_confirmed(&mut *tx, event_id, plan.confirmed_count()).await?;
        }

        tx.commit().await?;

        for request in confirmed.iter().chain(rejected.iter()) {
            log_request_action(request.id, event_id, "moderate", request.status.as_str());
        }

        Ok(StatusUpdateOutcome { confirmed, rejected })
    }
}
