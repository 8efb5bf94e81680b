//! Event service implementation
//!
//! Owner, admin and public operations over events. Read paths attach
//! confirmed participants from the row and views from the stats service.
//! Updates lock the event row so state and capacity checks see the current
//! row.

use std::collections::HashMap;
use chrono::Duration;
use tracing::{debug, info};
use crate::database::{DatabaseService, EventRepository};
use crate::models::event::{
    ensure_event_date_lead, ensure_range, AdminEventFilter, AdminStateAction, Event, EventChanges, EventFullDto,
    EventShortDto, EventSort, EventState, NewEventRequest, PublicEventFilter, UpdateEventAdminRequest,
    UpdateEventUserRequest, ADMIN_EVENT_DATE_LEAD_HOURS, USER_EVENT_DATE_LEAD_HOURS,
};
use crate::services::stats_client::StatsClient;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{format_timestamp, now, PageRequest};
use crate::utils::logging::{log_admin_action, log_event_action};

/// URI recorded for public event searches
pub const EVENTS_URI: &str = "/events";

#[derive(Clone, Debug)]
pub struct EventService {
    db: DatabaseService,
    stats: StatsClient,
}

impl EventService {
    pub fn new(db: DatabaseService, stats: StatsClient) -> Self {
        Self { db, stats }
    }

    /// Create a PENDING event owned by `user_id`
    pub async fn create(&self, user_id: i64, request: NewEventRequest) -> Result<EventFullDto> {
        let created_on = now();
        ensure_event_date_lead(request.event_date, created_on, USER_EVENT_DATE_LEAD_HOURS)?;

        self.db.ensure_user(user_id).await?;
        self.ensure_category(request.category).await?;

        let event = self.db.events.create(user_id, request, created_on).await?;
        log_event_action(event.id, "create", Some(user_id), None);

        Ok(EventFullDto::from_event(event, 0))
    }

    /// Events created by the user, short view
    pub async fn list_own(&self, user_id: i64, page: PageRequest) -> Result<Vec<EventShortDto>> {
        self.db.ensure_user(user_id).await?;

        let events = self.db.events.list_by_initiator(user_id, page).await?.into_items();
        Ok(self.short_views(events).await)
    }

    /// One of the user's events, full view
    pub async fn get_own(&self, user_id: i64, event_id: i64) -> Result<EventFullDto> {
        self.db.ensure_user(user_id).await?;

        let event = self
            .db
            .events
            .find_by_id_and_initiator(event_id, user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        Ok(self.full_view(event).await)
    }

    /// Owner update of a pending or resubmitted event
    pub async fn update_own(&self, user_id: i64, event_id: i64, request: UpdateEventUserRequest) -> Result<EventFullDto> {
        if let Some(event_date) = request.event_date {
            ensure_event_date_lead(event_date, now(), USER_EVENT_DATE_LEAD_HOURS)?;
        }

        self.db.ensure_user(user_id).await?;
        if let Some(category_id) = request.category {
            self.ensure_category(category_id).await?;
        }

        let mut tx = self.db.pool().begin().await?;

        let event = EventRepository::lock_for_update(&mut *tx, event_id)
            .await?
            .filter(|event| event.is_initiated_by(user_id))
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        let state = event.state.apply_user_action(request.state_action)?;
        event.ensure_limit_fits(request.participant_limit)?;

        let mut changes = EventChanges::from(request);
        changes.state = Some(state);

        let updated = EventRepository::update(&mut *tx, event_id, changes)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        tx.commit().await?;

        log_event_action(event_id, "update", Some(user_id), Some(updated.state.as_str()));
        Ok(self.full_view(updated).await)
    }

    /// Admin search, full view
    pub async fn search_admin(&self, filter: AdminEventFilter, page: PageRequest) -> Result<Vec<EventFullDto>> {
        ensure_range(filter.range_start, filter.range_end)?;
        debug!(filter = ?filter, "Admin event search");

        let events = self.db.events.search_admin(&filter, page).await?.into_items();
        let views = self.stats.event_views(&events).await;

        Ok(events
            .into_iter()
            .map(|event| {
                let count = views.get(&event.id).copied().unwrap_or(0);
                EventFullDto::from_event(event, count)
            })
            .collect())
    }

    /// Admin edit, publication or rejection
    pub async fn update_admin(&self, event_id: i64, request: UpdateEventAdminRequest) -> Result<EventFullDto> {
        let moment = now();
        if let Some(event_date) = request.event_date {
            ensure_event_date_lead(event_date, moment, ADMIN_EVENT_DATE_LEAD_HOURS)?;
        }

        if let Some(category_id) = request.category {
            self.ensure_category(category_id).await?;
        }

        let mut tx = self.db.pool().begin().await?;

        let event = EventRepository::lock_for_update(&mut *tx, event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        let action = request.state_action;
        let state = event.state.apply_admin_action(action)?;
        if action == Some(AdminStateAction::PublishEvent) {
            let event_date = request.event_date.unwrap_or(event.event_date);
            if event_date < moment + Duration::hours(ADMIN_EVENT_DATE_LEAD_HOURS) {
                return Err(EventHubError::conflict(format!(
                    "Cannot publish the event: event date {} is less than {} hour(s) away",
                    format_timestamp(event_date),
                    ADMIN_EVENT_DATE_LEAD_HOURS
                )));
            }
        }
        event.ensure_limit_fits(request.participant_limit)?;

        let mut changes = EventChanges::from(request);
        changes.state = Some(state);
        if state == EventState::Published && event.state != EventState::Published {
            changes.published_on = Some(moment);
        }

        let updated = EventRepository::update(&mut *tx, event_id, changes)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        tx.commit().await?;

        log_admin_action("update_event", Some(&event_id.to_string()), Some(updated.state.as_str()));
        Ok(self.full_view(updated).await)
    }

    /// Public search over published events, short view
    pub async fn search_public(&self, filter: PublicEventFilter, page: PageRequest, client_ip: &str) -> Result<Vec<EventShortDto>> {
        ensure_range(filter.range_start, filter.range_end)?;
        debug!(filter = ?filter, "Public event search");

        let moment = now();
        let result = match filter.sort {
            EventSort::EventDate => {
                let events = self.db.events.search_public(&filter, moment, Some(page)).await?;
                self.short_views(events).await
            }
            EventSort::Views => {
                let events = self.db.events.search_public(&filter, moment, None).await?;
                let mut dtos = self.short_views(events).await;
                dtos.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id)));
                page.slice(dtos)
            }
        };

        self.stats.track_view(EVENTS_URI, client_ip).await;
        Ok(result)
    }

    /// A published event, full view; the view itself is recorded first
    pub async fn get_public(&self, event_id: i64, client_ip: &str) -> Result<EventFullDto> {
        let event = self
            .db
            .events
            .find_published(event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        self.stats.track_view(&event.uri(), client_ip).await;
        info!(event_id = event_id, client_ip = %client_ip, "Public event viewed");

        Ok(self.full_view(event).await)
    }

    /// Short views of events with their view counts
    pub async fn short_views(&self, events: Vec<Event>) -> Vec<EventShortDto> {
        let views = self.stats.event_views(&events).await;
        attach_short(events, &views)
    }

    async fn full_view(&self, event: Event) -> EventFullDto {
        let views = self.stats.event_views(std::slice::from_ref(&event)).await;
        let count = views.get(&event.id).copied().unwrap_or(0);
        EventFullDto::from_event(event, count)
    }

    async fn ensure_category(&self, category_id: i64) -> Result<()> {
        match self.db.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(EventHubError::not_found("Category", category_id)),
        }
    }
}

fn attach_short(events: Vec<Event>, views: &HashMap<i64, i64>) -> Vec<EventShortDto> {
    events
        .into_iter()
        .map(|event| {
            let count = views.get(&event.id).copied().unwrap_or(0);
            EventShortDto::from_event(event, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::sample_event;

    #[test]
    fn test_attach_short_defaults_missing_views_to_zero() {
        let mut other = sample_event(0, true, 0);
        other.id = 43;
        let views = HashMap::from([(42, 9)]);
        let dtos = attach_short(vec![sample_event(0, true, 0), other], &views);
        assert_eq!(dtos[0].views, 9);
        assert_eq!(dtos[1].views, 0);
    }
}
