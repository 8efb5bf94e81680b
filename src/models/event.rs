//! Event model
//!
//! Rows, wire types and the lifecycle state machine for events.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDateTime};
use sqlx::FromRow;
use validator::Validate;

use crate::models::category::CategoryDto;
use crate::models::user::UserShortDto;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{date_format, format_timestamp, validate_not_blank};

/// Minimum look-ahead for dates submitted by the event owner
pub const USER_EVENT_DATE_LEAD_HOURS: i64 = 2;
/// Minimum look-ahead for dates submitted by an admin, and for publication
pub const ADMIN_EVENT_DATE_LEAD_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Pending => "PENDING",
            EventState::Published => "PUBLISHED",
            EventState::Canceled => "CANCELED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "PENDING" => Some(EventState::Pending),
            "PUBLISHED" => Some(EventState::Published),
            "CANCELED" => Some(EventState::Canceled),
            _ => None,
        }
    }

    /// State after an owner update carrying `action`
    pub fn apply_user_action(self, action: Option<UserStateAction>) -> Result<EventState> {
        match (self, action) {
            (EventState::Published, _) => Err(EventHubError::conflict(
                "Only pending or canceled events can be changed",
            )),
            (EventState::Canceled, Some(UserStateAction::SendToReview)) => Ok(EventState::Pending),
            (EventState::Canceled, _) => Err(EventHubError::conflict(
                "Canceled event must be sent to review to be changed",
            )),
            (EventState::Pending, Some(UserStateAction::CancelReview)) => Ok(EventState::Canceled),
            (EventState::Pending, _) => Ok(EventState::Pending),
        }
    }

    /// State after an admin update carrying `action`
    pub fn apply_admin_action(self, action: Option<AdminStateAction>) -> Result<EventState> {
        match action {
            Some(AdminStateAction::PublishEvent) if self != EventState::Pending => {
                Err(EventHubError::conflict(format!(
                    "Cannot publish the event because it's not in the right state: {}",
                    self.as_str()
                )))
            }
            Some(AdminStateAction::PublishEvent) => Ok(EventState::Published),
            Some(AdminStateAction::RejectEvent) if self == EventState::Published => {
                Err(EventHubError::conflict(
                    "Cannot reject the event because it has already been published",
                ))
            }
            Some(AdminStateAction::RejectEvent) => Ok(EventState::Canceled),
            None => Ok(self),
        }
    }
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStateAction {
    SendToReview,
    CancelReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

/// Event row joined with its category and initiator names
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Event {
    pub id: i64,
    pub annotation: String,
    pub description: String,
    pub title: String,
    pub category_id: i64,
    pub category_name: String,
    pub initiator_id: i64,
    pub initiator_name: String,
    pub lat: f32,
    pub lon: f32,
    pub event_date: NaiveDateTime,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub created_on: NaiveDateTime,
    pub published_on: Option<NaiveDateTime>,
    pub confirmed_requests: i32,
}

impl Event {
    /// Public URI the stats service tracks views under
    pub fn uri(&self) -> String {
        event_uri(self.id)
    }

    pub fn is_initiated_by(&self, user_id: i64) -> bool {
        self.initiator_id == user_id
    }

    pub fn has_participant_limit(&self) -> bool {
        self.participant_limit > 0
    }

    /// True once a limited event has no open slots left
    pub fn is_full(&self) -> bool {
        self.has_participant_limit() && self.confirmed_requests >= self.participant_limit
    }

    /// Conflict when a new limit would fall below the confirmed participants
    pub fn ensure_limit_fits(&self, participant_limit: Option<i32>) -> Result<()> {
        match participant_limit {
            Some(limit) if limit > 0 && limit < self.confirmed_requests => Err(EventHubError::conflict(format!(
                "Participant limit {} is below the {} confirmed request(s) of the event",
                limit, self.confirmed_requests
            ))),
            _ => Ok(()),
        }
    }

    /// Whether new requests are confirmed without owner moderation
    pub fn confirms_automatically(&self) -> bool {
        !self.has_participant_limit() || !self.request_moderation
    }

    pub fn location(&self) -> Location {
        Location {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

pub fn event_uri(event_id: i64) -> String {
    format!("/events/{}", event_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f32,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f32,
}

fn default_request_moderation() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 20, max = 2000))]
    pub annotation: String,
    #[validate(range(min = 1))]
    pub category: i64,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 20, max = 7000))]
    pub description: String,
    #[serde(with = "date_format")]
    pub event_date: NaiveDateTime,
    #[validate(nested)]
    pub location: Location,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub participant_limit: i32,
    #[serde(default = "default_request_moderation")]
    pub request_moderation: bool,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 3, max = 120))]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventUserRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 20, max = 2000))]
    pub annotation: Option<String>,
    #[validate(range(min = 1))]
    pub category: Option<i64>,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 20, max = 7000))]
    pub description: Option<String>,
    #[serde(default, with = "date_format::option")]
    pub event_date: Option<NaiveDateTime>,
    #[validate(nested)]
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub state_action: Option<UserStateAction>,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventAdminRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 20, max = 2000))]
    pub annotation: Option<String>,
    #[validate(range(min = 1))]
    pub category: Option<i64>,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 20, max = 7000))]
    pub description: Option<String>,
    #[serde(default, with = "date_format::option")]
    pub event_date: Option<NaiveDateTime>,
    #[validate(nested)]
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub state_action: Option<AdminStateAction>,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
}

/// Column changes applied by `EventRepository::update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub annotation: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub title: Option<String>,
    pub state: Option<EventState>,
    pub published_on: Option<NaiveDateTime>,
}

impl From<UpdateEventUserRequest> for EventChanges {
    fn from(request: UpdateEventUserRequest) -> Self {
        Self {
            annotation: request.annotation,
            category_id: request.category,
            description: request.description,
            event_date: request.event_date,
            location: request.location,
            paid: request.paid,
            participant_limit: request.participant_limit,
            request_moderation: request.request_moderation,
            title: request.title,
            state: None,
            published_on: None,
        }
    }
}

impl From<UpdateEventAdminRequest> for EventChanges {
    fn from(request: UpdateEventAdminRequest) -> Self {
        Self {
            annotation: request.annotation,
            category_id: request.category,
            description: request.description,
            event_date: request.event_date,
            location: request.location,
            paid: request.paid,
            participant_limit: request.participant_limit,
            request_moderation: request.request_moderation,
            title: request.title,
            state: None,
            published_on: None,
        }
    }
}

/// Reject event dates closer than `lead_hours` to `now`
pub fn ensure_event_date_lead(event_date: NaiveDateTime, now: NaiveDateTime, lead_hours: i64) -> Result<()> {
    if event_date < now + Duration::hours(lead_hours) {
        return Err(EventHubError::validation(
            "eventDate",
            format!(
                "must be at least {} hour(s) after the current moment. Value: {}",
                lead_hours,
                format_timestamp(event_date)
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFullDto {
    pub id: i64,
    pub annotation: String,
    pub category: CategoryDto,
    pub confirmed_requests: i64,
    #[serde(with = "date_format")]
    pub created_on: NaiveDateTime,
    pub description: String,
    #[serde(with = "date_format")]
    pub event_date: NaiveDateTime,
    pub initiator: UserShortDto,
    pub location: Location,
    pub paid: bool,
    pub participant_limit: i32,
    #[serde(with = "date_format::option")]
    pub published_on: Option<NaiveDateTime>,
    pub request_moderation: bool,
    pub state: EventState,
    pub title: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventShortDto {
    pub id: i64,
    pub annotation: String,
    pub category: CategoryDto,
    pub confirmed_requests: i64,
    #[serde(with = "date_format")]
    pub event_date: NaiveDateTime,
    pub initiator: UserShortDto,
    pub paid: bool,
    pub title: String,
    pub views: i64,
}

impl EventFullDto {
    pub fn from_event(event: Event, views: i64) -> Self {
        let location = event.location();
        Self {
            id: event.id,
            annotation: event.annotation,
            category: CategoryDto {
                id: event.category_id,
                name: event.category_name,
            },
            confirmed_requests: i64::from(event.confirmed_requests),
            created_on: event.created_on,
            description: event.description,
            event_date: event.event_date,
            initiator: UserShortDto {
                id: event.initiator_id,
                name: event.initiator_name,
            },
            location,
            paid: event.paid,
            participant_limit: event.participant_limit,
            published_on: event.published_on,
            request_moderation: event.request_moderation,
            state: event.state,
            title: event.title,
            views,
        }
    }
}

impl EventShortDto {
    pub fn from_event(event: Event, views: i64) -> Self {
        Self {
            id: event.id,
            annotation: event.annotation,
            category: CategoryDto {
                id: event.category_id,
                name: event.category_name,
            },
            confirmed_requests: i64::from(event.confirmed_requests),
            event_date: event.event_date,
            initiator: UserShortDto {
                id: event.initiator_id,
                name: event.initiator_name,
            },
            paid: event.paid,
            title: event.title,
            views,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    #[default]
    EventDate,
    Views,
}

/// Filters of `GET /admin/events`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminEventFilter {
    pub users: Vec<i64>,
    pub states: Vec<EventState>,
    pub categories: Vec<i64>,
    pub range_start: Option<NaiveDateTime>,
    pub range_end: Option<NaiveDateTime>,
}

/// Filters of `GET /events`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicEventFilter {
    pub text: Option<String>,
    pub categories: Vec<i64>,
    pub paid: Option<bool>,
    pub range_start: Option<NaiveDateTime>,
    pub range_end: Option<NaiveDateTime>,
    pub only_available: bool,
    pub sort: EventSort,
}

/// Reject ranges whose start is after their end
pub fn ensure_range(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(EventHubError::validation(
                "rangeStart",
                "must not be after rangeEnd",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    pub(crate) fn sample_event(participant_limit: i32, request_moderation: bool, confirmed: i32) -> Event {
        let created = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        Event {
            id: 42,
            annotation: "An annotation long enough to pass".to_string(),
            description: "A description long enough to pass".to_string(),
            title: "Swing night".to_string(),
            category_id: 1,
            category_name: "Dance".to_string(),
            initiator_id: 7,
            initiator_name: "Owner".to_string(),
            lat: 55.75,
            lon: 37.61,
            event_date: created + Duration::days(10),
            paid: false,
            participant_limit,
            request_moderation,
            state: EventState::Published,
            created_on: created,
            published_on: Some(created),
            confirmed_requests: confirmed,
        }
    }

    #[test]
    fn test_admin_publish_only_from_pending() {
        assert_eq!(
            EventState::Pending.apply_admin_action(Some(AdminStateAction::PublishEvent)).unwrap(),
            EventState::Published
        );
        assert_matches!(
            EventState::Published.apply_admin_action(Some(AdminStateAction::PublishEvent)),
            Err(EventHubError::Conflict(_))
        );
        assert_matches!(
            EventState::Canceled.apply_admin_action(Some(AdminStateAction::PublishEvent)),
            Err(EventHubError::Conflict(_))
        );
    }

    #[test]
    fn test_admin_reject_unless_published() {
        assert_eq!(
            EventState::Pending.apply_admin_action(Some(AdminStateAction::RejectEvent)).unwrap(),
            EventState::Canceled
        );
        assert_eq!(
            EventState::Canceled.apply_admin_action(Some(AdminStateAction::RejectEvent)).unwrap(),
            EventState::Canceled
        );
        assert_matches!(
            EventState::Published.apply_admin_action(Some(AdminStateAction::RejectEvent)),
            Err(EventHubError::Conflict(_))
        );
        assert_eq!(EventState::Published.apply_admin_action(None).unwrap(), EventState::Published);
    }

    #[test]
    fn test_owner_transitions() {
        assert_eq!(
            EventState::Pending.apply_user_action(Some(UserStateAction::CancelReview)).unwrap(),
            EventState::Canceled
        );
        assert_eq!(EventState::Pending.apply_user_action(None).unwrap(), EventState::Pending);
        assert_eq!(
            EventState::Canceled.apply_user_action(Some(UserStateAction::SendToReview)).unwrap(),
            EventState::Pending
        );
        assert_matches!(
            EventState::Canceled.apply_user_action(None),
            Err(EventHubError::Conflict(_))
        );
        assert_matches!(
            EventState::Published.apply_user_action(Some(UserStateAction::SendToReview)),
            Err(EventHubError::Conflict(_))
        );
    }

    #[test]
    fn test_capacity_helpers() {
        assert!(!sample_event(0, true, 100).is_full());
        assert!(sample_event(2, true, 2).is_full());
        assert!(!sample_event(2, true, 1).is_full());
        assert!(sample_event(0, true, 0).confirms_automatically());
        assert!(sample_event(5, false, 0).confirms_automatically());
        assert!(!sample_event(5, true, 0).confirms_automatically());
    }

    #[test]
    fn test_limit_cannot_drop_below_confirmed() {
        let event = sample_event(5, false, 3);
        assert!(event.ensure_limit_fits(None).is_ok());
        assert!(event.ensure_limit_fits(Some(3)).is_ok());
        assert!(event.ensure_limit_fits(Some(0)).is_ok());
        assert_matches!(event.ensure_limit_fits(Some(1)), Err(EventHubError::Conflict(msg)) if msg.contains("3 confirmed"));
    }

    #[test]
    fn test_update_requests_reject_blank_text() {
        let blank = " ".repeat(25);
        let user = UpdateEventUserRequest { annotation: Some(blank.clone()), ..Default::default() };
        assert!(user.validate().is_err());
        let admin = UpdateEventAdminRequest { description: Some(blank), ..Default::default() };
        assert!(admin.validate().is_err());
        let title = UpdateEventAdminRequest { title: Some("   ".to_string()), ..Default::default() };
        assert!(title.validate().is_err());
        assert!(UpdateEventUserRequest::default().validate().is_ok());
    }

    #[test]
    fn test_event_date_lead() {
        let now = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert!(ensure_event_date_lead(now + Duration::hours(2), now, USER_EVENT_DATE_LEAD_HOURS).is_ok());
        assert_matches!(
            ensure_event_date_lead(now + Duration::minutes(90), now, USER_EVENT_DATE_LEAD_HOURS),
            Err(EventHubError::Validation(fields)) if fields[0].field == "eventDate"
        );
        assert!(ensure_event_date_lead(now + Duration::minutes(90), now, ADMIN_EVENT_DATE_LEAD_HOURS).is_ok());
    }

    #[test]
    fn test_new_event_request_defaults_and_format() {
        let json = r#"{
            "annotation": "Annotation that is long enough",
            "category": 1,
            "description": "Description that is long enough",
            "eventDate": "2031-06-01 19:00:00",
            "location": {"lat": 55.7, "lon": 37.6},
            "title": "Lindy hop"
        }"#;
        let request: NewEventRequest = serde_json::from_str(json).unwrap();
        assert!(!request.paid);
        assert_eq!(request.participant_limit, 0);
        assert!(request.request_moderation);
        assert!(request.validate().is_ok());

        let bad = r#"{"annotation":"a","category":1,"description":"d","eventDate":"2031-06-01T19:00:00","location":{"lat":1,"lon":1},"title":"t"}"#;
        assert!(serde_json::from_str::<NewEventRequest>(bad).is_err());
    }

    #[test]
    fn test_full_dto_serializes_wire_names() {
        let dto = EventFullDto::from_event(sample_event(3, true, 1), 17);
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["confirmedRequests"], 1);
        assert_eq!(value["participantLimit"], 3);
        assert_eq!(value["views"], 17);
        assert_eq!(value["state"], "PUBLISHED");
        assert_eq!(value["createdOn"], "2030-01-01 10:00:00");
        assert_eq!(value["initiator"]["name"], "Owner");
    }

    #[test]
    fn test_range_order() {
        let a = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let b = a + Duration::days(1);
        assert!(ensure_range(Some(a), Some(b)).is_ok());
        assert!(ensure_range(Some(b), None).is_ok());
        assert!(ensure_range(Some(b), Some(a)).is_err());
    }
}
