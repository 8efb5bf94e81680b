//! Event repository implementation

use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use crate::models::event::{AdminEventFilter, Event, EventChanges, EventSort, EventState, NewEventRequest, PublicEventFilter};
use crate::utils::errors::EventHubError;
use crate::utils::helpers::{Page, PageRequest};

/// Projection shared by every event query; expects the events row aliased as `e`
const EVENT_PROJECTION: &str = r#"
    e.id, e.annotation, e.description, e.title,
    e.category_id, c.name AS category_name,
    e.initiator_id, u.name AS initiator_name,
    e.lat, e.lon, e.event_date, e.paid, e.participant_limit, e.request_moderation,
    e.state, e.created_on, e.published_on, e.confirmed_requests
"#;

const EVENT_JOINS: &str = r#"
    JOIN categories c ON c.id = e.category_id
    JOIN users u ON u.id = e.initiator_id
"#;

fn select_events() -> String {
    format!("SELECT {} FROM events e {}", EVENT_PROJECTION, EVENT_JOINS)
}

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event in PENDING state
    pub async fn create(&self, initiator_id: i64, request: NewEventRequest, created_on: NaiveDateTime) -> Result<Event, EventHubError> {
        let sql = format!(
            r#"
            WITH e AS (
                INSERT INTO events (annotation, description, title, category_id, initiator_id, lat, lon,
                                    event_date, paid, participant_limit, request_moderation, state, created_on)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'PENDING', $12)
                RETURNING *
            )
            SELECT {} FROM e {}
            "#,
            EVENT_PROJECTION, EVENT_JOINS
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(request.annotation)
            .bind(request.description)
            .bind(request.title)
            .bind(request.category)
            .bind(initiator_id)
            .bind(request.location.lat)
            .bind(request.location.lon)
            .bind(request.event_date)
            .bind(request.paid)
            .bind(request.participant_limit)
            .bind(request.request_moderation)
            .bind(created_on)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EventHubError::from_write(e, "Event references a missing category or user"))?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventHubError> {
        let sql = format!("{} WHERE e.id = $1", select_events());
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find event by ID if `initiator_id` owns it
    pub async fn find_by_id_and_initiator(&self, id: i64, initiator_id: i64) -> Result<Option<Event>, EventHubError> {
        let sql = format!("{} WHERE e.id = $1 AND e.initiator_id = $2", select_events());
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(initiator_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find a published event by ID
    pub async fn find_published(&self, id: i64) -> Result<Option<Event>, EventHubError> {
        let sql = format!("{} WHERE e.id = $1 AND e.state = $2", select_events());
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(EventState::Published)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Load events by ids, unknown ids are skipped
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>, EventHubError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{} WHERE e.id = ANY($1) ORDER BY e.id ASC", select_events());
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// List events created by user
    pub async fn list_by_initiator(&self, initiator_id: i64, page: PageRequest) -> Result<Page<Event>, EventHubError> {
        let sql = format!(
            "{} WHERE e.initiator_id = $1 ORDER BY e.id ASC LIMIT $2 OFFSET $3",
            select_events()
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(initiator_id)
            .bind(page.size)
            .bind(page.from)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(events))
    }

    /// Apply column changes to a row locked by `lock_for_update`
    pub async fn update(conn: &mut PgConnection, id: i64, changes: EventChanges) -> Result<Option<Event>, EventHubError> {
        let sql = format!(
            r#"
            WITH e AS (
                UPDATE events
                SET annotation = COALESCE($2, annotation),
                    category_id = COALESCE($3, category_id),
                    description = COALESCE($4, description),
                    event_date = COALESCE($5, event_date),
                    lat = COALESCE($6, lat),
                    lon = COALESCE($7, lon),
                    paid = COALESCE($8, paid),
                    participant_limit = COALESCE($9, participant_limit),
                    request_moderation = COALESCE($10, request_moderation),
                    title = COALESCE($11, title),
                    state = COALESCE($12, state),
                    published_on = COALESCE($13, published_on)
                WHERE id = $1
                RETURNING *
            )
            SELECT {} FROM e {}
            "#,
            EVENT_PROJECTION, EVENT_JOINS
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(changes.annotation)
            .bind(changes.category_id)
            .bind(changes.description)
            .bind(changes.event_date)
            .bind(changes.location.map(|l| l.lat))
            .bind(changes.location.map(|l| l.lon))
            .bind(changes.paid)
            .bind(changes.participant_limit)
            .bind(changes.request_moderation)
            .bind(changes.title)
            .bind(changes.state)
            .bind(changes.published_on)
            .fetch_optional(conn)
            .await
            .map_err(|e| EventHubError::from_write(e, "Event update violates a category or capacity constraint"))?;

        Ok(event)
    }

    /// Check whether any event references the category
    pub async fn exists_with_category(&self, category_id: i64) -> Result<bool, EventHubError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE category_id = $1)")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// Admin search over all events
    pub async fn search_admin(&self, filter: &AdminEventFilter, page: PageRequest) -> Result<Page<Event>, EventHubError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(select_events());
        query.push(" WHERE TRUE");

        if !filter.users.is_empty() {
            query.push(" AND e.initiator_id = ANY(").push_bind(filter.users.clone()).push(")");
        }
        if !filter.states.is_empty() {
            query.push(" AND e.state IN (");
            let mut states = query.separated(", ");
            for state in &filter.states {
                states.push_bind(*state);
            }
            states.push_unseparated(")");
        }
        if !filter.categories.is_empty() {
            query.push(" AND e.category_id = ANY(").push_bind(filter.categories.clone()).push(")");
        }
        if let Some(start) = filter.range_start {
            query.push(" AND e.event_date >= ").push_bind(start);
        }
        if let Some(end) = filter.range_end {
            query.push(" AND e.event_date <= ").push_bind(end);
        }

        query
            .push(" ORDER BY e.id ASC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.from);

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(Page::new(events))
    }

    /// Public search over published events
    ///
    /// With `page` set the rows are sorted by event date and paginated in SQL;
    /// without it every match is returned so the caller can sort by views.
    pub async fn search_public(
        &self,
        filter: &PublicEventFilter,
        now: NaiveDateTime,
        page: Option<PageRequest>,
    ) -> Result<Vec<Event>, EventHubError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(select_events());
        query.push(" WHERE e.state = ").push_bind(EventState::Published);

        if let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(text));
            query
                .push(" AND (e.annotation ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if !filter.categories.is_empty() {
            query.push(" AND e.category_id = ANY(").push_bind(filter.categories.clone()).push(")");
        }
        if let Some(paid) = filter.paid {
            query.push(" AND e.paid = ").push_bind(paid);
        }
        match (filter.range_start, filter.range_end) {
            (None, None) => {
                query.push(" AND e.event_date > ").push_bind(now);
            }
            (start, end) => {
                if let Some(start) = start {
                    query.push(" AND e.event_date >= ").push_bind(start);
                }
                if let Some(end) = end {
                    query.push(" AND e.event_date <= ").push_bind(end);
                }
            }
        }
        if filter.only_available {
            query.push(" AND (e.participant_limit = 0 OR e.confirmed_requests < e.participant_limit)");
        }

        match filter.sort {
            EventSort::EventDate => query.push(" ORDER BY e.event_date ASC, e.id ASC"),
            EventSort::Views => query.push(" ORDER BY e.id ASC"),
        };
        if let Some(page) = page {
            query
                .push(" LIMIT ")
                .push_bind(page.size)
                .push(" OFFSET ")
                .push_bind(page.from);
        }

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    /// Load event and lock its row until the transaction ends
    pub async fn lock_for_update(conn: &mut PgConnection, id: i64) -> Result<Option<Event>, EventHubError> {
        let sql = format!("{} WHERE e.id = $1 FOR UPDATE OF e", select_events());
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(event)
    }

    /// Shift the confirmed participant counter
    pub async fn add_confirmed(conn: &mut PgConnection, id: i64, delta: i32) -> Result<(), EventHubError> {
        sqlx::query("UPDATE events SET confirmed_requests = GREATEST(confirmed_requests + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(conn)
            .await?;

        Ok(())
    }
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_select_projection_joins_names() {
        let sql = select_events();
        assert!(sql.contains("c.name AS category_name"));
        assert!(sql.contains("JOIN users u ON u.id = e.initiator_id"));
    }
}
