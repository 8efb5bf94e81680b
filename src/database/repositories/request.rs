//! Participation request repository implementation

use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool};
use crate::models::request::{ParticipationRequest, RequestStatus};
use crate::utils::errors::EventHubError;

const REQUEST_COLUMNS: &str = "id, event_id, requester_id, status, created";

#[derive(Clone, Debug)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Requests submitted by a user
    pub async fn list_by_requester(&self, requester_id: i64) -> Result<Vec<ParticipationRequest>, EventHubError> {
        let sql = format!(
            "SELECT {} FROM participation_requests WHERE requester_id = $1 ORDER BY id ASC",
            REQUEST_COLUMNS
        );
        let requests = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Requests submitted for an event
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<ParticipationRequest>, EventHubError> {
        let sql = format!(
            "SELECT {} FROM participation_requests WHERE event_id = $1 ORDER BY id ASC",
            REQUEST_COLUMNS
        );
        let requests = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Find request by ID if `requester_id` submitted it
    pub async fn find_for_requester(&self, id: i64, requester_id: i64) -> Result<Option<ParticipationRequest>, EventHubError> {
        let sql = format!(
            "SELECT {} FROM participation_requests WHERE id = $1 AND requester_id = $2",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(id)
            .bind(requester_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Check for a PENDING or CONFIRMED request of the requester
    pub async fn has_active(conn: &mut PgConnection, event_id: i64, requester_id: i64) -> Result<bool, EventHubError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM participation_requests
                WHERE event_id = $1 AND requester_id = $2 AND status IN ('PENDING', 'CONFIRMED')
            )
            "#
        )
        .bind(event_id)
        .bind(requester_id)
        .fetch_one(conn)
        .await?;

        Ok(exists.0)
    }

    /// Insert a request with its admitted status
    pub async fn insert(
        conn: &mut PgConnection,
        event_id: i64,
        requester_id: i64,
        status: RequestStatus,
        created: NaiveDateTime,
    ) -> Result<ParticipationRequest, EventHubError> {
        let sql = format!(
            "INSERT INTO participation_requests (event_id, requester_id, status, created) VALUES ($1, $2, $3, $4) RETURNING {}",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(event_id)
            .bind(requester_id)
            .bind(status)
            .bind(created)
            .fetch_one(conn)
            .await
            .map_err(|e| EventHubError::from_write(e, "A participation request for this event already exists"))?;

        Ok(request)
    }

    /// Load a request of `requester_id` and lock its row
    pub async fn lock_for_requester(
        conn: &mut PgConnection,
        id: i64,
        requester_id: i64,
    ) -> Result<Option<ParticipationRequest>, EventHubError> {
        let sql = format!(
            "SELECT {} FROM participation_requests WHERE id = $1 AND requester_id = $2 FOR UPDATE",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(id)
            .bind(requester_id)
            .fetch_optional(conn)
            .await?;

        Ok(request)
    }

    /// Load the event's requests among `ids`, keeping the order of `ids`
    pub async fn lock_targeted(
        conn: &mut PgConnection,
        event_id: i64,
        ids: &[i64],
    ) -> Result<Vec<ParticipationRequest>, EventHubError> {
        let sql = format!(
            "SELECT {} FROM participation_requests WHERE event_id = $1 AND id = ANY($2) FOR UPDATE",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(event_id)
            .bind(ids.to_vec())
            .fetch_all(conn)
            .await?;

        Ok(order_by_ids(rows, ids))
    }

    /// Set the status of one request
    pub async fn set_status(conn: &mut PgConnection, id: i64, status: RequestStatus) -> Result<ParticipationRequest, EventHubError> {
        let sql = format!(
            "UPDATE participation_requests SET status = $2 WHERE id = $1 RETURNING {}",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(id)
            .bind(status)
            .fetch_one(conn)
            .await?;

        Ok(request)
    }

    /// Set the status of several requests
    pub async fn set_status_many(
        conn: &mut PgConnection,
        ids: &[i64],
        status: RequestStatus,
    ) -> Result<Vec<ParticipationRequest>, EventHubError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "UPDATE participation_requests SET status = $2 WHERE id = ANY($1) RETURNING {}",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, ParticipationRequest>(&sql)
            .bind(ids.to_vec())
            .bind(status)
            .fetch_all(conn)
            .await?;

        Ok(order_by_ids(rows, ids))
    }
}

/// Reorder rows to follow `ids`, duplicates in `ids` collapse to the first position
fn order_by_ids(mut rows: Vec<ParticipationRequest>, ids: &[i64]) -> Vec<ParticipationRequest> {
    let mut ordered = Vec::with_capacity(rows.len());
    for id in ids {
        if let Some(position) = rows.iter().position(|r| r.id == *id) {
            ordered.push(rows.swap_remove(position));
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(id: i64) -> ParticipationRequest {
        ParticipationRequest {
            id,
            event_id: 1,
            requester_id: 10,
            status: RequestStatus::Pending,
            created: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_order_by_ids_follows_supplied_order() {
        let rows = vec![request(1), request(2), request(3)];
        let ordered = order_by_ids(rows, &[3, 99, 1, 3, 2]);
        let ids: Vec<i64> = ordered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
