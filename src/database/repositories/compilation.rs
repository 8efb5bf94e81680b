//! Compilation repository implementation

use std::collections::HashMap;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use crate::models::compilation::{Compilation, NewCompilationRequest, UpdateCompilationRequest};
use crate::utils::errors::EventHubError;
use crate::utils::helpers::{Page, PageRequest};

#[derive(Clone, Debug)]
pub struct CompilationRepository {
    pool: PgPool,
}

impl CompilationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a compilation and attach the events that exist
    pub async fn create(&self, request: NewCompilationRequest) -> Result<Compilation, EventHubError> {
        let mut tx = self.pool.begin().await?;

        let compilation = sqlx::query_as::<_, Compilation>(
            "INSERT INTO compilations (title, pinned) VALUES ($1, $2) RETURNING id, title, pinned"
        )
        .bind(&request.title)
        .bind(request.pinned)
        .fetch_one(&mut *tx)
        .await?;

        attach_events(&mut *tx, compilation.id, &request.events).await?;
        tx.commit().await?;

        Ok(compilation)
    }

    /// Find compilation by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Compilation>, EventHubError> {
        let compilation = sqlx::query_as::<_, Compilation>(
            "SELECT id, title, pinned FROM compilations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(compilation)
    }

    /// Apply provided fields, a provided event set replaces the old one
    pub async fn update(&self, id: i64, request: UpdateCompilationRequest) -> Result<Option<Compilation>, EventHubError> {
        let mut tx = self.pool.begin().await?;

        let compilation = sqlx::query_as::<_, Compilation>(
            r#"
            UPDATE compilations
            SET title = COALESCE($2, title), pinned = COALESCE($3, pinned)
            WHERE id = $1
            RETURNING id, title, pinned
            "#
        )
        .bind(id)
        .bind(request.title.as_deref())
        .bind(request.pinned)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(compilation) = compilation else {
            return Ok(None);
        };

        if let Some(events) = request.events.as_deref() {
            sqlx::query("DELETE FROM compilation_events WHERE compilation_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            attach_events(&mut *tx, id, events).await?;
        }

        tx.commit().await?;
        Ok(Some(compilation))
    }

    /// Delete compilation, returns false when nothing was deleted
    pub async fn delete(&self, id: i64) -> Result<bool, EventHubError> {
        let result = sqlx::query("DELETE FROM compilations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List compilations ordered by id, optionally by pinned flag
    pub async fn list(&self, pinned: Option<bool>, page: PageRequest) -> Result<Page<Compilation>, EventHubError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT id, title, pinned FROM compilations");
        if let Some(pinned) = pinned {
            query.push(" WHERE pinned = ").push_bind(pinned);
        }
        query
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.from);

        let compilations = query.build_query_as::<Compilation>().fetch_all(&self.pool).await?;
        Ok(Page::new(compilations))
    }

    /// Event ids attached to each of the given compilations
    pub async fn event_ids(&self, compilation_ids: &[i64]) -> Result<HashMap<i64, Vec<i64>>, EventHubError> {
        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        if compilation_ids.is_empty() {
            return Ok(grouped);
        }

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT compilation_id, event_id FROM compilation_events
            WHERE compilation_id = ANY($1)
            ORDER BY compilation_id ASC, event_id ASC
            "#
        )
        .bind(compilation_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        for (compilation_id, event_id) in rows {
            grouped.entry(compilation_id).or_default().push(event_id);
        }
        Ok(grouped)
    }
}

/// Link existing events, unknown ids are skipped
async fn attach_events(conn: &mut PgConnection, compilation_id: i64, event_ids: &[i64]) -> Result<(), EventHubError> {
    if event_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO compilation_events (compilation_id, event_id)
        SELECT $1, id FROM events WHERE id = ANY($2)
        ON CONFLICT DO NOTHING
        "#
    )
    .bind(compilation_id)
    .bind(event_ids.to_vec())
    .execute(conn)
    .await?;

    Ok(())
}
