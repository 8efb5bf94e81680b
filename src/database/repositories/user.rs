//! User repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use crate::models::user::{User, NewUserRequest};
use crate::utils::errors::EventHubError;
use crate::utils::helpers::{now, Page, PageRequest};

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: NewUserRequest) -> Result<User, EventHubError> {
        let email = request.email.clone();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, created_on)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_on
            "#
        )
        .bind(request.name)
        .bind(request.email)
        .bind(now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EventHubError::from_write(e, format!("User with email={} already exists", email)))?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventHubError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_on FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether a user exists
    pub async fn exists(&self, id: i64) -> Result<bool, EventHubError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// List users ordered by id, optionally restricted to `ids`
    pub async fn list(&self, ids: &[i64], page: PageRequest) -> Result<Page<User>, EventHubError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, name, email, created_on FROM users");
        if !ids.is_empty() {
            query.push(" WHERE id = ANY(").push_bind(ids.to_vec()).push(")");
        }
        query
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.from);

        let users = query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(users))
    }

    /// Delete user, returns false when nothing was deleted
    pub async fn delete(&self, id: i64) -> Result<bool, EventHubError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
