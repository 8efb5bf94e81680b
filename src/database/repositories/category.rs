//! Category repository implementation

use sqlx::PgPool;
use crate::models::category::Category;
use crate::utils::errors::EventHubError;
use crate::utils::helpers::{Page, PageRequest};

#[derive(Clone, Debug)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category
    pub async fn create(&self, name: &str) -> Result<Category, EventHubError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name"
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EventHubError::from_write(e, format!("Category with name={} already exists", name)))?;

        Ok(category)
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, EventHubError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Rename category, returns None when the id is unknown
    pub async fn update(&self, id: i64, name: &str) -> Result<Option<Category>, EventHubError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name"
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EventHubError::from_write(e, format!("Category with name={} already exists", name)))?;

        Ok(category)
    }

    /// Delete category, returns false when nothing was deleted
    pub async fn delete(&self, id: i64) -> Result<bool, EventHubError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EventHubError::from_write(e, "The category is not empty"))?;

        Ok(result.rows_affected() > 0)
    }

    /// List categories ordered by id
    pub async fn list(&self, page: PageRequest) -> Result<Page<Category>, EventHubError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY id ASC LIMIT $1 OFFSET $2"
        )
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(categories))
    }
}
