//! Category service implementation

use tracing::info;
use crate::database::repositories::{CategoryRepository, EventRepository};
use crate::models::category::{CategoryDto, NewCategoryRequest, UpdateCategoryRequest};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::PageRequest;
use crate::utils::logging::log_admin_action;

#[derive(Clone, Debug)]
pub struct CategoryService {
    categories: CategoryRepository,
    events: EventRepository,
}

impl CategoryService {
    pub fn new(categories: CategoryRepository, events: EventRepository) -> Self {
        Self { categories, events }
    }

    pub async fn create(&self, request: NewCategoryRequest) -> Result<CategoryDto> {
        let category = self.categories.create(request.name.trim()).await?;
        info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Rename a category; keeping its current name is accepted
    pub async fn update(&self, category_id: i64, request: UpdateCategoryRequest) -> Result<CategoryDto> {
        let category = self
            .categories
            .update(category_id, request.name.trim())
            .await?
            .ok_or_else(|| EventHubError::not_found("Category", category_id))?;

        info!(category_id = category.id, name = %category.name, "Category updated");
        Ok(category)
    }

    /// Delete a category no event references
    pub async fn delete(&self, category_id: i64) -> Result<()> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(EventHubError::not_found("Category", category_id));
        }

        if self.events.exists_with_category(category_id).await? {
            return Err(EventHubError::conflict("The category is not empty"));
        }

        if !self.categories.delete(category_id).await? {
            return Err(EventHubError::not_found("Category", category_id));
        }

        log_admin_action("delete_category", Some(&category_id.to_string()), None);
        Ok(())
    }

    pub async fn list(&self, page: PageRequest) -> Result<Vec<CategoryDto>> {
        Ok(self.categories.list(page).await?.into_items())
    }

    pub async fn get(&self, category_id: i64) -> Result<CategoryDto> {
        self.categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Category", category_id))
    }
}
