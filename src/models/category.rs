//! Category model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::helpers::validate_not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCategoryRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Body of `PATCH /admin/categories/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

pub type CategoryDto = Category;
