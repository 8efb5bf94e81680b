//! Compilation model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::event::EventShortDto;
use crate::utils::helpers::validate_not_blank;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Compilation {
    pub id: i64,
    pub title: String,
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCompilationRequest {
    #[serde(default)]
    pub events: Vec<i64>,
    #[serde(default)]
    pub pinned: bool,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 1, max = 50))]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCompilationRequest {
    pub events: Option<Vec<i64>>,
    pub pinned: Option<bool>,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 1, max = 50))]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationDto {
    pub id: i64,
    pub events: Vec<EventShortDto>,
    pub pinned: bool,
    pub title: String,
}

impl CompilationDto {
    pub fn from_compilation(compilation: Compilation, events: Vec<EventShortDto>) -> Self {
        Self {
            id: compilation.id,
            events,
            pinned: compilation.pinned,
            title: compilation.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_compilation_defaults() {
        let request: NewCompilationRequest = serde_json::from_str(r#"{"title":"Summer"}"#).unwrap();
        assert!(request.events.is_empty());
        assert!(!request.pinned);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_title_is_optional_but_bounded() {
        assert!(UpdateCompilationRequest::default().validate().is_ok());
        let too_long = UpdateCompilationRequest {
            title: Some("t".repeat(51)),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
    }
}
