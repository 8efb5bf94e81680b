//! User model

use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;
use sqlx::FromRow;
use validator::Validate;

use crate::utils::helpers::validate_not_blank;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_on: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUserRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(min = 2, max = 250))]
    pub name: String,
    #[validate(email)]
    #[validate(length(min = 6, max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserShortDto {
    pub id: i64,
    pub name: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_request_validation() {
        let ok = NewUserRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = NewUserRequest {
            email: "alice".to_string(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let blank_name = NewUserRequest {
            name: "   ".to_string(),
            ..ok
        };
        assert!(blank_name.validate().is_err());
    }
}
