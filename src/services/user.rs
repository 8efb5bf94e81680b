//! User service implementation
//!
//! Admin-side user registration, listing and removal.

use tracing::{debug, info};
use crate::database::repositories::UserRepository;
use crate::models::user::{NewUserRequest, UserDto};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::PageRequest;
use crate::utils::logging::log_admin_action;

/// User service for managing user operations
#[derive(Clone, Debug)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Register a new user
    pub async fn register(&self, request: NewUserRequest) -> Result<UserDto> {
        debug!(email = %request.email, "Registering user");

        let user = self.user_repository.create(request).await?;
        info!(user_id = user.id, "New user registered successfully");

        Ok(user.into())
    }

    /// List users, restricted to `ids` when given
    pub async fn list(&self, ids: &[i64], page: PageRequest) -> Result<Vec<UserDto>> {
        debug!(ids = ?ids, from = page.from, size = page.size, "Listing users");

        let users = self.user_repository.list(ids, page).await?;
        Ok(users.map(UserDto::from).into_items())
    }

    /// Delete a user together with everything the user owns
    pub async fn delete(&self, user_id: i64) -> Result<()> {
        if !self.user_repository.delete(user_id).await? {
            return Err(EventHubError::not_found("User", user_id));
        }

        log_admin_action("delete_user", Some(&user_id.to_string()), None);
        Ok(())
    }
}
