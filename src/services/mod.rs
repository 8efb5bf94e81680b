//! Services module
//!
//! This module contains business logic services

pub mod category;
pub mod comment;
pub mod compilation;
pub mod event;
pub mod request;
pub mod stats;
pub mod stats_client;
pub mod user;

// Re-export commonly used services
pub use category::CategoryService;
pub use comment::CommentService;
pub use compilation::CompilationService;
pub use event::EventService;
pub use request::RequestService;
pub use stats::StatsService;
pub use stats_client::StatsClient;
pub use user::UserService;

use crate::database::{health_check, DatabaseService};

/// Service factory for creating and managing the main service's services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    db: DatabaseService,
    pub category_service: CategoryService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub request_service: RequestService,
    pub comment_service: CommentService,
    pub compilation_service: CompilationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, stats_client: StatsClient) -> Self {
        let event_service = EventService::new(db.clone(), stats_client);

        Self {
            category_service: CategoryService::new(db.categories.clone(), db.events.clone()),
            user_service: UserService::new(db.users.clone()),
            request_service: RequestService::new(db.clone()),
            comment_service: CommentService::new(db.clone()),
            compilation_service: CompilationService::new(db.clone(), event_service.clone()),
            event_service,
            db,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = match health_check(self.db.pool()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        };

        ServiceHealthStatus { database_healthy }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        issues
    }
}
