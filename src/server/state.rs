//! Shared handler state for both services

use std::sync::Arc;
use crate::database::{DatabasePool, DatabaseService, HitRepository};
use crate::services::{ServiceFactory, StatsClient, StatsService};

/// Main service state, cloned per request
#[derive(Clone, Debug)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
}

impl AppState {
    pub fn new(pool: DatabasePool, stats_client: StatsClient) -> Self {
        let db = DatabaseService::new(pool);
        Self {
            services: Arc::new(ServiceFactory::new(db, stats_client)),
        }
    }
}

/// Stats service state
#[derive(Clone, Debug)]
pub struct StatsState {
    pub stats: StatsService,
    pub pool: DatabasePool,
}

impl StatsState {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            stats: StatsService::new(HitRepository::new(pool.clone())),
            pool,
        }
    }
}
