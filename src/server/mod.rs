//! HTTP server assembly

pub mod routes;
pub mod state;

pub use routes::{main_router, stats_router};
pub use state::{AppState, StatsState};
