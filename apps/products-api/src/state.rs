//! Application state management.
//!
//! The state is cloned into each handler (inexpensive: the connection pool is
//! internally reference-counted).

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
}
