use std::sync::Arc;

use crate::billing::PaymentGateway;
use crate::config::ServerConfig;
use crate::storage::StorageProvider;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: serene_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Object storage for uploaded audio.
    pub storage: Arc<dyn StorageProvider>,
    /// Payment processor client (checkout and billing portal).
    pub payments: Arc<dyn PaymentGateway>,
}
