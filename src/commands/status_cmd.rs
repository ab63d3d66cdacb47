//! Commands for database health and counters

use serde::Serialize;

use crate::repository::MetricsSnapshot;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub healthy: bool,
    pub metrics: MetricsSnapshot,
    /// Most recent log lines, oldest first
    pub recent_logs: Vec<String>,
}

/// Report connection health, transaction counters and recent log lines
pub async fn database_status(state: &AppState, log_lines: usize) -> Result<DatabaseStatus, String> {
    let healthy = match state.db_state.health_check().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Health check failed: {}", e);
            false
        }
    };

    Ok(DatabaseStatus {
        healthy,
        metrics: state.db_state.metrics().snapshot(),
        recent_logs: rolling_logger::recent_lines(log_lines),
    })
}
