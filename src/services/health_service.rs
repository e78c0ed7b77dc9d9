use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `ok` while the gate is online with a backend installed, logging
/// connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.sync().remote() {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("no storage backend installed; serving the local cache only"),
    }

    if state.sync().remote_if_online().is_some() {
        HealthResponse::ok()
    } else {
        HealthResponse::degraded()
    }
}
