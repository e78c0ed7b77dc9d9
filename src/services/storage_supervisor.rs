//! Background task owning the remote backend connection.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{remote_store::RemoteStore, storage::StorageError},
    services::sync_service,
    state::SharedState,
};

/// First delay between connection attempts.
const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep a remote backend installed and feed its health into the connectivity gate.
///
/// The gate only hears from the supervisor when the backend's health actually
/// changes, so an explicit offline event from the host sticks until then.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RemoteStore>, StorageError>> + Send,
{
    let poll_interval = state.config().health_poll_interval;
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.sync().install_remote(store.clone());
                info!("storage connection established; going online");
                sync_service::set_connectivity(&state, true);
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => sleep(poll_interval).await,
                        Err(err) => {
                            warn!(error = %err, "storage health check failed");
                            let mut attempt = 0;
                            let mut reconnect_delay = INITIAL_DELAY;
                            let mut reconnected = false;
                            let mut reported_offline = false;

                            while attempt < MAX_RECONNECT_ATTEMPTS {
                                match store.try_reconnect().await {
                                    Ok(()) => {
                                        info!("storage reconnection succeeded after health check failure");
                                        reconnected = true;
                                        break;
                                    }
                                    Err(reconnect_err) => {
                                        if attempt == 0 {
                                            warn!(
                                                attempt, error = %reconnect_err,
                                                "storage reconnect first attempt failed; going offline"
                                            );
                                            sync_service::set_connectivity(&state, false);
                                            reported_offline = true;
                                        } else {
                                            warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                                        };
                                        attempt += 1;
                                        sleep(reconnect_delay).await;
                                        reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                                    }
                                }
                            }

                            if reconnected {
                                if reported_offline {
                                    sync_service::set_connectivity(&state, true);
                                }
                                sleep(poll_interval).await;
                                continue;
                            } else {
                                warn!("exhausted storage reconnect attempts; dropping the backend");
                                break;
                            }
                        }
                    }
                }

                sync_service::set_connectivity(&state, false);
                state.sync().clear_remote();
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
