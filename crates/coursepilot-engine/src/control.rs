//! Control plane: the enabled flag and the queue snapshot consumed by a
//! settings surface. The engine checks the flag before starting any
//! round; the surface toggles it and clears the queue. Coarse operations
//! only ever report boolean success.

use tracing::{debug, info};

use crate::queue;
use coursepilot_common::error::StoreError;
use coursepilot_common::store::KeyValueStore;
use coursepilot_common::task::QueueStatus;

/// Store key for the enabled flag. Absence means enabled.
pub const ENABLED_KEY: &str = "coursepilot.enabled";

/// Whether automation may run. Defaults to enabled when the flag is
/// absent or the store is unreadable.
pub async fn is_enabled(store: &dyn KeyValueStore) -> bool {
    match store.get(ENABLED_KEY).await {
        Ok(Some(value)) => value != "false",
        Ok(None) => true,
        Err(e) => {
            debug!(error = %e, "enabled flag unreadable, assuming enabled");
            true
        }
    }
}

/// Set the enabled flag. Returns true when automation transitioned from
/// disabled to enabled — the embedder's cue to invoke its restart hook
/// (reload the page and re-enter the session).
pub async fn set_enabled(
    store: &mut dyn KeyValueStore,
    enabled: bool,
) -> Result<bool, StoreError> {
    let was_enabled = is_enabled(store).await;
    store
        .set(ENABLED_KEY, if enabled { "true" } else { "false" })
        .await?;
    let restarted = enabled && !was_enabled;
    if restarted {
        info!("automation re-enabled, restart hook should fire");
    }
    Ok(restarted)
}

/// Drop the persisted queue.
pub async fn clear_queue(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    queue::clear(store).await
}

/// Snapshot for display. `None` when no queue is stored.
pub async fn status(store: &dyn KeyValueStore) -> Option<QueueStatus> {
    let record = queue::load(store).await;
    if record.is_empty() {
        None
    } else {
        Some(record.status())
    }
}
