//! Location provider seam.
//!
//! The provider delivers at most one cached-fix completion per lookup and a
//! stream of updates per subscription. Implementations may invoke callbacks
//! synchronously from inside the call that registered them.

use crate::error::ProviderError;
use geofix_core::{Fix, LiveRequestConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Completion of a cached-fix lookup. `Ok(None)` means no fix is cached.
pub type CachedFixCallback = Box<dyn FnOnce(Result<Option<Fix>, ProviderError>) + Send>;

/// Receiver of live updates.
pub type UpdateCallback = Arc<dyn Fn(Fix) + Send + Sync>;

/// Handle identifying one live subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Platform location service.
pub trait LocationProvider: Send + Sync {
    /// Look up the last known fix.
    ///
    /// Returns `Err` when the call itself is refused; a lookup that runs but
    /// finds nothing completes with `Ok(None)`.
    fn last_known_fix(&self, on_complete: CachedFixCallback) -> Result<(), ProviderError>;

    /// Start continuous updates.
    fn subscribe(
        &self,
        request: &LiveRequestConfig,
        on_update: UpdateCallback,
    ) -> Result<SubscriptionId, ProviderError>;

    /// Stop a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, subscription: SubscriptionId);
}
