use storage::CounterStore;
use tracing::{info, warn};

use crate::state::Effect;

/// Carries out the [`Effect`] produced by a state change.
///
/// Write failures are logged and dropped: the in-memory count stays
/// authoritative and the next change writes it again.
pub struct Effector<S> {
    store: S,
}

impl<S: CounterStore> Effector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns whether the counter is now on disk.
    pub async fn perform(&self, effect: Effect, subs: i64) -> bool {
        if !effect.persist {
            return false;
        }

        match self.store.save(subs).await {
            Ok(()) => {
                info!(subs, "wrote subcount");
                true
            }
            Err(error) => {
                warn!(%error, subs, "failed to write subcount to output file");
                false
            }
        }
    }
}
