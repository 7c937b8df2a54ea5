use shared::protocol::ChatEvent;
use storage::CounterStore;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    classify::classify,
    effector::Effector,
    state::{CounterState, Effect, Outcome},
};

/// Inbound events buffered between the relay and the dispatcher. A full
/// queue makes producers wait.
pub const EVENT_QUEUE_CAPACITY: usize = 16;

pub fn event_queue() -> (mpsc::Sender<ChatEvent>, mpsc::Receiver<ChatEvent>) {
    mpsc::channel(EVENT_QUEUE_CAPACITY)
}

/// Sole owner of the counter. Events are handled strictly one after another,
/// each one classified, applied and persisted before the next is pulled.
pub struct Dispatcher<S> {
    state: CounterState,
    effector: Effector<S>,
}

impl<S: CounterStore> Dispatcher<S> {
    pub fn new(state: CounterState, store: S) -> Self {
        Self {
            state,
            effector: Effector::new(store),
        }
    }

    /// Seeds the counter from whatever the store holds.
    pub async fn from_store(store: S) -> Self {
        let loaded = store.load().await;
        Self::new(CounterState::new(loaded.subs), store)
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn store(&self) -> &S {
        self.effector.store()
    }

    pub async fn handle(&mut self, event: &ChatEvent) -> Effect {
        let outcome = classify(event);
        let effect = self.state.apply(outcome);
        if outcome != Outcome::Unchanged {
            debug!(?outcome, subs = self.state.subs(), "applied outcome");
        }
        self.effector.perform(effect, self.state.subs()).await;
        effect
    }

    /// Drains the queue until every sender is gone, returning the final
    /// counter.
    pub async fn run(mut self, mut events: mpsc::Receiver<ChatEvent>) -> CounterState {
        while let Some(event) = events.recv().await {
            self.handle(&event).await;
        }
        info!(subs = self.state.subs(), "event queue closed, dispatcher stopping");
        self.state
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
