//! Subscription tally core.
//!
//! Every inbound [`ChatEvent`](shared::protocol::ChatEvent) takes the same
//! path: [`classify`] turns it into an [`Outcome`], [`CounterState::apply`]
//! folds that into the counter and reports an [`Effect`], and the
//! [`Effector`] persists the counter when the effect asks for it. The
//! [`Dispatcher`] is the only place this happens, one event at a time.

mod classify;
mod dispatch;
mod effector;
mod state;

pub use classify::{classify, is_privileged, OVERWRITE_COMMAND_PREFIX, PREMIUM_PLAN};
pub use dispatch::{event_queue, Dispatcher, EVENT_QUEUE_CAPACITY};
pub use effector::Effector;
pub use state::{CounterState, Effect, Outcome};
