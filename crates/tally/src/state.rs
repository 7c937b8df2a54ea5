/// How a single event wants the counter to change.
///
/// Increment and overwrite are separate variants, so an event can never ask
/// for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Unchanged,
    Increment {
        amount: i64,
    },
    Overwrite {
        value: i64,
    },
}

impl Outcome {
    pub fn is_increment(&self) -> bool {
        matches!(self, Self::Increment { .. })
    }

    pub fn is_overwrite(&self) -> bool {
        matches!(self, Self::Overwrite { .. })
    }
}

/// Side effect owed after applying an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effect {
    pub persist: bool,
}

impl Effect {
    pub const NONE: Self = Self { persist: false };
    pub const PERSIST: Self = Self { persist: true };
}

/// The non-premium subscription count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterState {
    subs: i64,
}

impl CounterState {
    pub fn new(subs: i64) -> Self {
        Self { subs }
    }

    pub fn subs(&self) -> i64 {
        self.subs
    }

    pub fn apply(&mut self, outcome: Outcome) -> Effect {
        match outcome {
            Outcome::Increment { amount } => {
                self.subs = self.subs.saturating_add(amount);
                Effect::PERSIST
            }
            Outcome::Overwrite { value } => {
                self.subs = value;
                Effect::PERSIST
            }
            Outcome::Unchanged => Effect::NONE,
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
