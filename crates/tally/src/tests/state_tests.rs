use super::*;

#[test]
fn unchanged_outcome_does_nothing() {
    let mut state = CounterState::new(1234);
    assert_eq!(state.apply(Outcome::Unchanged), Effect::NONE);
    assert_eq!(state.apply(Outcome::Unchanged), Effect::NONE);
    assert_eq!(state, CounterState::new(1234));
}

#[test]
fn increment_adds_amount_and_persists() {
    let mut state = CounterState::new(1234);
    assert_eq!(state.apply(Outcome::Increment { amount: 1 }), Effect::PERSIST);
    assert_eq!(state.subs(), 1235);

    assert_eq!(state.apply(Outcome::Increment { amount: 5 }), Effect::PERSIST);
    assert_eq!(state.subs(), 1240);
}

#[test]
fn overwrite_replaces_value_and_persists() {
    let mut state = CounterState::new(1234);
    assert_eq!(state.apply(Outcome::Overwrite { value: 69 }), Effect::PERSIST);
    assert_eq!(state.subs(), 69);

    // Writing the same value again still owes a write.
    assert_eq!(state.apply(Outcome::Overwrite { value: 69 }), Effect::PERSIST);
    assert_eq!(state.apply(Outcome::Overwrite { value: -3 }), Effect::PERSIST);
    assert_eq!(state.subs(), -3);
}

#[test]
fn increment_saturates_instead_of_wrapping() {
    let mut state = CounterState::new(i64::MAX);
    state.apply(Outcome::Increment { amount: 1 });
    assert_eq!(state.subs(), i64::MAX);
}

#[test]
fn outcome_flag_view() {
    assert!(Outcome::Increment { amount: 1 }.is_increment());
    assert!(!Outcome::Increment { amount: 1 }.is_overwrite());
    assert!(Outcome::Overwrite { value: 0 }.is_overwrite());
    assert!(!Outcome::Unchanged.is_increment());
    assert!(!Outcome::Unchanged.is_overwrite());
    assert_eq!(Outcome::default(), Outcome::Unchanged);
    assert_eq!(CounterState::default().subs(), 0);
}
