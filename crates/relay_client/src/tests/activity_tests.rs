use super::*;
use tokio::time::timeout;

#[test]
fn take_resets_the_count() {
    let counter = ActivityCounter::default();
    let shared = counter.clone();
    counter.bump();
    shared.bump();

    assert_eq!(counter.peek(), 2);
    assert_eq!(shared.take(), 2);
    assert_eq!(counter.peek(), 0);
}

#[test]
fn quiet_periods_are_not_reported() {
    let counter = ActivityCounter::default();
    assert_eq!(report_velocity(&counter), None);

    for _ in 0..7 {
        counter.bump();
    }
    assert_eq!(report_velocity(&counter), Some(7));
    assert_eq!(report_velocity(&counter), None);
}

#[tokio::test(start_paused = true)]
async fn first_message_announcement_waits_for_traffic() {
    let counter = ActivityCounter::default();
    let watcher = tokio::spawn(announce_first_message(
        counter.clone(),
        "eznoprimes".to_string(),
        FIRST_MESSAGE_POLL,
    ));

    tokio::time::sleep(FIRST_MESSAGE_POLL * 5).await;
    assert!(!watcher.is_finished());

    counter.bump();
    timeout(FIRST_MESSAGE_POLL * 3, watcher)
        .await
        .expect("announces after the next poll")
        .expect("join");
    // Announcing does not consume the count.
    assert_eq!(counter.peek(), 1);
}

#[tokio::test(start_paused = true)]
async fn velocity_reporter_drains_each_period() {
    let counter = ActivityCounter::default();
    let reporter = tokio::spawn(report_velocity_every(counter.clone(), VELOCITY_PERIOD));

    counter.bump();
    counter.bump();
    tokio::time::sleep(VELOCITY_PERIOD + Duration::from_secs(1)).await;
    assert_eq!(counter.peek(), 0);

    counter.bump();
    assert_eq!(counter.peek(), 1);
    reporter.abort();
}
