use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storage::{LoadSource, LoadedCount, StoreError};

use super::*;

#[derive(Default)]
struct RecordingStore {
    initial: i64,
    fail_saves: bool,
    saves: Mutex<Vec<i64>>,
}

impl RecordingStore {
    fn starting_at(initial: i64) -> Arc<Self> {
        Arc::new(Self {
            initial,
            ..Self::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_saves: true,
            ..Self::default()
        })
    }

    fn saves(&self) -> Vec<i64> {
        self.saves.lock().expect("saves lock").clone()
    }
}

#[async_trait]
impl CounterStore for RecordingStore {
    async fn load(&self) -> LoadedCount {
        LoadedCount {
            subs: self.initial,
            source: LoadSource::Restored,
        }
    }

    async fn save(&self, subs: i64) -> Result<(), StoreError> {
        self.saves.lock().expect("saves lock").push(subs);
        if self.fail_saves {
            return Err(StoreError::Io {
                path: "unwritable".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(())
    }
}

fn tier1_sub() -> ChatEvent {
    ChatEvent::new("USERNOTICE", vec!["#eznoprimes".into()])
        .with_tag("msg-id", "sub")
        .with_tag("msg-param-sub-plan", "1000")
}

fn prime_sub() -> ChatEvent {
    ChatEvent::new("USERNOTICE", vec!["#eznoprimes".into()])
        .with_tag("msg-id", "sub")
        .with_tag("msg-param-sub-plan", "Prime")
}

fn overwrite(value: &str, moderator: bool) -> ChatEvent {
    ChatEvent::new(
        "PRIVMSG",
        vec!["#eznoprimes".into(), format!("!nonprimesubcount {value}")],
    )
    .with_tag("mod", if moderator { "1" } else { "0" })
}

#[tokio::test]
async fn seeds_counter_from_store() {
    let dispatcher = Dispatcher::from_store(RecordingStore::starting_at(41)).await;
    assert_eq!(dispatcher.state().subs(), 41);
    assert!(dispatcher.store().saves().is_empty());
}

#[tokio::test]
async fn every_change_is_written_with_the_current_value() {
    let store = RecordingStore::starting_at(10);
    let mut dispatcher = Dispatcher::from_store(Arc::clone(&store)).await;

    assert_eq!(dispatcher.handle(&tier1_sub()).await, Effect::PERSIST);
    assert_eq!(dispatcher.handle(&prime_sub()).await, Effect::NONE);
    assert_eq!(dispatcher.handle(&overwrite("0", true)).await, Effect::PERSIST);
    assert_eq!(dispatcher.handle(&overwrite("999", false)).await, Effect::NONE);
    assert_eq!(dispatcher.handle(&tier1_sub()).await, Effect::PERSIST);

    assert_eq!(store.saves(), vec![11, 0, 1]);
    assert_eq!(dispatcher.state().subs(), 1);
}

#[tokio::test]
async fn failed_writes_keep_memory_authoritative() {
    let store = RecordingStore::failing();
    let mut dispatcher = Dispatcher::new(CounterState::new(5), Arc::clone(&store));

    dispatcher.handle(&tier1_sub()).await;
    dispatcher.handle(&tier1_sub()).await;

    assert_eq!(dispatcher.state().subs(), 7);
    assert_eq!(store.saves(), vec![6, 7]);
}

#[tokio::test]
async fn effector_reports_whether_it_wrote() {
    let effector = Effector::new(RecordingStore::starting_at(0));
    assert!(!effector.perform(Effect::NONE, 3).await);
    assert!(effector.perform(Effect::PERSIST, 3).await);
    assert_eq!(effector.store().saves(), vec![3]);

    let failing = Effector::new(RecordingStore::failing());
    assert!(!failing.perform(Effect::PERSIST, 3).await);
}

#[tokio::test]
async fn run_processes_queue_in_order_until_closed() {
    let store = RecordingStore::starting_at(0);
    let dispatcher = Dispatcher::from_store(Arc::clone(&store)).await;
    let (tx, rx) = event_queue();

    let consumer = tokio::spawn(dispatcher.run(rx));

    tx.send(overwrite("100", true)).await.expect("send");
    tx.send(tier1_sub()).await.expect("send");
    tx.send(overwrite("-5", true)).await.expect("send");
    tx.send(tier1_sub()).await.expect("send");
    drop(tx);

    let final_state = consumer.await.expect("dispatcher task");
    assert_eq!(final_state.subs(), -4);
    assert_eq!(store.saves(), vec![100, 101, -5, -4]);
}

#[tokio::test]
async fn concurrent_producers_never_lose_increments() {
    let store = RecordingStore::starting_at(0);
    let dispatcher = Dispatcher::from_store(Arc::clone(&store)).await;
    let (tx, rx) = event_queue();
    let consumer = tokio::spawn(dispatcher.run(rx));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let tx = tx.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    tx.send(tier1_sub()).await.expect("send");
                }
            })
        })
        .collect();
    drop(tx);
    for producer in producers {
        producer.await.expect("producer");
    }

    let final_state = consumer.await.expect("dispatcher task");
    assert_eq!(final_state.subs(), 200);
    let saves = store.saves();
    assert_eq!(saves.len(), 200);
    assert_eq!(saves, (1..=200).collect::<Vec<_>>());
}

#[tokio::test]
async fn full_queue_applies_backpressure() {
    let (tx, mut rx) = event_queue();
    for _ in 0..EVENT_QUEUE_CAPACITY {
        tx.try_send(tier1_sub()).expect("room in queue");
    }
    assert!(matches!(
        tx.try_send(tier1_sub()),
        Err(mpsc::error::TrySendError::Full(_))
    ));

    let blocked = tokio::spawn({
        let tx = tx.clone();
        async move { tx.send(tier1_sub()).await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(!blocked.is_finished());

    rx.recv().await.expect("event");
    blocked.await.expect("join").expect("send after drain");
}
