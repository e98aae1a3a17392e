use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use super::*;
use crate::domain::entities::{
    BoardCard, BoardColumn, ColumnChange, HabitPatch, HabitRecord, TodoDraft, TodoPatch,
    TodoRecord, Urgency,
};
use crate::domain::ports::Collection;
use crate::domain::ports::mocks::{Call, MockNotificationPort, MockRemoteStore, Operation};

fn todo_row(id: &str, title: &str, completed: bool) -> Row {
    json!({
        "id": id,
        "title": title,
        "urgency": "medium",
        "completed": completed,
        "created_at": "2026-10-17T08:00:00+00:00",
        "completed_at": if completed { json!("2026-10-17T09:00:00+00:00") } else { Row::Null },
    })
}

fn reconciler<R: Record>(
    store: &Arc<MockRemoteStore>,
    notifier: &Arc<MockNotificationPort>,
) -> Reconciler<R> {
    Reconciler::new(store.clone(), notifier.clone())
}

async fn loaded<R: Record>(
    store: &Arc<MockRemoteStore>,
    notifier: &Arc<MockNotificationPort>,
) -> Reconciler<R> {
    let mut reconciler = reconciler(store, notifier);
    reconciler.load();
    reconciler.settle_all().await;
    reconciler
}

async fn wait_for_calls(store: &MockRemoteStore, count: usize) {
    while store.calls().len() < count {
        tokio::task::yield_now().await;
    }
}

fn ids<R>(reconciler: &Reconciler<R>) -> Vec<String>
where
    R: Record,
{
    reconciler
        .items()
        .iter()
        .map(|item| item.key().to_string())
        .collect()
}

fn id(value: &str) -> ItemId {
    ItemId::from(value)
}

#[tokio::test]
async fn test_create_shows_provisional_item_then_confirms_in_place() {
    let store = Arc::new(MockRemoteStore::new().with_rows(
        Collection::Todos,
        vec![todo_row("old", "Walk dog", false)],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;

    let temp_id = assert_ok!(todos.create(TodoDraft::new("Buy milk", Urgency::Light)));

    let head = &todos.items().as_slice()[0];
    assert!(!head.is_confirmed());
    assert_eq!(head.record().title, "Buy milk");
    assert_eq!(todos.items().len(), 2);

    let outcome = todos.settle_next().await;
    assert_eq!(
        outcome,
        Some(Reconciliation::Confirmed {
            temp_id,
            id: id("srv-1")
        })
    );
    assert_eq!(ids(&todos), ["srv-1", "old"]);
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Success, "Task added".to_string()))
    );
    assert!(store.calls().contains(&Call::Create(
        Collection::Todos,
        json!({"title": "Buy milk", "urgency": "light"})
    )));
}

#[tokio::test]
async fn test_create_failure_leaves_no_trace() {
    let store = Arc::new(MockRemoteStore::new());
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);
    store.fail_next(Operation::Create);

    let temp_id = assert_ok!(todos.create(TodoDraft::new("Buy milk", Urgency::Light)));
    assert_eq!(todos.items().len(), 1);

    let outcome = todos.settle_next().await;

    assert_eq!(
        outcome,
        Some(Reconciliation::RolledBack {
            key: ItemKey::Temp(temp_id)
        })
    );
    assert!(todos.items().is_empty());
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Error, "Failed to add task".to_string()))
    );
}

#[tokio::test]
async fn test_invalid_draft_is_rejected_without_call() {
    let store = Arc::new(MockRemoteStore::new());
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);

    let err = assert_err!(todos.create(TodoDraft::new("   ", Urgency::Urgent)));

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert!(todos.items().is_empty());
    assert_eq!(todos.outstanding(), 0);
    assert!(store.calls().is_empty());
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Error, "Title cannot be empty".to_string()))
    );
}

#[tokio::test]
async fn test_unreadable_create_response_drops_item_and_reloads() {
    let store = Arc::new(
        MockRemoteStore::new()
            .with_rows(Collection::Todos, vec![todo_row("7", "Buy milk", false)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);
    store.respond_to_next_create_with(json!({"title": "Buy milk"}));

    let temp_id = assert_ok!(todos.create(TodoDraft::new("Buy milk", Urgency::Light)));
    let outcomes = todos.settle_all().await;

    assert_eq!(
        outcomes,
        [
            Reconciliation::RolledBack {
                key: ItemKey::Temp(temp_id)
            },
            Reconciliation::Loaded { count: 1 },
        ]
    );
    assert_eq!(ids(&todos), ["7"]);
    assert_eq!(store.count(Operation::List), 1);
    assert_eq!(notifier.errors(), 1);
}

#[tokio::test]
async fn test_update_success_keeps_patch() {
    let store = Arc::new(
        MockRemoteStore::new().with_rows(Collection::Todos, vec![todo_row("1", "Read", false)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;

    assert_ok!(todos.update(&id("1"), TodoPatch::completion(true, Utc::now())));
    assert!(todos.items().confirmed(&id("1")).unwrap().completed);
    assert!(todos.is_pending(&id("1")));

    let outcome = todos.settle_next().await;

    assert_eq!(
        outcome,
        Some(Reconciliation::Applied {
            key: ItemKey::Durable(id("1"))
        })
    );
    assert!(todos.items().confirmed(&id("1")).unwrap().completed);
    assert!(!todos.is_pending(&id("1")));
    assert_eq!(store.rows(Collection::Todos)[0]["completed"], json!(true));
}

#[tokio::test]
async fn test_update_failure_restores_previous_fields() {
    let store = Arc::new(
        MockRemoteStore::new().with_rows(Collection::Todos, vec![todo_row("1", "Read", true)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;
    let before = todos.items().confirmed(&id("1")).cloned().unwrap();
    store.fail_next(Operation::Update);

    assert_ok!(todos.update(&id("1"), TodoPatch::completion(false, Utc::now())));
    assert_eq!(todos.items().confirmed(&id("1")).unwrap().completed_at, None);

    let outcome = todos.settle_next().await;

    assert_eq!(
        outcome,
        Some(Reconciliation::RolledBack {
            key: ItemKey::Durable(id("1"))
        })
    );
    assert_eq!(todos.items().confirmed(&id("1")), Some(&before));
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Error, "Failed to update task".to_string()))
    );
}

#[tokio::test]
async fn test_habit_toggle_rollback_restores_value_and_timestamp() {
    let store = Arc::new(MockRemoteStore::new().with_rows(
        Collection::Habits,
        vec![json!({
            "id": 4,
            "name": "Meditate",
            "type": "boolean",
            "goal_value": 1,
            "current_value": 1,
            "created_at": "2026-10-01T07:00:00+00:00",
            "completed_at": "2026-10-18T06:30:00+00:00"
        })],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut habits = loaded::<HabitRecord>(&store, &notifier).await;
    let before = habits.items().confirmed(&id("4")).cloned().unwrap();
    store.fail_next(Operation::Update);

    let patch = HabitPatch::toggle(&before, Utc::now());
    assert_ok!(habits.update(&id("4"), patch));
    let toggled = habits.items().confirmed(&id("4")).unwrap();
    assert_eq!(toggled.current_value, 0);
    assert_eq!(toggled.completed_at, None);

    habits.settle_all().await;

    let restored = habits.items().confirmed(&id("4")).unwrap();
    assert_eq!(restored, &before);
    assert!(restored.completed_at.is_some());
    assert_eq!(restored.current_value, 1);
}

#[tokio::test]
async fn test_identical_patch_still_calls_store() {
    let store = Arc::new(
        MockRemoteStore::new().with_rows(Collection::Todos, vec![todo_row("1", "Read", false)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;

    assert_ok!(todos.update(&id("1"), TodoPatch::rename("Read")));
    todos.settle_all().await;

    assert_eq!(store.count(Operation::Update), 1);
    assert_eq!(todos.items().confirmed(&id("1")).unwrap().title, "Read");
}

#[tokio::test]
async fn test_item_with_change_in_flight_is_busy() {
    let store = Arc::new(
        MockRemoteStore::new().with_rows(Collection::Todos, vec![todo_row("1", "Read", false)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;

    assert_ok!(todos.update(&id("1"), TodoPatch::rename("Read more")));
    let err = assert_err!(todos.update(&id("1"), TodoPatch::rename("Read less")));
    assert!(err.is_transient());
    assert_err!(todos.delete(&id("1")));

    todos.settle_all().await;
    assert_ok!(todos.delete(&id("1")));
    assert_eq!(store.count(Operation::Update), 1);
}

#[tokio::test]
async fn test_unknown_item_is_rejected() {
    let store = Arc::new(MockRemoteStore::new());
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);

    let err = assert_err!(todos.delete(&id("missing")));

    assert_eq!(
        err,
        ReconcileError::UnknownItem {
            key: ItemKey::Durable(id("missing"))
        }
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_delete_success_and_failure() {
    let store = Arc::new(MockRemoteStore::new().with_rows(
        Collection::Todos,
        vec![
            todo_row("1", "One", false),
            todo_row("2", "Two", false),
            todo_row("3", "Three", false),
        ],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;

    store.fail_next(Operation::Delete);
    assert_ok!(todos.delete(&id("2")));
    assert_eq!(ids(&todos), ["1", "3"]);
    assert_eq!(
        todos.settle_next().await,
        Some(Reconciliation::Restored {
            key: ItemKey::Durable(id("2"))
        })
    );
    assert_eq!(ids(&todos), ["1", "2", "3"]);
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Error, "Failed to delete task".to_string()))
    );

    assert_ok!(todos.delete(&id("2")));
    todos.settle_all().await;
    assert_eq!(ids(&todos), ["1", "3"]);
    assert_eq!(store.rows(Collection::Todos).len(), 2);
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Success, "Task deleted".to_string()))
    );
}

#[tokio::test]
async fn test_move_updates_column_and_position() {
    let store = Arc::new(MockRemoteStore::new().with_rows(
        Collection::Todos,
        vec![todo_row("a", "A", false), todo_row("b", "B", false)],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut board = loaded::<BoardCard>(&store, &notifier).await;

    assert_ok!(board.move_item(&id("a"), ColumnChange::new(BoardColumn::Done, Utc::now()), 1));
    assert_eq!(ids(&board), ["b", "a"]);
    assert_eq!(board.items().confirmed(&id("a")).unwrap().column, BoardColumn::Done);

    let outcome = board.settle_next().await;

    assert_eq!(
        outcome,
        Some(Reconciliation::Applied {
            key: ItemKey::Durable(id("a"))
        })
    );
    assert_eq!(store.rows(Collection::Todos)[0]["completed"], json!(true));
    assert_eq!(store.count(Operation::List), 1);
}

#[tokio::test]
async fn test_failed_move_resyncs_with_store() {
    let store = Arc::new(MockRemoteStore::new().with_rows(
        Collection::Todos,
        vec![todo_row("a", "A", false), todo_row("b", "B", false)],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut board = loaded::<BoardCard>(&store, &notifier).await;
    store.fail_next(Operation::Update);
    store.set_field(Collection::Todos, "b", "completed", json!(true));

    assert_ok!(board.move_item(&id("a"), ColumnChange::new(BoardColumn::Done, Utc::now()), 0));
    let outcome = board.settle_next().await;

    assert_eq!(outcome, Some(Reconciliation::Resynced { count: 2 }));
    assert_eq!(store.count(Operation::List), 2);
    let column = |key: &str| board.items().confirmed(&id(key)).unwrap().column;
    assert_eq!(column("a"), BoardColumn::Todo);
    assert_eq!(column("b"), BoardColumn::Done);
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Error, "Failed to move task".to_string()))
    );
}

#[tokio::test]
async fn test_failed_move_without_resync_undoes_locally() {
    let store = Arc::new(MockRemoteStore::new().with_rows(
        Collection::Todos,
        vec![todo_row("a", "A", false), todo_row("b", "B", false)],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut board = loaded::<BoardCard>(&store, &notifier).await;
    store.fail_next(Operation::Update);
    store.fail_next(Operation::List);

    assert_ok!(board.move_item(&id("a"), ColumnChange::new(BoardColumn::Done, Utc::now()), 1));
    let outcome = board.settle_next().await;

    assert_eq!(
        outcome,
        Some(Reconciliation::RolledBack {
            key: ItemKey::Durable(id("a"))
        })
    );
    assert_eq!(ids(&board), ["a", "b"]);
    assert_eq!(board.items().confirmed(&id("a")).unwrap().column, BoardColumn::Todo);
}

#[tokio::test]
async fn test_outcome_for_vanished_item_is_ignored() {
    let (store, gate) = MockRemoteStore::gated();
    let store = Arc::new(store.with_rows(Collection::Todos, vec![todo_row("1", "Read", false)]));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);
    todos.load();
    gate.add_permits(1);
    todos.settle_all().await;

    store.fail_next(Operation::Update);
    store.remove_row(Collection::Todos, "1");
    todos.load();
    wait_for_calls(&store, 2).await;
    assert_ok!(todos.update(&id("1"), TodoPatch::rename("Read more")));
    wait_for_calls(&store, 3).await;

    gate.add_permits(1);
    assert_eq!(todos.settle_next().await, Some(Reconciliation::Loaded { count: 0 }));
    gate.add_permits(1);
    assert_eq!(
        todos.settle_next().await,
        Some(Reconciliation::Stale {
            key: ItemKey::Durable(id("1"))
        })
    );
    assert!(todos.items().is_empty());
    assert_eq!(notifier.errors(), 0);
}

#[tokio::test]
async fn test_reload_keeps_provisional_items_and_pending_deletes() {
    let (store, gate) = MockRemoteStore::gated();
    let store = Arc::new(store.with_rows(
        Collection::Todos,
        vec![todo_row("1", "One", false), todo_row("2", "Two", false)],
    ));
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);
    todos.load();
    gate.add_permits(1);
    todos.settle_all().await;

    todos.load();
    wait_for_calls(&store, 2).await;
    let temp_id = assert_ok!(todos.create(TodoDraft::new("Three", Urgency::Medium)));
    wait_for_calls(&store, 3).await;
    assert_ok!(todos.delete(&id("2")));
    wait_for_calls(&store, 4).await;

    gate.add_permits(1);
    assert_eq!(todos.settle_next().await, Some(Reconciliation::Loaded { count: 1 }));

    assert_eq!(ids(&todos), [temp_id.to_string(), "1".to_string()]);
}

#[tokio::test]
async fn test_concurrent_creates_confirm_independently() {
    let (store, gate) = MockRemoteStore::gated();
    let store = Arc::new(store);
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);
    store.fail_next(Operation::Create);

    let first = assert_ok!(todos.create(TodoDraft::new("First", Urgency::Light)));
    wait_for_calls(&store, 1).await;
    let second = assert_ok!(todos.create(TodoDraft::new("Second", Urgency::Light)));
    wait_for_calls(&store, 2).await;
    assert_eq!(ids(&todos), [second.to_string(), first.to_string()]);

    gate.add_permits(1);
    let mut outcomes = vec![todos.settle_next().await];
    gate.add_permits(1);
    outcomes.push(todos.settle_next().await);

    assert_eq!(
        outcomes,
        [
            Some(Reconciliation::RolledBack {
                key: ItemKey::Temp(first)
            }),
            Some(Reconciliation::Confirmed {
                temp_id: second,
                id: id("srv-1")
            }),
        ]
    );
    assert_eq!(ids(&todos), ["srv-1"]);
}

#[tokio::test]
async fn test_drain_ready_applies_without_waiting() {
    let store = Arc::new(
        MockRemoteStore::new().with_rows(Collection::Todos, vec![todo_row("1", "Read", false)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = reconciler::<TodoRecord>(&store, &notifier);

    assert!(todos.drain_ready().is_empty());
    todos.load();
    while todos.items().is_empty() {
        tokio::task::yield_now().await;
        todos.drain_ready();
    }

    assert_eq!(todos.outstanding(), 0);
    assert_eq!(ids(&todos), ["1"]);
}

#[tokio::test]
async fn test_load_failure_keeps_items() {
    let store = Arc::new(
        MockRemoteStore::new().with_rows(Collection::Todos, vec![todo_row("1", "Read", false)]),
    );
    let notifier = Arc::new(MockNotificationPort::new());
    let mut todos = loaded::<TodoRecord>(&store, &notifier).await;
    store.fail_next(Operation::List);

    todos.load();

    assert_eq!(todos.settle_next().await, Some(Reconciliation::LoadFailed));
    assert_eq!(ids(&todos), ["1"]);
    assert_eq!(
        notifier.last(),
        Some((NotificationKind::Error, "Failed to load tasks".to_string()))
    );
}

#[test]
fn test_capitalize() {
    assert_eq!(capitalize("task"), "Task");
    assert_eq!(capitalize(""), "");
}
