//! Integration tests for the board facade.
//!
//! Every test uses sequential ids and a manual clock so ids and timestamps
//! are deterministic.

use std::sync::{Arc, Mutex};
use task_board::drag::DropTarget;
use task_board::error::{BoardError, ErrorCode};
use task_board::facade::BoardStore;
use task_board::ids::{ManualClock, SequentialIds};
use task_board::ingest::ImagePayload;
use task_board::subscriptions::{BoardChange, MutationKind};
use task_board::types::Board;

/// Create a store over the default board.
fn setup_store() -> BoardStore {
    BoardStore::with_generators(
        Board::default(),
        SequentialIds::default(),
        ManualClock::new(1_000, 10),
    )
}

fn column(store: &BoardStore, id: &str) -> Vec<String> {
    store.board().column(id).unwrap().task_ids.clone()
}

/// Record every published change.
fn record(store: &mut BoardStore) -> Arc<Mutex<Vec<BoardChange>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |change: &BoardChange| sink.lock().unwrap().push(change.clone()));
    seen
}

// ---------------------------------------------------------------------------
// Task lifecycle
// ---------------------------------------------------------------------------

mod task_tests {
    use super::*;

    #[test]
    fn add_task_lands_at_end_of_column() {
        let mut store = setup_store();
        let a = store.add_task("todo", "Buy milk", "").unwrap();
        let b = store.add_task("todo", "Walk dog", "twice").unwrap();

        assert_eq!(column(&store, "todo"), vec![a.clone(), b.clone()]);
        let task = store.board().task(&b).unwrap();
        assert_eq!(task.title, "Walk dog");
        assert_eq!(task.description, "twice");
        assert!(task.updated_at.is_none());
        assert!(store.board().is_consistent());
    }

    #[test]
    fn blank_title_is_rejected_without_change() {
        let mut store = setup_store();
        let before = store.snapshot();
        let err = store.add_task("todo", "   ", "").unwrap_err();

        assert!(matches!(err, BoardError::EmptyTitle { .. }));
        assert_eq!(err.code(), ErrorCode::EmptyTitle);
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn title_is_trimmed() {
        let mut store = setup_store();
        let id = store.add_task("todo", "  Trim me  ", "").unwrap();
        assert_eq!(store.board().task(&id).unwrap().title, "Trim me");
    }

    #[test]
    fn add_to_unknown_column_changes_nothing() {
        let mut store = setup_store();
        let seen = record(&mut store);
        store.add_task("someday", "Nope", "").unwrap();

        assert!(store.board().tasks.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn update_sets_updated_at() {
        let mut store = setup_store();
        let id = store.add_task("todo", "Old", "").unwrap();
        assert!(store.update_task(&id, "New", "details").unwrap());

        let task = store.board().task(&id).unwrap();
        assert_eq!(task.title, "New");
        assert_eq!(task.description, "details");
        assert!(task.updated_at.unwrap() >= task.created_at);
    }

    #[test]
    fn delete_removes_task_and_placement() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        let b = store.add_task("todo", "B", "").unwrap();

        assert!(store.delete_task(&a));
        assert_eq!(column(&store, "todo"), vec![b]);
        assert!(!store.board().has_task(&a));
        assert!(!store.delete_task(&a));
    }
}

// ---------------------------------------------------------------------------
// Moving
// ---------------------------------------------------------------------------

mod move_tests {
    use super::*;

    #[test]
    fn move_across_columns_at_index() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        let b = store.add_task("done", "B", "").unwrap();

        assert!(store.move_task_to(&a, "done", Some(0)));
        assert!(column(&store, "todo").is_empty());
        assert_eq!(column(&store, "done"), vec![a, b]);
    }

    #[test]
    fn move_defaults_to_end() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        let b = store.add_task("in-progress", "B", "").unwrap();

        assert!(store.move_task_to(&a, "in-progress", None));
        assert_eq!(column(&store, "in-progress"), vec![b, a]);
    }

    #[test]
    fn reorder_within_column() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        let b = store.add_task("todo", "B", "").unwrap();
        let c = store.add_task("todo", "C", "").unwrap();

        assert!(store.move_task(&a, "todo", "todo", 0, 2));
        assert_eq!(column(&store, "todo"), vec![b, c, a]);
    }

    #[test]
    fn move_to_current_position_is_noop() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        let seen = record(&mut store);

        assert!(!store.move_task_to(&a, "todo", Some(0)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn drag_hover_then_drop() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        let x = store.add_task("done", "X", "").unwrap();
        let y = store.add_task("done", "Y", "").unwrap();

        // Hovering over the done column appends.
        assert!(store.drag_over(&a, DropTarget::Column("done")));
        assert_eq!(column(&store, "done"), vec![x.clone(), y.clone(), a.clone()]);

        // Dropping on X settles A into X's slot.
        assert!(store.drag_end(&a, Some(DropTarget::Task(&x))));
        assert_eq!(column(&store, "done"), vec![a, x, y]);
    }

    #[test]
    fn drop_outside_any_target_is_noop() {
        let mut store = setup_store();
        let a = store.add_task("todo", "A", "").unwrap();
        assert!(!store.drag_end(&a, None));
    }
}

// ---------------------------------------------------------------------------
// Children: reviews, subtasks, reports, images
// ---------------------------------------------------------------------------

mod children_tests {
    use super::*;

    #[test]
    fn reviews_append_and_delete() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        let r1 = store.add_review(&t, "Looks good").unwrap();
        let r2 = store.add_review(&t, "Ship it").unwrap();

        assert!(store.delete_review(&t, &r1));
        let reviews = &store.board().task(&t).unwrap().reviews;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, r2);
    }

    #[test]
    fn empty_review_is_rejected() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        let err = store.add_review(&t, "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyContent);
    }

    #[test]
    fn subtask_toggle_and_reports() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        let s = store.add_subtask(&t, "Step one").unwrap();

        assert!(store.toggle_subtask(&t, &s));
        let report = store.add_subtask_report(&t, &s, "Halfway").unwrap();

        let task = store.board().task(&t).unwrap();
        assert_eq!(task.subtask_progress(), (1, 1));
        let subtask = task.subtask(&s).unwrap();
        assert_eq!(subtask.report(&report).unwrap().content, "Halfway");

        assert!(store.delete_subtask_report(&t, &s, &report));
        assert!(store.delete_subtask(&t, &s));
        assert!(store.board().task(&t).unwrap().subtasks.is_empty());
    }

    #[test]
    fn images_attach_and_detach() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        let img = store.add_image(
            &t,
            ImagePayload {
                name: "shot.png".into(),
                data: "data:image/png;base64,AAAA".into(),
            },
        );

        assert_eq!(store.board().task(&t).unwrap().image(&img).unwrap().name, "shot.png");
        assert!(store.delete_image(&t, &img));
        assert!(store.board().task(&t).unwrap().images.is_empty());
    }

    #[test]
    fn reorder_subtasks_accepts_a_permutation() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        let s1 = store.add_subtask(&t, "one").unwrap();
        let s2 = store.add_subtask(&t, "two").unwrap();

        let mut reordered = store.board().task(&t).unwrap().subtasks.clone();
        reordered.reverse();
        assert!(store.reorder_subtasks(&t, reordered));

        let ids: Vec<_> = store
            .board()
            .task(&t)
            .unwrap()
            .subtasks
            .iter()
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(ids, vec![s2, s1]);
    }

    #[test]
    fn reorder_subtasks_with_duplicate_id_is_rejected() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        store.add_subtask(&t, "one").unwrap();
        let seen = record(&mut store);
        let before = store.snapshot();

        let mut subtasks = before.task(&t).unwrap().subtasks.clone();
        subtasks.push(subtasks[0].clone());
        assert!(!store.reorder_subtasks(&t, subtasks));

        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert!(seen.lock().unwrap().is_empty());
        assert!(store.board().is_consistent());
    }

    #[test]
    fn reorder_subtasks_with_foreign_or_missing_id_is_rejected() {
        let mut store = setup_store();
        let t = store.add_task("todo", "A", "").unwrap();
        store.add_subtask(&t, "one").unwrap();
        store.add_subtask(&t, "two").unwrap();
        let seen = record(&mut store);

        let mut foreign = store.board().task(&t).unwrap().subtasks.clone();
        foreign[1].id = "subtask-elsewhere".into();
        assert!(!store.reorder_subtasks(&t, foreign));

        let mut dropped = store.board().task(&t).unwrap().subtasks.clone();
        dropped.pop();
        assert!(!store.reorder_subtasks(&t, dropped));

        assert!(!store.reorder_subtasks("ghost", Vec::new()));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn children_of_missing_task_are_noops() {
        let mut store = setup_store();
        let seen = record(&mut store);
        store.add_review("ghost", "hi").unwrap();
        store.add_subtask("ghost", "hi").unwrap();
        assert!(!store.toggle_subtask("ghost", "s"));
        assert!(seen.lock().unwrap().is_empty());
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

mod subscription_tests {
    use super::*;

    #[test]
    fn each_applied_command_publishes_once() {
        let mut store = setup_store();
        let seen = record(&mut store);

        let t = store.add_task("todo", "A", "").unwrap();
        store.move_task_to(&t, "done", None);
        store.delete_task(&t);

        let seen = seen.lock().unwrap();
        let kinds: Vec<MutationKind> = seen.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MutationKind::TaskAdded,
                MutationKind::TaskMoved,
                MutationKind::TaskDeleted
            ]
        );
        assert_eq!(seen[0].task_id.as_deref(), Some(t.as_str()));
        assert!(seen[2].snapshot.tasks.is_empty());
    }

    #[test]
    fn published_snapshot_is_current_state() {
        let mut store = setup_store();
        let seen = record(&mut store);
        store.add_task("todo", "A", "").unwrap();

        let last = seen.lock().unwrap().last().unwrap().snapshot.clone();
        assert!(Arc::ptr_eq(&last, &store.snapshot()));
    }

    #[test]
    fn unsubscribed_callbacks_stop_receiving() {
        let mut store = setup_store();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = store.subscribe(move |_: &BoardChange| *sink.lock().unwrap() += 1);

        store.add_task("todo", "A", "").unwrap();
        assert!(store.unsubscribe(id));
        store.add_task("todo", "B", "").unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn replace_publishes_board_replaced() {
        let mut store = setup_store();
        store.add_task("todo", "A", "").unwrap();
        let seen = record(&mut store);

        assert!(store.replace(Board::default()));
        assert_eq!(seen.lock().unwrap()[0].kind, MutationKind::BoardReplaced);
        assert!(store.board().tasks.is_empty());
        assert_eq!(store.column_order(), vec!["todo", "in-progress", "done"]);
    }
}
