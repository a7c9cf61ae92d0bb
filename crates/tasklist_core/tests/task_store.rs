use tasklist_core::{
    FilterSelector, GatewayError, LoadError, LoadOutcome, MemoryGateway, Priority, TaskDraft,
    TaskId, TaskStore,
};

fn loaded_store(gateway: &MemoryGateway) -> TaskStore<&MemoryGateway> {
    let mut store = TaskStore::new(gateway);
    store.load();
    store
}

#[test]
fn add_to_empty_store_creates_open_medium_task() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);

    let created = store.add("Buy milk").unwrap();

    let tasks = store.list();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], created);
    assert_eq!(tasks[0].text, "Buy milk");
    assert_eq!(tasks[0].priority, Priority::Medium);
    assert!(!tasks[0].completed);
    assert_eq!(gateway.write_count(), 1);
}

#[test]
fn add_rejects_blank_text() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    store.add("keep").unwrap();

    assert!(store.add("").is_none());
    assert!(store.add("   ").is_none());

    assert_eq!(store.list().len(), 1);
    assert_eq!(gateway.write_count(), 1);
}

#[test]
fn priority_filter_selects_matching_task() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);

    for (text, priority) in [
        ("ship", Priority::High),
        ("review", Priority::Medium),
        ("tidy", Priority::Low),
    ] {
        let task = store.add(text).unwrap();
        store.edit(&task.id, text, priority);
    }

    let high = store.filtered(FilterSelector::High);
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].text, "ship");
}

#[test]
fn toggled_task_moves_from_active_to_completed() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    let done = store.add("file taxes").unwrap();
    let open = store.add("call mom").unwrap();

    assert!(store.toggle_complete(&done.id));

    let active = store.filtered(FilterSelector::Active);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, open.id);

    let completed = store.filtered(FilterSelector::Completed);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);
}

#[test]
fn toggle_twice_restores_original_state() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    let task = store.add("flip").unwrap();
    let before = store.list().to_vec();

    store.toggle_complete(&task.id);
    store.toggle_complete(&task.id);

    assert_eq!(store.list(), before.as_slice());
    assert_eq!(gateway.write_count(), 3);
}

#[test]
fn edit_replaces_text_and_priority_only() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    let task = store.add("Old text").unwrap();
    store.toggle_complete(&task.id);

    assert!(store.edit(&task.id, "New text", Priority::Low));

    let edited = store.get(&task.id).unwrap();
    assert_eq!(edited.id, task.id);
    assert_eq!(edited.text, "New text");
    assert_eq!(edited.priority, Priority::Low);
    assert!(edited.completed);
}

#[test]
fn committed_draft_applies_final_values() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    let task = store.add("draft source").unwrap();

    let mut draft = TaskDraft::from_task(&task);
    draft.text = "draft final".to_string();
    draft.priority = Priority::High;
    assert_eq!(gateway.write_count(), 1);

    assert!(store.commit_draft(&draft));
    let edited = store.get(&task.id).unwrap();
    assert_eq!(edited.text, "draft final");
    assert_eq!(edited.priority, Priority::High);
    assert_eq!(gateway.write_count(), 2);
}

#[test]
fn remove_is_idempotent_and_keeps_order() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    let first = store.add("one").unwrap();
    let second = store.add("two").unwrap();
    let third = store.add("three").unwrap();

    assert!(store.remove(&second.id));
    let after_first = store.list().to_vec();
    assert!(!store.remove(&second.id));

    assert_eq!(store.list(), after_first.as_slice());
    let ids: Vec<&TaskId> = store.list().iter().map(|task| &task.id).collect();
    assert_eq!(ids, vec![&first.id, &third.id]);
    assert_eq!(gateway.write_count(), 4);
}

#[test]
fn filter_all_partitions_into_active_and_completed() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    for index in 0..7 {
        let task = store.add(format!("task {index}")).unwrap();
        if index % 3 == 0 {
            store.toggle_complete(&task.id);
        }
    }

    let all = store.filtered(FilterSelector::All).len();
    let active = store.filtered(FilterSelector::Active).len();
    let completed = store.filtered(FilterSelector::Completed).len();
    assert_eq!(all, active + completed);

    let counts = store.counts();
    assert_eq!(counts.total, 7);
    assert_eq!(counts.completed, 3);
    assert_eq!(counts.active, 4);
}

#[test]
fn each_mutation_writes_full_snapshot_in_order() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    let task = store.add("a").unwrap();
    store.add("b").unwrap();
    store.toggle_complete(&task.id);

    let writes = gateway.writes();
    assert_eq!(writes.len(), 3);
    let last = tasklist_core::decode_tasks(&writes[2]).unwrap();
    assert_eq!(last, store.list());
    assert_eq!(tasklist_core::decode_tasks(&writes[0]).unwrap().len(), 1);
    assert_eq!(tasklist_core::decode_tasks(&writes[1]).unwrap().len(), 2);
}

#[test]
fn unavailable_storage_on_load_yields_empty_store() {
    let gateway = MemoryGateway::with_blob(r#"[{"id":"1","text":"lost"}]"#);
    gateway.set_fail_reads(true);
    let mut store = TaskStore::new(&gateway);

    let outcome = store.load();

    assert!(matches!(outcome, LoadOutcome::Recovered(LoadError::Storage(_))));
    assert!(store.list().is_empty());
}

#[test]
fn malformed_data_on_load_yields_empty_store() {
    let gateway = MemoryGateway::with_blob("{not json");
    let mut store = TaskStore::new(&gateway);

    let outcome = store.load();

    assert!(matches!(outcome, LoadOutcome::Recovered(LoadError::Malformed(_))));
    assert!(store.list().is_empty());

    store.add("fresh start").unwrap();
    assert_eq!(gateway.write_count(), 1);
}

#[test]
fn record_without_text_on_load_yields_empty_store() {
    let gateway = MemoryGateway::with_blob(r#"[{"id":"1","priority":"low"}]"#);
    let mut store = TaskStore::new(&gateway);

    let outcome = store.load();

    assert!(matches!(outcome, LoadOutcome::Recovered(LoadError::Malformed(_))));
    assert!(store.list().is_empty());
}

#[test]
fn unavailable_storage_reports_storage_unavailable() {
    let gateway = MemoryGateway::new();
    gateway.set_fail_reads(true);
    let mut store = TaskStore::new(&gateway);

    match store.load() {
        LoadOutcome::Recovered(LoadError::Storage(GatewayError::StorageUnavailable(reason))) => {
            assert!(reason.contains("tasks"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn reload_restores_previous_session() {
    let gateway = MemoryGateway::new();
    {
        let mut store = loaded_store(&gateway);
        let task = store.add("persisted").unwrap();
        store.edit(&task.id, "persisted", Priority::High);
        store.add("second").unwrap();
    }

    let mut store = TaskStore::new(&gateway);
    assert!(matches!(store.load(), LoadOutcome::Restored { count: 2 }));
    assert_eq!(store.list()[0].text, "persisted");
    assert_eq!(store.list()[0].priority, Priority::High);
    assert_eq!(store.list()[1].text, "second");
}

#[test]
fn failed_write_keeps_memory_authoritative() {
    let gateway = MemoryGateway::new();
    let mut store = loaded_store(&gateway);
    store.add("saved").unwrap();

    gateway.set_fail_writes(true);
    store.add("unsaved").unwrap();
    assert!(store.is_dirty());
    assert_eq!(store.list().len(), 2);

    gateway.set_fail_writes(false);
    store.add("next").unwrap();
    assert!(!store.is_dirty());
    let stored = tasklist_core::decode_tasks(&gateway.stored().unwrap()).unwrap();
    assert_eq!(stored.len(), 3);
}
