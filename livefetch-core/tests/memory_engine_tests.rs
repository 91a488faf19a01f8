// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use livefetch_core::{
    ConfigureEngine, EngineConfig, LiveQueryEngine, LiveQueryError, MemoryQueryEngine, MemoryStore,
    QuerySpec, Snapshot, SortDescriptor,
};
use std::cell::RefCell;
use std::rc::Rc;

type Changes = Rc<RefCell<Vec<Option<Snapshot<u32>>>>>;

fn ascending() -> QuerySpec<u32> {
    QuerySpec::new("numbers").sort_by(SortDescriptor::ascending("n", |n: &u32| *n))
}

fn engine_with_changes(store: &MemoryStore<u32>, query: QuerySpec<u32>) -> (MemoryQueryEngine<u32>, Changes) {
    let mut engine = store
        .clone()
        .configure(EngineConfig::new(query))
        .expect("memory store always configures");
    let changes: Changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    engine.set_change_handler(Box::new(move |snapshot| sink.borrow_mut().push(snapshot)));
    (engine, changes)
}

#[test]
fn test_fetch_resolves_query() -> anyhow::Result<()> {
    // Arrange
    let store = MemoryStore::with_rows(vec![5, 2, 9, 1]);
    let (mut engine, _changes) = engine_with_changes(&store, ascending().filter(|n| *n > 1));

    // Act
    let snapshot = engine.fetch()?;

    // Assert
    assert_eq!(snapshot, vec![2, 5, 9]);
    assert_eq!(engine.current_snapshot(), Some(snapshot));
    Ok(())
}

#[test]
fn test_current_snapshot_is_none_before_fetch() {
    let store = MemoryStore::with_rows(vec![1]);
    let (engine, _changes) = engine_with_changes(&store, ascending());

    assert_eq!(engine.current_snapshot(), None);
}

#[test]
fn test_mutation_before_fetch_signals_without_snapshot() {
    let store = MemoryStore::new();
    let (_engine, changes) = engine_with_changes(&store, ascending());

    store.insert(4);

    assert_eq!(*changes.borrow(), vec![None]);
}

#[test]
fn test_mutation_after_fetch_signals_resolved_snapshot() -> anyhow::Result<()> {
    // Arrange
    let store = MemoryStore::with_rows(vec![3, 1]);
    let (mut engine, changes) = engine_with_changes(&store, ascending());
    engine.fetch()?;

    // Act
    store.insert(2);
    store.remove_where(|n| *n == 3);
    store.update_where(|n| *n == 1, |n| *n = 10);

    // Assert
    let changes = changes.borrow();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0].clone().unwrap(), vec![1, 2, 3]);
    assert_eq!(changes[1].clone().unwrap(), vec![1, 2]);
    assert_eq!(changes[2].clone().unwrap(), vec![2, 10]);
    assert_eq!(engine.current_snapshot().unwrap(), vec![2, 10]);
    Ok(())
}

#[test]
fn test_noop_removal_does_not_signal() -> anyhow::Result<()> {
    let store = MemoryStore::with_rows(vec![1]);
    let (mut engine, changes) = engine_with_changes(&store, ascending());
    engine.fetch()?;

    let removed = store.remove_where(|n| *n == 42);

    assert_eq!(removed, 0);
    assert!(changes.borrow().is_empty());
    Ok(())
}

#[test]
fn test_unavailable_store_fails_fetch() {
    let store = MemoryStore::with_rows(vec![1]);
    let (mut engine, _changes) = engine_with_changes(&store, ascending());
    store.set_available(false);

    let err = engine.fetch().unwrap_err();

    assert!(matches!(err, LiveQueryError::StoreUnavailable { .. }));
    assert!(err.is_retryable());
    assert_eq!(engine.current_snapshot(), None);
}

#[test]
fn test_unavailable_store_does_not_signal_changes() -> anyhow::Result<()> {
    // Arrange
    let store = MemoryStore::with_rows(vec![1]);
    let (mut engine, changes) = engine_with_changes(&store, ascending());
    engine.fetch()?;
    store.set_available(false);

    // Act
    store.insert(2);

    // Assert
    assert!(changes.borrow().is_empty());
    assert_eq!(engine.current_snapshot(), Some(Snapshot::from(vec![1])));

    store.set_available(true);
    store.insert(3);
    assert_eq!(*changes.borrow(), vec![Some(Snapshot::from(vec![1, 2, 3]))]);
    Ok(())
}

#[test]
fn test_mutation_from_inside_handler_is_signalled() -> anyhow::Result<()> {
    // Arrange
    let store = MemoryStore::with_rows(vec![1]);
    let mut engine = store.clone().configure(EngineConfig::new(ascending()))?;
    let changes: Changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    let writer = store.clone();
    engine.set_change_handler(Box::new(move |snapshot: Option<Snapshot<u32>>| {
        let grow = snapshot.as_ref().is_some_and(|s| s.len() == 2);
        sink.borrow_mut().push(snapshot);
        if grow {
            writer.insert(3);
        }
    }));
    engine.fetch()?;

    // Act
    store.insert(2);

    // Assert
    assert_eq!(
        *changes.borrow(),
        vec![
            Some(Snapshot::from(vec![1, 2])),
            Some(Snapshot::from(vec![1, 2, 3])),
        ]
    );
    assert_eq!(engine.current_snapshot(), Some(Snapshot::from(vec![1, 2, 3])));
    Ok(())
}

#[test]
fn test_try_extend_appends_all_rows() -> anyhow::Result<()> {
    let store = MemoryStore::with_rows(vec![1]);
    let (mut engine, changes) = engine_with_changes(&store, ascending());
    engine.fetch()?;

    let appended = store.try_extend(["3", "2"].iter().map(|s| s.parse::<u32>()))?;

    assert_eq!(appended, 2);
    assert_eq!(*changes.borrow(), vec![Some(Snapshot::from(vec![1, 2, 3]))]);
    Ok(())
}

#[test]
fn test_try_extend_rejects_partial_load() {
    let store = MemoryStore::with_rows(vec![1u32]);
    let (_engine, changes) = engine_with_changes(&store, ascending());

    let err = store
        .try_extend(["4", "four"].iter().map(|s| s.parse::<u32>()))
        .unwrap_err();

    assert!(matches!(err, LiveQueryError::FetchFailed { ref context } if context.starts_with("loading row 1: ")));
    assert_eq!(store.rows(), vec![1]);
    assert!(changes.borrow().is_empty());
}

#[test]
fn test_dropped_engine_stops_listening() {
    let store = MemoryStore::with_rows(vec![1]);
    let (engine, _changes) = engine_with_changes(&store, ascending());
    assert_eq!(store.listener_count(), 1);

    drop(engine);
    store.insert(2);

    assert_eq!(store.listener_count(), 0);
}

#[test]
fn test_cache_name_is_recorded() -> anyhow::Result<()> {
    let store = MemoryStore::<u32>::new();

    let engine = store.configure(EngineConfig::new(ascending()).with_cache_name("numbers-v1"))?;

    assert_eq!(engine.cache_name(), Some("numbers-v1"));
    assert_eq!(engine.query().name(), "numbers");
    Ok(())
}

#[test]
fn test_two_engines_share_one_store() -> anyhow::Result<()> {
    // Arrange
    let store = MemoryStore::with_rows(vec![1, 2, 3, 4]);
    let (mut evens, even_changes) = engine_with_changes(&store, ascending().filter(|n| n % 2 == 0));
    let (mut odds, odd_changes) = engine_with_changes(&store, ascending().filter(|n| n % 2 == 1));
    evens.fetch()?;
    odds.fetch()?;

    // Act
    store.extend(vec![5, 6]);

    // Assert
    assert_eq!(even_changes.borrow()[0].clone().unwrap(), vec![2, 4, 6]);
    assert_eq!(odd_changes.borrow()[0].clone().unwrap(), vec![1, 3, 5]);
    Ok(())
}
