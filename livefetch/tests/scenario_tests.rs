// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use livefetch::{
    Demand, EngineConfig, FetchStatus, LiveQueryError, MemoryStore, Publisher, QuerySpec,
    SortDescriptor,
};
use livefetch_test_utils::{RecordingConsumer, ScriptedEngine};

fn letters() -> QuerySpec<char> {
    QuerySpec::new("letters").sort_by(SortDescriptor::ascending("letter", |c: &char| *c))
}

#[test]
fn shared_query_lifecycle() -> anyhow::Result<()> {
    let engine = ScriptedEngine::new(vec!['a', 'b', 'c']);
    let handle = engine.handle();
    let publisher = Publisher::new(engine, EngineConfig::new(letters()))?;

    // A asks for one result and keeps asking for one more
    let a = RecordingConsumer::returning(Demand::max(1));
    let sub_a = publisher.subscribe(a.clone(), Demand::max(1));
    assert_eq!(a.items(), vec![vec!['a', 'b', 'c']]);
    assert_eq!(sub_a.demand(), Demand::max(1));
    assert_eq!(handle.fetch_count(), 1);

    // B joins after the fetch completed and is served from the cache
    let b = RecordingConsumer::returning(Demand::Unlimited);
    let sub_b = publisher.subscribe(b.clone(), Demand::Unlimited);
    assert_eq!(b.items(), vec![vec!['a', 'b', 'c']]);
    assert_eq!(handle.fetch_count(), 1);

    // The data changes
    handle.set_data(vec!['a', 'b', 'c', 'd']);
    handle.emit_change();
    assert_eq!(a.items().last(), Some(&vec!['a', 'b', 'c', 'd']));
    assert_eq!(b.items().last(), Some(&vec!['a', 'b', 'c', 'd']));

    // A forced refresh fails: both active subscriptions terminate
    handle.fail_next(LiveQueryError::fetch_failed("E"));
    publisher.refresh_now();
    assert_eq!(a.failure_count(), 1);
    assert_eq!(b.failure_count(), 1);
    assert!(sub_a.is_terminated());
    assert!(sub_b.is_terminated());
    assert_eq!(publisher.fetch_status(), FetchStatus::NotFetched);

    // C gets a brand-new attempt
    let c = RecordingConsumer::returning(Demand::Unlimited);
    let _sub_c = publisher.subscribe(c.clone(), Demand::Unlimited);
    assert_eq!(handle.fetch_count(), 3);
    assert_eq!(c.items(), vec![vec!['a', 'b', 'c', 'd']]);

    // Terminated subscriptions hear nothing more
    handle.emit_change();
    assert_eq!(a.received_count(), 2);
    assert_eq!(b.received_count(), 2);
    assert_eq!(a.failure_count(), 1);
    assert_eq!(c.received_count(), 2);
    Ok(())
}

#[test]
fn shared_query_over_memory_store() -> anyhow::Result<()> {
    // Arrange
    let store = MemoryStore::with_rows(vec!['c', 'a']);
    let query = letters().filter(|c: &char| *c != 'x').limit(3);
    let publisher = Publisher::new(store.clone(), EngineConfig::new(query))?;
    let reader = RecordingConsumer::returning(Demand::Unlimited);
    let _reader = publisher.subscribe(reader.clone(), Demand::Unlimited);

    // Act
    store.insert('x');
    store.insert('b');
    store.insert('d');
    store.remove_where(|c| *c == 'a');

    // Assert
    assert_eq!(
        reader.items(),
        vec![
            vec!['a', 'c'],
            vec!['a', 'c'],
            vec!['a', 'b', 'c'],
            vec!['a', 'b', 'c'],
            vec!['b', 'c', 'd'],
        ]
    );
    Ok(())
}
