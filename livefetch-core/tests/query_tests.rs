// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use livefetch_core::{
    EngineConfig, ExecutionContext, LiveQueryError, QuerySpec, SortDescriptor, SortDirection,
};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    name: &'static str,
    team: u8,
    score: u32,
}

fn row(name: &'static str, team: u8, score: u32) -> Row {
    Row { name, team, score }
}

fn rows() -> Vec<Row> {
    vec![
        row("carol", 2, 50),
        row("alice", 1, 70),
        row("dave", 2, 70),
        row("bob", 1, 50),
    ]
}

fn names(rows: &[Row]) -> Vec<&'static str> {
    rows.iter().map(|r| r.name).collect()
}

#[test]
fn test_validate_requires_sort_descriptor() {
    let query = QuerySpec::<Row>::new("leaderboard");

    let err = query.validate().unwrap_err();

    assert!(matches!(err, LiveQueryError::MissingSortOrder { ref query } if query == "leaderboard"));
}

#[test]
fn test_validate_accepts_sorted_query() {
    let query = QuerySpec::new("leaderboard").sort_by(SortDescriptor::ascending("name", |r: &Row| r.name));

    assert!(query.validate().is_ok());
}

#[test]
fn test_resolve_sorts_ascending() {
    let query = QuerySpec::new("by-name").sort_by(SortDescriptor::ascending("name", |r: &Row| r.name));

    let resolved = query.resolve(rows().iter());

    assert_eq!(names(&resolved), vec!["alice", "bob", "carol", "dave"]);
}

#[test]
fn test_resolve_breaks_ties_with_later_descriptors() {
    let query = QuerySpec::new("leaderboard")
        .sort_by(SortDescriptor::descending("score", |r: &Row| r.score))
        .sort_by(SortDescriptor::ascending("name", |r: &Row| r.name));

    let resolved = query.resolve(rows().iter());

    assert_eq!(names(&resolved), vec!["alice", "dave", "bob", "carol"]);
}

#[test]
fn test_resolve_filters_and_limits() {
    let query = QuerySpec::new("team-two")
        .filter(|r: &Row| r.team == 2)
        .sort_by(SortDescriptor::descending("score", |r: &Row| r.score))
        .limit(1);

    let resolved = query.resolve(rows().iter());

    assert_eq!(resolved, vec![row("dave", 2, 70)]);
}

#[test]
fn test_resolve_is_stable_for_equal_keys() {
    let query = QuerySpec::new("by-team").sort_by(SortDescriptor::ascending("team", |r: &Row| r.team));

    let resolved = query.resolve(rows().iter());

    assert_eq!(names(&resolved), vec!["alice", "bob", "carol", "dave"]);
}

#[test]
fn test_descriptor_accessors() {
    let descriptor = SortDescriptor::descending("score", |r: &Row| r.score);

    assert_eq!(descriptor.field(), "score");
    assert_eq!(descriptor.direction(), SortDirection::Descending);
    assert_eq!(
        descriptor.compare(&row("a", 1, 10), &row("b", 1, 20)),
        Ordering::Greater
    );
}

#[test]
fn test_engine_config_defaults_to_current_context() {
    let query = QuerySpec::new("q").sort_by(SortDescriptor::ascending("name", |r: &Row| r.name));

    let config = EngineConfig::new(query);

    assert!(config.context().is_current());
    assert_eq!(config.cache_name(), None);
    assert_eq!(config.query().name(), "q");
}

#[test]
fn test_execution_context_on_other_thread_is_not_current() {
    let context = ExecutionContext::named("store");

    let seen_elsewhere = std::thread::spawn({
        let context = context.clone();
        move || context.is_current()
    })
    .join()
    .unwrap();

    assert!(context.is_current());
    assert!(!seen_elsewhere);
    assert_eq!(context.to_string(), "store");
}
