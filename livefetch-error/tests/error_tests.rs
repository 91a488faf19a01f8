// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use livefetch_error::{IntoLiveQueryError, LiveQueryError, Result, ResultExt};
use std::error::Error;
use std::io;

#[test]
fn test_error_display() {
    let err = LiveQueryError::missing_sort_order("people");
    assert_eq!(
        err.to_string(),
        "Query 'people' has no sort descriptor; a deterministic ordering is required"
    );

    let err = LiveQueryError::fetch_failed("disk full");
    assert_eq!(err.to_string(), "Fetch failed: disk full");

    let err = LiveQueryError::store_unavailable("closed");
    assert_eq!(err.to_string(), "Store unavailable: closed");

    let err = LiveQueryError::invalid_query("bad predicate");
    assert_eq!(err.to_string(), "Invalid query: bad predicate");
}

#[test]
fn test_error_constructors() {
    assert!(matches!(
        LiveQueryError::missing_sort_order("q"),
        LiveQueryError::MissingSortOrder { .. }
    ));
    assert!(matches!(
        LiveQueryError::invalid_query("q"),
        LiveQueryError::InvalidQuery { .. }
    ));
    assert!(matches!(
        LiveQueryError::store_unavailable("q"),
        LiveQueryError::StoreUnavailable { .. }
    ));
    assert!(matches!(
        LiveQueryError::fetch_failed("q"),
        LiveQueryError::FetchFailed { .. }
    ));
    assert!(matches!(
        LiveQueryError::user_error(io::Error::other("q")),
        LiveQueryError::UserError(_)
    ));
}

#[test]
fn test_is_retryable() {
    assert!(LiveQueryError::store_unavailable("down").is_retryable());
    assert!(!LiveQueryError::fetch_failed("bad").is_retryable());
    assert!(!LiveQueryError::missing_sort_order("q").is_retryable());
    assert!(!LiveQueryError::user_error(io::Error::other("x")).is_retryable());
}

#[test]
fn test_is_configuration() {
    assert!(LiveQueryError::missing_sort_order("q").is_configuration());
    assert!(!LiveQueryError::fetch_failed("q").is_configuration());
}

#[test]
fn test_result_context_wraps_user_errors() {
    // Arrange
    let result: Result<()> = Err(LiveQueryError::UserError("socket reset".into()));

    // Act
    let err = result.context("fetching people").unwrap_err();

    // Assert
    assert!(matches!(err, LiveQueryError::FetchFailed { .. }));
    assert!(err.to_string().contains("fetching people"));
    assert!(err.to_string().contains("socket reset"));
}

#[test]
fn test_result_context_preserves_typed_errors() {
    let result: Result<()> = Err(LiveQueryError::store_unavailable("offline"));

    let err = result.context("fetching people").unwrap_err();

    assert!(matches!(err, LiveQueryError::StoreUnavailable { .. }));
    assert_eq!(err.to_string(), "Store unavailable: offline");
}

#[test]
fn test_result_with_context_is_lazy_on_success() {
    let result: Result<u32> = Ok(7);

    let value = result
        .with_context(|| panic!("context closure must not run on success"))
        .unwrap();

    assert_eq!(value, 7);
}

#[test]
fn test_into_live_query_error_with_context() {
    let err = io::Error::other("permission denied").into_live_query_error("opening index");

    assert!(matches!(err, LiveQueryError::FetchFailed { .. }));
    assert_eq!(
        err.to_string(),
        "Fetch failed: opening index: permission denied"
    );
}

#[test]
fn test_into_live_query_keeps_source() {
    let err = io::Error::other("permission denied").into_live_query();

    assert!(matches!(err, LiveQueryError::UserError(_)));
    assert!(err.source().is_some());
}

#[test]
fn test_clone_user_error_keeps_message() {
    let err = LiveQueryError::user_error(io::Error::other("boom"));

    let cloned = err.clone();

    assert!(matches!(cloned, LiveQueryError::FetchFailed { .. }));
    assert!(cloned.to_string().contains("boom"));
}

#[test]
fn test_clone_typed_error_is_identical() {
    let err = LiveQueryError::missing_sort_order("people");

    let cloned = err.clone();

    assert_eq!(err.to_string(), cloned.to_string());
    assert!(cloned.is_configuration());
}

#[test]
fn test_error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LiveQueryError>();
}

#[test]
fn test_question_mark_into_anyhow() -> anyhow::Result<()> {
    fn ok_fetch() -> Result<usize> {
        Ok(2)
    }

    let count = ok_fetch()?;
    assert_eq!(count, 2);
    Ok(())
}
