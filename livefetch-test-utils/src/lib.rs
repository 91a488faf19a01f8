// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the livefetch workspace.
//!
//! Development and testing only, never production code.
//!
//! # Key Types
//!
//! - [`ScriptedEngine`]: an engine whose data, failures and change signals are
//!   driven through a [`ScriptedHandle`], with a fetch counter for asserting
//!   deduplication.
//! - [`RecordingConsumer`]: a consumer that records every snapshot and failure
//!   and answers with scripted demand.
//! - [`Person`]: a small row type with fixtures and ready-made queries.

pub mod person;
pub mod recording_consumer;
pub mod scripted_engine;

pub use person::{
    people_by_age, people_unordered, person_alice, person_bob, person_charlie, person_diane,
    Person,
};
pub use recording_consumer::RecordingConsumer;
pub use scripted_engine::{ScriptedEngine, ScriptedHandle};
