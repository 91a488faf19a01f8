// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use livefetch_core::{QuerySpec, SortDescriptor};
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

impl Person {
    #[must_use]
    pub const fn new(name: String, age: u32) -> Self {
        Self { name, age }
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person[name={}, age={}]", self.name, self.age)
    }
}

pub fn person_alice() -> Person {
    Person::new("Alice".to_string(), 25)
}

pub fn person_bob() -> Person {
    Person::new("Bob".to_string(), 30)
}

pub fn person_charlie() -> Person {
    Person::new("Charlie".to_string(), 35)
}

pub fn person_diane() -> Person {
    Person::new("Diane".to_string(), 40)
}

/// Everybody, youngest first.
pub fn people_by_age() -> QuerySpec<Person> {
    QuerySpec::new("people-by-age")
        .sort_by(SortDescriptor::ascending("age", |p: &Person| p.age))
        .sort_by(SortDescriptor::ascending("name", |p: &Person| p.name.clone()))
}

/// Everybody, in no defined order. Rejected by publishers.
pub fn people_unordered() -> QuerySpec<Person> {
    QuerySpec::new("people-unordered")
}
