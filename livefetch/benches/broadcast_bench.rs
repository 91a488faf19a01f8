// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{BenchmarkId, Criterion, Throughput};
use livefetch::{consumer_fn, Demand, EngineConfig, MemoryStore, Publisher, Snapshot};
use livefetch_test_utils::{people_by_age, Person};
use std::hint::black_box;

fn people(rows: usize) -> Vec<Person> {
    (0..rows)
        .map(|n| Person::new(format!("person-{n}"), (n % 97) as u32))
        .collect()
}

fn sink() -> impl livefetch::Consumer<Person> {
    consumer_fn(
        |snapshot: Snapshot<Person>| {
            black_box(snapshot.len());
            Demand::Unlimited
        },
        |error| {
            black_box(error);
        },
    )
}

pub fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    // Subscriber counts to test fan-out scalability
    let subscriber_counts = [1usize, 8, 64, 256];
    let row_counts = [16usize, 1024];

    for &rows in &row_counts {
        for &subs in &subscriber_counts {
            group.throughput(Throughput::Elements(subs as u64));
            let id = BenchmarkId::from_parameter(format!("refresh_rows_{rows}_subs_{subs}"));
            group.bench_with_input(id, &(rows, subs), |bencher, &(rows, subs)| {
                let store = MemoryStore::with_rows(people(rows));
                let publisher = Publisher::new(store, EngineConfig::new(people_by_age()))
                    .expect("query has a sort order");
                let _subscriptions: Vec<_> = (0..subs)
                    .map(|_| publisher.subscribe(sink(), Demand::Unlimited))
                    .collect();

                bencher.iter(|| publisher.refresh_now());
            });
        }
    }

    // Change signals re-resolve the query and fan out the new snapshot
    for &subs in &subscriber_counts {
        group.throughput(Throughput::Elements(subs as u64));
        let id = BenchmarkId::from_parameter(format!("change_subs_{subs}"));
        group.bench_with_input(id, &subs, |bencher, &subs| {
            let store = MemoryStore::with_rows(people(64));
            let publisher = Publisher::new(store.clone(), EngineConfig::new(people_by_age()))
                .expect("query has a sort order");
            let _subscriptions: Vec<_> = (0..subs)
                .map(|_| publisher.subscribe(sink(), Demand::Unlimited))
                .collect();

            bencher.iter(|| {
                store.update_where(|p| p.age == 0, |p| p.name.push('!'));
            });
        });
    }

    group.finish();
}

pub fn bench_late_joiner(c: &mut Criterion) {
    let mut group = c.benchmark_group("late_joiner");

    for &rows in &[16usize, 1024, 16384] {
        let id = BenchmarkId::from_parameter(format!("cached_rows_{rows}"));
        group.bench_with_input(id, &rows, |bencher, &rows| {
            let store = MemoryStore::with_rows(people(rows));
            let publisher = Publisher::new(store, EngineConfig::new(people_by_age()))
                .expect("query has a sort order");
            publisher.refresh_now();

            bencher.iter(|| {
                let subscription = publisher.subscribe(sink(), Demand::max(1));
                black_box(subscription.demand());
            });
        });
    }

    group.finish();
}
