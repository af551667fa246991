/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/


use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use integration_test_utils::numbered_topics;
use pubsub_filter::filter::{ExactFilter, PrefixFilter, SubscriptionFilter};
use pubsub_filter::{FilterMethod, Frame, Pipe, SocketActor, SubscriptionFrame, XPub};

const RULE_ROWS: usize = 10_000;
const FANOUT_PEERS: usize = 32;
const CHURN_BATCH_OPS: usize = 64;

fn filled<F: SubscriptionFilter>(mut filter: F, rules: &[Vec<u8>]) -> F {
    let (pipe, _) = Pipe::pair(1);
    for rule in rules {
        filter.add_rule(rule, pipe.peer());
    }
    filter
}

fn fanout_fixture() -> (XPub, Vec<Pipe>) {
    let mut xpub = XPub::default();
    let mut remotes = Vec::with_capacity(FANOUT_PEERS);
    for index in 0..FANOUT_PEERS {
        let (local, mut remote) = Pipe::pair(4096);
        let rule = format!("feed/{:02}", index % 8);
        assert!(remote.write(SubscriptionFrame::subscribe(FilterMethod::PREFIX, rule).encode()));
        remote.flush();
        xpub.attach_peer(local);
        remotes.push(remote);
    }
    (xpub, remotes)
}

fn filter_criterion(c: &mut Criterion) {
    let rules = numbered_topics("feed", RULE_ROWS);
    let prefix = filled(PrefixFilter::new(), &rules);
    let exact = filled(ExactFilter::new(), &rules);
    let hit = rules[RULE_ROWS / 2].clone();
    let mut deep_topic = hit.clone();
    deep_topic.extend_from_slice(b"/payload/section");

    let mut match_group = c.benchmark_group("filter_match");
    match_group.bench_function("prefix_hit", |b| {
        b.iter(|| black_box(prefix.matches(black_box(&deep_topic))));
    });
    match_group.bench_function("prefix_miss", |b| {
        b.iter(|| black_box(prefix.matches(black_box(b"other/topic"))));
    });
    match_group.bench_function("exact_hit", |b| {
        b.iter(|| black_box(exact.matches(black_box(&hit))));
    });
    match_group.finish();

    let mut churn_group = c.benchmark_group("filter_churn");
    churn_group.bench_function("prefix_add_remove", |b| {
        b.iter_batched(
            || filled(PrefixFilter::new(), &rules[..1_000]),
            |mut filter| {
                let (pipe, _) = Pipe::pair(1);
                let peer = pipe.peer();
                for rule in rules.iter().skip(1_000).take(CHURN_BATCH_OPS) {
                    filter.add_rule(rule, peer);
                    filter.remove_rule(rule, peer);
                }
                black_box(filter.rule_count());
            },
            BatchSize::SmallInput,
        );
    });
    churn_group.finish();

    let mut fanout_group = c.benchmark_group("xpub_fanout");
    fanout_group.bench_function("single_frame_publish", |b| {
        b.iter_batched(
            fanout_fixture,
            |(mut xpub, remotes)| {
                for index in 0..CHURN_BATCH_OPS {
                    let topic = format!("feed/{:02}/tick", index % 16);
                    xpub.send(Frame::new(topic))
                        .expect("publishing never fails");
                }
                black_box(remotes.len());
            },
            BatchSize::SmallInput,
        );
    });
    fanout_group.finish();
}

criterion_group!(benches, filter_criterion);
criterion_main!(benches);
