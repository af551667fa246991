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


use integration_test_utils::{init_logging, receive_all, received_payloads, Wire};
use pubsub_filter::{FilterMethod, Frame, SocketActor, Sub, SubscriptionFrame, XPub};

const HWM: usize = 64;

fn events(publisher: &mut XPub) -> Vec<SubscriptionFrame> {
    receive_all(publisher)
        .iter()
        .map(|frame| SubscriptionFrame::decode_frame(frame).expect("subscription event"))
        .collect()
}

#[test]
fn repeated_subscribe_reaches_publisher_once() {
    init_logging();

    let mut publisher = XPub::default();
    let mut subscriber = Sub::default();
    let wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    subscriber.subscribe(b"topic").expect("subscribe");
    subscriber.subscribe(b"topic").expect("subscribe again");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(
        events(&mut publisher),
        vec![SubscriptionFrame::subscribe(FilterMethod::PREFIX, "topic")]
    );

    subscriber.unsubscribe(b"topic").expect("unsubscribe");
    wire.pump(&mut publisher, &mut subscriber);
    assert!(events(&mut publisher).is_empty());

    // one subscription is still outstanding
    publisher.send(Frame::new("topic/1")).expect("publish");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(received_payloads(&mut subscriber), vec![b"topic/1".to_vec()]);

    subscriber.unsubscribe(b"topic").expect("last unsubscribe");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(
        events(&mut publisher),
        vec![SubscriptionFrame::unsubscribe(FilterMethod::PREFIX, "topic")]
    );
}

#[test]
fn rules_set_before_connect_are_replayed() {
    init_logging();

    let mut publisher = XPub::default();
    let mut subscriber = Sub::default();
    subscriber.subscribe(b"early").expect("subscribe");
    subscriber.subscribe(b"bird").expect("subscribe");

    let wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    let mut replayed = events(&mut publisher);
    replayed.sort_by(|left, right| left.rule().cmp(right.rule()));
    assert_eq!(
        replayed,
        vec![
            SubscriptionFrame::subscribe(FilterMethod::PREFIX, "bird"),
            SubscriptionFrame::subscribe(FilterMethod::PREFIX, "early"),
        ]
    );

    publisher.send(Frame::new("early/worm")).expect("publish");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(received_payloads(&mut subscriber), vec![b"early/worm".to_vec()]);
}

#[test]
fn reconnect_resubscribes_and_later_unsubscribe_clears_rule() {
    init_logging();

    let mut publisher = XPub::default();
    let mut subscriber = Sub::default();
    let mut wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    subscriber.subscribe(b"kept").expect("subscribe");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(events(&mut publisher).len(), 1);

    wire.hiccup(&mut publisher, &mut subscriber);

    // the old pipe's rules die with it and the replay brings them back
    assert_eq!(
        events(&mut publisher),
        vec![
            SubscriptionFrame::unsubscribe(FilterMethod::PREFIX, "kept"),
            SubscriptionFrame::subscribe(FilterMethod::PREFIX, "kept"),
        ]
    );
    assert_eq!(publisher.filters().rule_count(), 1);

    publisher.send(Frame::new("kept")).expect("publish");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(received_payloads(&mut subscriber), vec![b"kept".to_vec()]);

    subscriber.unsubscribe(b"kept").expect("unsubscribe");
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(
        events(&mut publisher),
        vec![SubscriptionFrame::unsubscribe(FilterMethod::PREFIX, "kept")]
    );
    assert_eq!(publisher.filters().rule_count(), 0);

    publisher.send(Frame::new("kept")).expect("publish");
    wire.pump(&mut publisher, &mut subscriber);
    assert!(received_payloads(&mut subscriber).is_empty());
}
