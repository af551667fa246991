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


use integration_test_utils::{init_logging, received_payloads, Wire};
use pubsub_filter::{
    Frame, PubSubError, Pub, SocketActor, SocketOption, Sub, XPub,
};

const HWM: usize = 64;

#[test]
fn prefix_subscription_end_to_end() {
    init_logging();

    let mut publisher = Pub::default();
    let mut subscriber = Sub::default();
    let wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    subscriber.subscribe(b"a").expect("subscribe");
    wire.pump(&mut publisher, &mut subscriber);

    for topic in ["a", "abc", "def"] {
        publisher.send(Frame::new(topic)).expect("publish never fails");
    }
    wire.pump(&mut publisher, &mut subscriber);
    assert_eq!(
        received_payloads(&mut subscriber),
        vec![b"a".to_vec(), b"abc".to_vec()]
    );

    subscriber.unsubscribe(b"a").expect("unsubscribe");
    wire.pump(&mut publisher, &mut subscriber);

    publisher.send(Frame::new("a")).expect("publish never fails");
    wire.pump(&mut publisher, &mut subscriber);
    assert!(received_payloads(&mut subscriber).is_empty());
}

#[test]
fn exact_subscription_end_to_end() {
    init_logging();

    let mut publisher = XPub::default();
    let mut subscriber = Sub::default();
    let wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    subscriber
        .set_option(SocketOption::FilterMethod(1))
        .expect("exact matching");
    subscriber
        .set_option(SocketOption::Subscribe(b"abc"))
        .expect("subscribe");
    wire.pump(&mut publisher, &mut subscriber);

    for topic in ["ab", "abc", "abcd"] {
        publisher.send(Frame::new(topic)).expect("publish never fails");
    }
    wire.pump(&mut publisher, &mut subscriber);

    assert_eq!(received_payloads(&mut subscriber), vec![b"abc".to_vec()]);
}

#[test]
fn unknown_filter_method_leaves_state_untouched() {
    init_logging();

    let mut publisher = XPub::default();
    let mut subscriber = Sub::default();
    let wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    let result = subscriber.set_option(SocketOption::FilterMethod(0xdead_beef));
    assert!(matches!(result, Err(PubSubError::InvalidArgument(_))));

    // still prefix matching, and nothing went upstream
    subscriber.subscribe(b"x").expect("subscribe");
    wire.pump(&mut publisher, &mut subscriber);
    publisher.send(Frame::new("xyz")).expect("publish never fails");
    wire.pump(&mut publisher, &mut subscriber);

    assert_eq!(received_payloads(&mut subscriber), vec![b"xyz".to_vec()]);
    assert_eq!(publisher.pending_events(), 1);
}

#[test]
fn publishing_without_subscribers_is_silent() {
    init_logging();

    let mut publisher = Pub::default();
    let mut subscriber = Sub::default();
    let wire = Wire::connect(&mut publisher, &mut subscriber, HWM);

    assert!(publisher.has_outbound_capacity());
    publisher.send(Frame::new("nobody-listens")).expect("dropped, not failed");
    wire.pump(&mut publisher, &mut subscriber);

    assert!(!subscriber.has_inbound_data());
}
