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

//! Subscriber-side actor.

use std::sync::Arc;
use tracing::{debug, trace, warn, Level};

use crate::config::SocketConfig;
use crate::data_plane::{Distributor, FairQueue};
use crate::error::{PubSubError, Result};
use crate::filter::{FilterRegistry, FilterTable, RuleTransition};
use crate::frame::Frame;
use crate::observability::{events, fields};
use crate::pipe::{PeerId, Pipe, PipeTable};
use crate::socket::SocketActor;
use crate::subscription_codec::{encode_subscription, SubscriptionCommand, SubscriptionFrame};

const COMPONENT: &str = "xsub";

/// Sends subscriptions upstream and receives the matching traffic.
///
/// The owner sends encoded subscribe/unsubscribe frames. Only the first subscribe
/// of a rule and its last unsubscribe travel upstream; every attached peer also gets
/// the full rule set replayed when it attaches or reconnects. With filtering on,
/// inbound messages whose first frame matches no local rule are dropped whole.
#[derive(Debug)]
pub struct XSub {
    filters: FilterTable,
    pipes: PipeTable,
    dist: Distributor,
    fq: FairQueue,
    filtering: bool,
    // first frame of the next message, read ahead by `has_inbound_data`
    read_ahead: Option<(PeerId, Frame)>,
    // sender of the message the owner is part way through
    in_message: Option<PeerId>,
}

impl XSub {
    pub fn new(config: &SocketConfig) -> Self {
        Self::with_registry(config, Arc::new(FilterRegistry::default()))
    }

    pub fn with_registry(config: &SocketConfig, registry: Arc<FilterRegistry>) -> Self {
        Self {
            filters: FilterTable::new(registry),
            pipes: PipeTable::new(),
            dist: Distributor::new(),
            fq: FairQueue::new(),
            filtering: config.xsub.filter,
            read_ahead: None,
            in_message: None,
        }
    }

    pub(crate) fn force_filtering(&mut self) {
        self.filtering = true;
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    pub fn peer_count(&self) -> usize {
        self.pipes.len()
    }

    fn replay(&mut self, peer: PeerId) {
        let Some(pipe) = self.pipes.get_mut(peer) else {
            debug!(
                event = events::PEER_UNKNOWN,
                component = COMPONENT,
                peer = %peer,
                "replay requested for unknown peer"
            );
            return;
        };

        let mut frames = Vec::with_capacity(self.filters.rule_count());
        self.filters.for_each_rule(&mut |rule, method| {
            frames.push(Frame::new(encode_subscription(
                SubscriptionCommand::Subscribe,
                method,
                rule,
            )));
        });

        // the whole rule set goes out even past the high-water mark; what does
        // not fit now is flushed on write activation
        let total = frames.len();
        let written = frames
            .into_iter()
            .take_while(|frame| pipe.force_write(frame.clone()))
            .count();
        pipe.flush();

        if written < total {
            warn!(
                event = events::SUBSCRIPTION_REPLAY,
                component = COMPONENT,
                peer = %peer,
                rules = total,
                written,
                "replay cut short by terminated pipe"
            );
            return;
        }
        debug!(
            event = events::SUBSCRIPTION_REPLAY,
            component = COMPONENT,
            peer = %peer,
            rules = total,
            backlog = pipe.staged_len(),
            "replayed subscriptions"
        );
    }

    fn forward_subscription(&mut self, frame: Frame) -> Result<()> {
        let subscription = SubscriptionFrame::decode_frame(&frame)?;
        let method = subscription.method();
        let filter = self.filters.filter_mut(method);
        let transition = match subscription.command() {
            SubscriptionCommand::Subscribe => {
                filter.add_rule(subscription.rule(), PeerId::LOCAL)
            }
            SubscriptionCommand::Unsubscribe => {
                filter.remove_rule(subscription.rule(), PeerId::LOCAL)
            }
        };

        if !transition.changes_rule_liveness() {
            let event = if transition == RuleTransition::Unknown {
                events::SUBSCRIPTION_UNKNOWN
            } else {
                events::SUBSCRIPTION_DUPLICATE
            };
            trace!(
                event,
                component = COMPONENT,
                method = %method,
                ?transition,
                "suppressing subscription that does not change rule liveness"
            );
            return Ok(());
        }

        // always forwarded as a single final frame
        let upstream = Frame::new(frame.into_bytes());
        let delivered = self.dist.send_to_all(&upstream, &mut self.pipes);
        if tracing::enabled!(Level::DEBUG) {
            debug!(
                event = events::SUBSCRIPTION_FORWARDED,
                component = COMPONENT,
                method = %method,
                rule = fields::format_rule(subscription.rule()).as_str(),
                command = ?subscription.command(),
                delivered,
                "forwarded subscription upstream"
            );
        }
        Ok(())
    }

    // Hands a frame to the owner, remembering the sender while the message is open.
    fn deliver(&mut self, peer: PeerId, frame: Frame) -> Frame {
        self.in_message = frame.more().then_some(peer);
        frame
    }

    fn wanted(&self, frame: &Frame) -> bool {
        !self.filtering || self.filters.matches(frame.data())
    }

    // Discards the continuation frames of a message whose first frame was rejected.
    fn discard_rest(&mut self, first: Frame) {
        let mut dropped = 1usize;
        let mut more = first.more();
        while more {
            match self.fq.recv(&mut self.pipes) {
                Some((_, frame)) => {
                    dropped += 1;
                    more = frame.more();
                }
                None => break,
            }
        }
        trace!(
            event = events::INBOUND_DROPPED,
            component = COMPONENT,
            frames = dropped,
            reason = fields::REASON_NO_MATCH,
            "dropped message matching no local rule"
        );
    }
}

impl Default for XSub {
    fn default() -> Self {
        Self::new(&SocketConfig::default())
    }
}

impl SocketActor for XSub {
    fn attach_peer(&mut self, pipe: Pipe) -> PeerId {
        let peer = self.pipes.insert(pipe);
        self.fq.attach(peer);
        self.dist.attach(peer);
        debug!(
            event = events::PEER_ATTACHED,
            component = COMPONENT,
            peer = %peer,
            "peer attached"
        );
        self.replay(peer);
        peer
    }

    fn read_activated(&mut self, peer: PeerId) {
        self.fq.activated(peer);
    }

    fn write_activated(&mut self, peer: PeerId) {
        if let Some(pipe) = self.pipes.get_mut(peer) {
            pipe.flush();
        }
        self.dist.activated(peer);
    }

    fn hiccuped(&mut self, peer: PeerId) {
        debug!(
            event = events::PEER_HICCUPED,
            component = COMPONENT,
            peer = %peer,
            "peer reconnected"
        );
        self.replay(peer);
    }

    fn peer_terminated(&mut self, peer: PeerId) {
        // the rest of a message cut short by its sender never arrives
        if self.in_message == Some(peer) {
            self.in_message = None;
        }
        if matches!(&self.read_ahead, Some((from, frame)) if *from == peer && frame.more()) {
            self.read_ahead = None;
        }
        self.fq.terminated(peer);
        self.dist.terminated(peer);
        match self.pipes.remove(peer) {
            Some(mut pipe) => {
                pipe.terminate();
                debug!(
                    event = events::PEER_TERMINATED,
                    component = COMPONENT,
                    peer = %peer,
                    reason = fields::REASON_PEER_DEPARTED,
                    "peer terminated"
                );
            }
            None => debug!(
                event = events::PEER_UNKNOWN,
                component = COMPONENT,
                peer = %peer,
                "termination of unknown peer"
            ),
        }
    }

    fn send(&mut self, frame: Frame) -> Result<()> {
        self.forward_subscription(frame)
    }

    fn receive(&mut self) -> Result<Frame> {
        if let Some((peer, frame)) = self.read_ahead.take() {
            return Ok(self.deliver(peer, frame));
        }

        loop {
            let Some((peer, frame)) = self.fq.recv(&mut self.pipes) else {
                return Err(PubSubError::WouldBlock);
            };

            // continuation frames follow the decision made on the first frame
            if self.in_message.is_some() || self.wanted(&frame) {
                return Ok(self.deliver(peer, frame));
            }
            self.discard_rest(frame);
        }
    }

    fn has_outbound_capacity(&mut self) -> bool {
        self.dist.has_out()
    }

    fn has_inbound_data(&mut self) -> bool {
        if self.in_message.is_some() || self.read_ahead.is_some() {
            return true;
        }

        while let Some((peer, frame)) = self.fq.recv(&mut self.pipes) {
            if self.wanted(&frame) {
                trace!(
                    event = events::INBOUND_READ_AHEAD,
                    component = COMPONENT,
                    peer = %peer,
                    "cached first frame of next message"
                );
                self.read_ahead = Some((peer, frame));
                return true;
            }
            self.discard_rest(frame);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::XSub;
    use crate::config::SocketConfig;
    use crate::error::PubSubError;
    use crate::frame::Frame;
    use crate::pipe::Pipe;
    use crate::socket::SocketActor;
    use crate::subscription_codec::{FilterMethod, SubscriptionFrame};

    fn filtering() -> XSub {
        let mut config = SocketConfig::default();
        config.xsub.filter = true;
        XSub::new(&config)
    }

    fn upstream(pipe: &mut Pipe) -> Vec<SubscriptionFrame> {
        std::iter::from_fn(|| pipe.read())
            .map(|frame| SubscriptionFrame::decode_frame(&frame).expect("subscription frame"))
            .collect()
    }

    fn publish(pipe: &mut Pipe, frames: &[Frame]) {
        for frame in frames {
            assert!(pipe.write(frame.clone()));
        }
        pipe.flush();
    }

    #[test]
    fn duplicate_requests_are_not_forwarded() {
        let mut xsub = XSub::default();
        let (local, mut remote) = Pipe::pair(16);
        xsub.attach_peer(local);

        let subscribe = SubscriptionFrame::subscribe(FilterMethod::PREFIX, "a");
        let unsubscribe = SubscriptionFrame::unsubscribe(FilterMethod::PREFIX, "a");

        xsub.send(subscribe.encode()).expect("subscribe");
        xsub.send(subscribe.encode()).expect("duplicate subscribe");
        assert_eq!(upstream(&mut remote), vec![subscribe.clone()]);

        xsub.send(unsubscribe.encode()).expect("unsubscribe");
        assert!(upstream(&mut remote).is_empty());
        xsub.send(unsubscribe.encode()).expect("last unsubscribe");
        assert_eq!(upstream(&mut remote), vec![unsubscribe]);

        // an unsubscribe too many stays local
        xsub.send(SubscriptionFrame::unsubscribe(FilterMethod::PREFIX, "a").encode())
            .expect("extra unsubscribe");
        assert!(upstream(&mut remote).is_empty());
    }

    #[test]
    fn malformed_requests_are_rejected() {
        let mut xsub = XSub::default();

        assert!(matches!(
            xsub.send(Frame::new(&b"\x00\x01\x00"[..])),
            Err(PubSubError::InvalidArgument(_))
        ));
        assert!(matches!(
            xsub.send(Frame::new(&b"\x00\x02\x00\x00abc"[..])),
            Err(PubSubError::InvalidArgument(_))
        ));
        assert_eq!(xsub.filters().rule_count(), 0);
    }

    #[test]
    fn rules_are_replayed_on_attach_and_hiccup() {
        let mut xsub = XSub::default();
        xsub.send(SubscriptionFrame::subscribe(FilterMethod::PREFIX, "p").encode())
            .expect("prefix subscribe");
        xsub.send(SubscriptionFrame::subscribe(FilterMethod::EXACT, "e").encode())
            .expect("exact subscribe");

        let (local, mut remote) = Pipe::pair(16);
        let peer = xsub.attach_peer(local);
        let expected = vec![
            SubscriptionFrame::subscribe(FilterMethod::PREFIX, "p"),
            SubscriptionFrame::subscribe(FilterMethod::EXACT, "e"),
        ];
        assert_eq!(upstream(&mut remote), expected);

        xsub.hiccuped(peer);
        assert_eq!(upstream(&mut remote), expected);
    }

    #[test]
    fn unfiltered_xsub_delivers_everything() {
        let mut xsub = XSub::default();
        assert!(!xsub.is_filtering());
        let (local, mut remote) = Pipe::pair(16);
        xsub.attach_peer(local);

        publish(&mut remote, &[Frame::new("anything")]);
        assert_eq!(xsub.receive().expect("delivered").data(), b"anything");
        assert!(xsub.receive().unwrap_err().is_would_block());
    }

    #[test]
    fn filtered_xsub_drops_unmatched_messages_whole() {
        let mut xsub = filtering();
        xsub.send(SubscriptionFrame::subscribe(FilterMethod::PREFIX, "keep").encode())
            .expect("subscribe");
        let (local, mut remote) = Pipe::pair(16);
        xsub.attach_peer(local);

        publish(
            &mut remote,
            &[
                Frame::with_more("drop"),
                Frame::new("keep-looking-part"),
                Frame::with_more("keep/1"),
                Frame::new("tail"),
            ],
        );

        assert_eq!(xsub.receive().expect("first frame").data(), b"keep/1");
        assert_eq!(xsub.receive().expect("continuation").data(), b"tail");
        assert!(xsub.receive().unwrap_err().is_would_block());
    }

    #[test]
    fn replay_larger_than_high_water_mark_is_delivered_in_full() {
        let mut xsub = XSub::default();
        let rules = ["r1", "r2", "r3", "r4"];
        for rule in rules {
            xsub.send(SubscriptionFrame::subscribe(FilterMethod::PREFIX, rule).encode())
                .expect("subscribe");
        }

        let (local, mut remote) = Pipe::pair(2);
        let peer = xsub.attach_peer(local);

        let mut replayed = upstream(&mut remote);
        assert_eq!(replayed.len(), 2);
        xsub.write_activated(peer);
        replayed.extend(upstream(&mut remote));
        replayed.sort_by(|left, right| left.rule().cmp(right.rule()));

        let expected: Vec<_> = rules
            .iter()
            .map(|rule| SubscriptionFrame::subscribe(FilterMethod::PREFIX, *rule))
            .collect();
        assert_eq!(replayed, expected);
    }

    #[test]
    fn message_cut_short_by_departed_peer_does_not_bypass_filter() {
        let mut xsub = filtering();
        xsub.send(SubscriptionFrame::subscribe(FilterMethod::PREFIX, "keep").encode())
            .expect("subscribe");
        let (a_local, mut a_remote) = Pipe::pair(16);
        let (b_local, mut b_remote) = Pipe::pair(16);
        let a = xsub.attach_peer(a_local);
        let b = xsub.attach_peer(b_local);
        upstream(&mut a_remote);
        upstream(&mut b_remote);

        publish(&mut a_remote, &[Frame::with_more("keep/1"), Frame::new("tail")]);
        xsub.read_activated(a);
        assert_eq!(xsub.receive().expect("first frame").data(), b"keep/1");

        xsub.peer_terminated(a);
        publish(&mut b_remote, &[Frame::new("unwanted"), Frame::new("keep/2")]);
        xsub.read_activated(b);

        assert_eq!(xsub.receive().expect("matched message").data(), b"keep/2");
        assert!(xsub.receive().unwrap_err().is_would_block());
    }

    #[test]
    fn read_ahead_of_departed_peer_is_discarded() {
        let mut xsub = filtering();
        xsub.send(SubscriptionFrame::subscribe(FilterMethod::PREFIX, "keep").encode())
            .expect("subscribe");
        let (a_local, mut a_remote) = Pipe::pair(16);
        let (b_local, mut b_remote) = Pipe::pair(16);
        let a = xsub.attach_peer(a_local);
        let b = xsub.attach_peer(b_local);

        publish(&mut a_remote, &[Frame::with_more("keep/1"), Frame::new("tail")]);
        xsub.read_activated(a);
        assert!(xsub.has_inbound_data());

        xsub.peer_terminated(a);
        assert!(!xsub.has_inbound_data());

        publish(&mut b_remote, &[Frame::new("unwanted")]);
        xsub.read_activated(b);
        assert!(xsub.receive().unwrap_err().is_would_block());
    }

    #[test]
    fn read_ahead_frame_is_delivered_first() {
        let mut xsub = filtering();
        xsub.send(SubscriptionFrame::subscribe(FilterMethod::EXACT, "hit").encode())
            .expect("subscribe");
        let (local, mut remote) = Pipe::pair(16);
        let peer = xsub.attach_peer(local);

        assert!(!xsub.has_inbound_data());
        publish(&mut remote, &[Frame::new("miss"), Frame::with_more("hit"), Frame::new("body")]);
        xsub.read_activated(peer);

        assert!(xsub.has_inbound_data());
        assert!(xsub.has_inbound_data());
        assert_eq!(xsub.receive().expect("cached").data(), b"hit");
        assert!(xsub.has_inbound_data());
        assert_eq!(xsub.receive().expect("continuation").data(), b"body");
        assert!(!xsub.has_inbound_data());
    }
}
