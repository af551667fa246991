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

//! Publisher-side aggregator.

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn, Level};

use crate::config::SocketConfig;
use crate::data_plane::Distributor;
use crate::error::{PubSubError, Result};
use crate::filter::{FilterRegistry, FilterTable, RuleTransition};
use crate::frame::Frame;
use crate::observability::{events, fields};
use crate::pipe::{PeerId, Pipe, PipeTable};
use crate::socket::SocketActor;
use crate::subscription_codec::{
    encode_subscription, FilterMethod, SubscriptionCommand, SubscriptionFrame,
};

const COMPONENT: &str = "xpub";

/// Collects subscriptions from downstream peers and fans published messages out
/// to the peers whose rules match.
///
/// Unique subscribe and unsubscribe frames (the first subscribe of a rule and the
/// last unsubscribe) are queued for the owner, who reads them with
/// [`SocketActor::receive`]. A peer that departs produces one unsubscribe frame
/// per rule nobody else holds.
#[derive(Debug)]
pub struct XPub {
    filters: FilterTable,
    pipes: PipeTable,
    dist: Distributor,
    pending: VecDeque<Frame>,
    // the last published frame had its more flag set
    more: bool,
    surface_events: bool,
}

impl XPub {
    pub fn new(config: &SocketConfig) -> Self {
        Self::with_registry(config, Arc::new(FilterRegistry::default()))
    }

    /// Uses `registry` to build a filter for each method seen on the wire.
    pub fn with_registry(config: &SocketConfig, registry: Arc<FilterRegistry>) -> Self {
        Self {
            filters: FilterTable::new(registry),
            pipes: PipeTable::new(),
            dist: Distributor::new(),
            pending: VecDeque::new(),
            more: false,
            surface_events: config.xpub.surface_events,
        }
    }

    pub(crate) fn suppress_events(&mut self) {
        self.surface_events = false;
        self.pending.clear();
    }

    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// Number of queued subscription events not yet received by the owner.
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub fn peer_count(&self) -> usize {
        self.pipes.len()
    }

    fn drain_subscriptions(&mut self, peer: PeerId) {
        let Some(pipe) = self.pipes.get_mut(peer) else {
            debug!(
                event = events::PEER_UNKNOWN,
                component = COMPONENT,
                peer = %peer,
                "read activation for unknown peer"
            );
            return;
        };

        let frames: Vec<Frame> = std::iter::from_fn(|| pipe.read()).collect();
        for frame in frames {
            self.apply_subscription(peer, frame);
        }
    }

    fn apply_subscription(&mut self, peer: PeerId, frame: Frame) {
        let subscription = match SubscriptionFrame::decode_frame(&frame) {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(
                    event = events::SUBSCRIPTION_MALFORMED,
                    component = COMPONENT,
                    peer = %peer,
                    size = frame.size(),
                    err = %err,
                    "dropping malformed subscription frame"
                );
                return;
            }
        };

        let method = subscription.method();
        let filter = self.filters.filter_mut(method);
        let transition = match subscription.command() {
            SubscriptionCommand::Subscribe => filter.add_rule(subscription.rule(), peer),
            SubscriptionCommand::Unsubscribe => filter.remove_rule(subscription.rule(), peer),
        };
        log_transition(peer, method, subscription.rule(), transition);

        if transition.changes_rule_liveness() && self.surface_events {
            self.pending.push_back(Frame::new(frame.into_bytes()));
            trace!(
                event = events::SUBSCRIPTION_EVENT_QUEUED,
                component = COMPONENT,
                peer = %peer,
                pending = self.pending.len(),
                "queued subscription event for owner"
            );
        }
    }
}

fn log_transition(peer: PeerId, method: FilterMethod, rule: &[u8], transition: RuleTransition) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let rule = fields::format_rule(rule);
    match transition {
        RuleTransition::RuleCreated => debug!(
            event = events::SUBSCRIPTION_ADDED,
            component = COMPONENT,
            peer = %peer,
            method = %method,
            rule = rule.as_str(),
            "rule subscribed"
        ),
        RuleTransition::RuleRemoved => debug!(
            event = events::SUBSCRIPTION_REMOVED,
            component = COMPONENT,
            peer = %peer,
            method = %method,
            rule = rule.as_str(),
            "rule unsubscribed"
        ),
        RuleTransition::Unknown => debug!(
            event = events::SUBSCRIPTION_UNKNOWN,
            component = COMPONENT,
            peer = %peer,
            method = %method,
            rule = rule.as_str(),
            "ignoring unsubscribe of a rule the peer does not hold"
        ),
        RuleTransition::PeerAdded | RuleTransition::Counted | RuleTransition::PeerRemoved => {
            trace!(
                event = events::SUBSCRIPTION_DUPLICATE,
                component = COMPONENT,
                peer = %peer,
                method = %method,
                rule = rule.as_str(),
                ?transition,
                "rule liveness unchanged"
            )
        }
    }
}

impl Default for XPub {
    fn default() -> Self {
        Self::new(&SocketConfig::default())
    }
}

impl SocketActor for XPub {
    fn attach_peer(&mut self, pipe: Pipe) -> PeerId {
        let peer = self.pipes.insert(pipe);
        self.dist.attach(peer);
        debug!(
            event = events::PEER_ATTACHED,
            component = COMPONENT,
            peer = %peer,
            "peer attached"
        );

        // the peer may have queued subscriptions before the attach was processed
        self.drain_subscriptions(peer);
        peer
    }

    fn read_activated(&mut self, peer: PeerId) {
        self.drain_subscriptions(peer);
    }

    fn write_activated(&mut self, peer: PeerId) {
        self.dist.activated(peer);
    }

    fn peer_terminated(&mut self, peer: PeerId) {
        let Some(mut pipe) = self.pipes.remove(peer) else {
            debug!(
                event = events::PEER_UNKNOWN,
                component = COMPONENT,
                peer = %peer,
                "termination of unknown peer"
            );
            return;
        };
        pipe.terminate();
        self.dist.terminated(peer);

        let surface_events = self.surface_events;
        let pending = &mut self.pending;
        let mut removed = 0usize;
        self.filters.remove_peer(peer, &mut |rule, method| {
            removed += 1;
            if surface_events {
                pending.push_back(Frame::new(encode_subscription(
                    SubscriptionCommand::Unsubscribe,
                    method,
                    rule,
                )));
            }
        });

        let reason = if surface_events {
            fields::REASON_PEER_DEPARTED
        } else {
            fields::REASON_PURE_PUBLISHER
        };
        debug!(
            event = events::PEER_TERMINATED,
            component = COMPONENT,
            peer = %peer,
            removed_rules = removed,
            reason,
            "peer terminated"
        );
    }

    fn send(&mut self, frame: Frame) -> Result<()> {
        if !self.more {
            let dist = &mut self.dist;
            self.filters
                .match_peers(frame.data(), &mut |peer| dist.mark_matching(peer));
            trace!(
                event = events::PUBLISH_FANOUT,
                component = COMPONENT,
                matched = self.dist.matching_count(),
                size = frame.size(),
                "matched message against subscriptions"
            );
        }

        let more = frame.more();
        self.dist.send_to_matching(&frame, &mut self.pipes);
        if !more {
            self.dist.unmatch();
        }
        self.more = more;
        Ok(())
    }

    fn receive(&mut self) -> Result<Frame> {
        self.pending.pop_front().ok_or(PubSubError::WouldBlock)
    }

    fn has_outbound_capacity(&mut self) -> bool {
        self.dist.has_out()
    }

    fn has_inbound_data(&mut self) -> bool {
        !self.pending.is_empty()
    }
}
