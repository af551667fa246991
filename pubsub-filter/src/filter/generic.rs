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

//! Fallback engine for filter methods this build cannot match structurally.
//!
//! Rules are stored exactly like the exact engine so subscribe/unsubscribe
//! bookkeeping stays correct, but matching ignores the topic: every peer holding at
//! least one live rule under the method is reported. Unknown methods therefore
//! over-deliver rather than silently drop traffic.

use std::collections::HashMap;

use crate::filter::rule_book::RuleBook;
use crate::filter::{RuleTransition, SubscriptionFilter};
use crate::pipe::PeerId;
use crate::subscription_codec::FilterMethod;

#[derive(Debug)]
pub struct GenericFilter {
    method: FilterMethod,
    rules: RuleBook,
    // peer -> number of distinct rules it holds
    peer_rules: HashMap<PeerId, usize>,
}

impl GenericFilter {
    pub fn new(method: FilterMethod) -> Self {
        Self {
            method,
            rules: RuleBook::default(),
            peer_rules: HashMap::new(),
        }
    }

    fn track(&mut self, peer: PeerId, transition: RuleTransition) {
        match transition {
            RuleTransition::RuleCreated | RuleTransition::PeerAdded => {
                *self.peer_rules.entry(peer).or_insert(0) += 1;
            }
            RuleTransition::PeerRemoved | RuleTransition::RuleRemoved => {
                if let Some(count) = self.peer_rules.get_mut(&peer) {
                    *count -= 1;
                    if *count == 0 {
                        self.peer_rules.remove(&peer);
                    }
                }
            }
            RuleTransition::Counted | RuleTransition::Unknown => {}
        }
    }
}

impl SubscriptionFilter for GenericFilter {
    fn method(&self) -> FilterMethod {
        self.method
    }

    fn add_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        let transition = self.rules.add(rule, peer);
        self.track(peer, transition);
        transition
    }

    fn remove_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        let transition = self.rules.remove(rule, peer);
        self.track(peer, transition);
        transition
    }

    fn remove_peer(&mut self, peer: PeerId, on_removed: &mut dyn FnMut(&[u8], FilterMethod)) {
        let method = self.method;
        self.rules.remove_peer(peer, |rule, transition| {
            if transition == RuleTransition::RuleRemoved {
                on_removed(rule, method);
            }
        });
        self.peer_rules.remove(&peer);
    }

    fn match_peers(&self, _topic: &[u8], on_match: &mut dyn FnMut(PeerId)) {
        self.peer_rules.keys().copied().for_each(on_match);
    }

    fn matches(&self, _topic: &[u8]) -> bool {
        !self.peer_rules.is_empty()
    }

    fn for_each_rule(&self, visit: &mut dyn FnMut(&[u8], FilterMethod)) {
        for rule in self.rules.rules() {
            visit(rule, self.method);
        }
    }

    fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
