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

//! Exact-match filter engine.

use crate::filter::rule_book::RuleBook;
use crate::filter::{RuleTransition, SubscriptionFilter};
use crate::pipe::PeerId;
use crate::subscription_codec::FilterMethod;

/// Matches a topic only when it is byte-for-byte equal to a stored rule.
#[derive(Debug, Default)]
pub struct ExactFilter {
    rules: RuleBook,
}

impl ExactFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionFilter for ExactFilter {
    fn method(&self) -> FilterMethod {
        FilterMethod::EXACT
    }

    fn add_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        self.rules.add(rule, peer)
    }

    fn remove_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        self.rules.remove(rule, peer)
    }

    fn remove_peer(&mut self, peer: PeerId, on_removed: &mut dyn FnMut(&[u8], FilterMethod)) {
        self.rules.remove_peer(peer, |rule, transition| {
            if transition == RuleTransition::RuleRemoved {
                on_removed(rule, FilterMethod::EXACT);
            }
        });
    }

    fn match_peers(&self, topic: &[u8], on_match: &mut dyn FnMut(PeerId)) {
        if let Some(refs) = self.rules.get(topic) {
            refs.peers().for_each(on_match);
        }
    }

    fn matches(&self, topic: &[u8]) -> bool {
        self.rules.get(topic).is_some()
    }

    fn for_each_rule(&self, visit: &mut dyn FnMut(&[u8], FilterMethod)) {
        for rule in self.rules.rules() {
            visit(rule, FilterMethod::EXACT);
        }
    }

    fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::ExactFilter;
    use crate::filter::{RuleTransition, SubscriptionFilter};
    use crate::pipe::PeerId;
    use crate::subscription_codec::FilterMethod;
    use std::collections::HashSet;

    #[test]
    fn only_equal_topics_match() {
        let mut filter = ExactFilter::new();
        filter.add_rule(b"abc", PeerId::LOCAL);

        assert!(filter.matches(b"abc"));
        assert!(!filter.matches(b"ab"));
        assert!(!filter.matches(b"abcd"));
        assert!(!filter.matches(b""));
    }

    #[test]
    fn empty_rule_matches_only_empty_topic() {
        let mut filter = ExactFilter::new();
        filter.add_rule(b"", PeerId::LOCAL);

        assert!(filter.matches(b""));
        assert!(!filter.matches(b"a"));
    }

    #[test]
    fn add_reports_new_rule_then_new_peer() {
        let p = PeerId::next();
        let q = PeerId::next();
        let mut filter = ExactFilter::new();

        assert_eq!(filter.add_rule(b"t", p), RuleTransition::RuleCreated);
        assert_eq!(filter.add_rule(b"t", p), RuleTransition::Counted);
        assert_eq!(filter.add_rule(b"t", q), RuleTransition::PeerAdded);
        assert_eq!(filter.rule_count(), 1);

        assert_eq!(filter.remove_rule(b"t", q), RuleTransition::PeerRemoved);
        assert_eq!(filter.remove_rule(b"t", p), RuleTransition::Counted);
        assert_eq!(filter.remove_rule(b"t", p), RuleTransition::RuleRemoved);
        assert_eq!(filter.remove_rule(b"t", p), RuleTransition::Unknown);
        assert!(filter.is_empty());
    }

    #[test]
    fn match_peers_reports_every_holder() {
        let p = PeerId::next();
        let q = PeerId::next();
        let mut filter = ExactFilter::new();
        filter.add_rule(b"t", p);
        filter.add_rule(b"t", q);
        filter.add_rule(b"u", q);

        let mut peers = HashSet::new();
        filter.match_peers(b"t", &mut |peer| {
            peers.insert(peer);
        });
        assert_eq!(peers, HashSet::from([p, q]));
    }

    #[test]
    fn remove_peer_reports_rules_left_without_holders() {
        let p = PeerId::next();
        let q = PeerId::next();
        let mut filter = ExactFilter::new();
        filter.add_rule(b"shared", p);
        filter.add_rule(b"shared", q);
        filter.add_rule(b"mine", p);

        let mut removed = Vec::new();
        filter.remove_peer(p, &mut |rule, method| {
            assert_eq!(method, FilterMethod::EXACT);
            removed.push(rule.to_vec());
        });

        assert_eq!(removed, vec![b"mine".to_vec()]);
        assert!(filter.matches(b"shared"));
        assert!(!filter.matches(b"mine"));
    }

    #[test]
    fn for_each_rule_visits_in_byte_order() {
        let mut filter = ExactFilter::new();
        filter.add_rule(b"b", PeerId::LOCAL);
        filter.add_rule(b"a", PeerId::LOCAL);
        filter.add_rule(b"a", PeerId::LOCAL);

        let mut seen = Vec::new();
        filter.for_each_rule(&mut |rule, _| seen.push(rule.to_vec()));
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}
