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

//! Subscription filter engines.
//!
//! Every engine stores rules keyed by peer handle and answers the same questions:
//! which peers want a topic, does anybody want it, and which rules are live. The
//! publisher side asks for matching peers; the subscriber side records its own rules
//! under [`PeerId::LOCAL`] and only asks whether a topic matches at all.
//!
//! ```
//! use pubsub_filter::filter::{PrefixFilter, RuleTransition, SubscriptionFilter};
//! use pubsub_filter::PeerId;
//!
//! let mut filter = PrefixFilter::new();
//! assert_eq!(filter.add_rule(b"a", PeerId::LOCAL), RuleTransition::RuleCreated);
//! assert!(filter.matches(b"abc"));
//! assert!(!filter.matches(b"b"));
//! ```

mod exact;
mod generic;
mod peer_refs;
mod prefix;
mod registry;
mod rule_book;

pub use exact::ExactFilter;
pub use generic::GenericFilter;
pub use prefix::PrefixFilter;
pub use registry::{FilterConstructor, FilterRegistry, FilterTable};

use crate::pipe::PeerId;
use crate::subscription_codec::FilterMethod;

/// Effect of one add/remove call on a rule's refcounts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RuleTransition {
    /// No peer held the rule before this subscribe.
    RuleCreated,
    /// The peer now holds a rule other peers already held.
    PeerAdded,
    /// The (rule, peer) count moved but stayed above zero.
    Counted,
    /// The peer no longer holds the rule; other peers still do.
    PeerRemoved,
    /// The last holder of the rule is gone.
    RuleRemoved,
    /// Removal of a (rule, peer) pair that was not live. Nothing changed.
    Unknown,
}

impl RuleTransition {
    /// `true` for the 0→1 and 1→0 transitions of the rule as a whole.
    pub fn changes_rule_liveness(self) -> bool {
        matches!(self, RuleTransition::RuleCreated | RuleTransition::RuleRemoved)
    }

    /// `true` when the calling peer started or stopped holding the rule.
    pub fn changes_peer_liveness(self) -> bool {
        matches!(
            self,
            RuleTransition::RuleCreated
                | RuleTransition::PeerAdded
                | RuleTransition::PeerRemoved
                | RuleTransition::RuleRemoved
        )
    }
}

/// Capability set shared by every filter engine.
pub trait SubscriptionFilter: Send {
    /// Method tag whose rules this engine stores.
    fn method(&self) -> FilterMethod;

    /// Counts one subscribe of `rule` by `peer`.
    fn add_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition;

    /// Counts one unsubscribe of `rule` by `peer`. Unknown pairs are a no-op.
    fn remove_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition;

    /// Drops every rule held by `peer`, calling `on_removed` once for each rule that
    /// no peer holds afterwards.
    fn remove_peer(&mut self, peer: PeerId, on_removed: &mut dyn FnMut(&[u8], FilterMethod));

    /// Reports every peer interested in `topic`. A peer may be reported more than once.
    fn match_peers(&self, topic: &[u8], on_match: &mut dyn FnMut(PeerId));

    /// Returns `true` when any peer is interested in `topic`.
    fn matches(&self, topic: &[u8]) -> bool;

    /// Visits every live rule once.
    fn for_each_rule(&self, visit: &mut dyn FnMut(&[u8], FilterMethod));

    /// Number of distinct live rules.
    fn rule_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}
