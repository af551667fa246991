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

//! Per-rule peer refcounts.

use std::collections::HashMap;

use crate::filter::RuleTransition;
use crate::pipe::PeerId;

/// How many outstanding subscribes each peer holds for one rule.
#[derive(Debug, Default)]
pub(crate) struct PeerRefs {
    counts: HashMap<PeerId, u32>,
}

impl PeerRefs {
    pub(crate) fn add(&mut self, peer: PeerId) -> RuleTransition {
        let was_live = self.is_live();
        let count = self.counts.entry(peer).or_insert(0);
        *count += 1;

        match (*count, was_live) {
            (1, false) => RuleTransition::RuleCreated,
            (1, true) => RuleTransition::PeerAdded,
            _ => RuleTransition::Counted,
        }
    }

    pub(crate) fn remove(&mut self, peer: PeerId) -> RuleTransition {
        let Some(count) = self.counts.get_mut(&peer) else {
            return RuleTransition::Unknown;
        };

        *count -= 1;
        if *count > 0 {
            return RuleTransition::Counted;
        }

        self.counts.remove(&peer);
        self.dropped_transition()
    }

    /// Forgets `peer` regardless of its count. `None` when it held nothing.
    pub(crate) fn remove_peer(&mut self, peer: PeerId) -> Option<RuleTransition> {
        self.counts
            .remove(&peer)
            .map(|_| self.dropped_transition())
    }

    fn dropped_transition(&self) -> RuleTransition {
        if self.is_live() {
            RuleTransition::PeerRemoved
        } else {
            RuleTransition::RuleRemoved
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        !self.counts.is_empty()
    }

    pub(crate) fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.counts.keys().copied()
    }
}
