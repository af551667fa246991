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

//! Ordered rule → peer refcount table shared by the exact and generic engines.

use std::collections::BTreeMap;

use crate::filter::peer_refs::PeerRefs;
use crate::filter::RuleTransition;
use crate::pipe::PeerId;

#[derive(Debug, Default)]
pub(crate) struct RuleBook {
    rules: BTreeMap<Vec<u8>, PeerRefs>,
}

impl RuleBook {
    pub(crate) fn add(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        match self.rules.get_mut(rule) {
            Some(refs) => refs.add(peer),
            None => self.rules.entry(rule.to_vec()).or_default().add(peer),
        }
    }

    pub(crate) fn remove(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        let Some(refs) = self.rules.get_mut(rule) else {
            return RuleTransition::Unknown;
        };

        let transition = refs.remove(peer);
        if transition == RuleTransition::RuleRemoved {
            self.rules.remove(rule);
        }
        transition
    }

    /// Forgets `peer` everywhere. `on_transition` sees every rule the peer held.
    pub(crate) fn remove_peer(
        &mut self,
        peer: PeerId,
        mut on_transition: impl FnMut(&[u8], RuleTransition),
    ) {
        self.rules.retain(|rule, refs| match refs.remove_peer(peer) {
            Some(transition) => {
                on_transition(rule, transition);
                transition != RuleTransition::RuleRemoved
            }
            None => true,
        });
    }

    pub(crate) fn get(&self, rule: &[u8]) -> Option<&PeerRefs> {
        self.rules.get(rule)
    }

    pub(crate) fn rules(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.rules.keys().map(Vec::as_slice)
    }

    pub(crate) fn len(&self) -> usize {
        self.rules.len()
    }
}
