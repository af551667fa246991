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

//! Prefix filter: a multi-trie keyed by topic bytes.
//!
//! Each node stands for one consumed byte and records which peers hold a rule ending
//! exactly there. Children use a single-successor form while a node has at most one
//! child and switch to a dense run covering `[min, max]` of the used bytes once a
//! second child appears. Nodes are never shrunk or pruned on removal; emptied nodes
//! stay in place until the filter is dropped.

use std::mem;

use crate::filter::peer_refs::PeerRefs;
use crate::filter::{RuleTransition, SubscriptionFilter};
use crate::pipe::PeerId;
use crate::subscription_codec::FilterMethod;

#[derive(Debug, Default)]
struct TrieNode {
    subscribers: PeerRefs,
    children: Children,
}

#[derive(Debug, Default)]
enum Children {
    #[default]
    Empty,
    Single(u8, Box<TrieNode>),
    Dense {
        min: u8,
        slots: Vec<Option<Box<TrieNode>>>,
    },
}

fn byte_at(min: u8, offset: usize) -> u8 {
    (usize::from(min) + offset) as u8
}

impl Children {
    fn get(&self, byte: u8) -> Option<&TrieNode> {
        match self {
            Children::Empty => None,
            Children::Single(existing, node) => (*existing == byte).then_some(node.as_ref()),
            Children::Dense { min, slots } => byte
                .checked_sub(*min)
                .and_then(|offset| slots.get(usize::from(offset)))
                .and_then(|slot| slot.as_deref()),
        }
    }

    fn get_mut(&mut self, byte: u8) -> Option<&mut TrieNode> {
        match self {
            Children::Empty => None,
            Children::Single(existing, node) => (*existing == byte).then_some(node.as_mut()),
            Children::Dense { min, slots } => byte
                .checked_sub(*min)
                .and_then(|offset| slots.get_mut(usize::from(offset)))
                .and_then(|slot| slot.as_deref_mut()),
        }
    }

    /// Rebuilds the representation so that `byte` has a slot.
    fn admit(self, byte: u8) -> Children {
        match self {
            Children::Empty => Children::Single(byte, Box::default()),
            Children::Single(existing, node) if existing == byte => Children::Single(existing, node),
            Children::Single(existing, node) => {
                let min = existing.min(byte);
                let len = usize::from(existing.abs_diff(byte)) + 1;
                let mut slots: Vec<Option<Box<TrieNode>>> = Vec::with_capacity(len);
                slots.resize_with(len, || None);
                slots[usize::from(existing - min)] = Some(node);
                Children::Dense { min, slots }
            }
            Children::Dense { min, mut slots } => {
                if byte < min {
                    let gap = usize::from(min - byte);
                    slots.splice(0..0, std::iter::repeat_with(|| None).take(gap));
                    Children::Dense { min: byte, slots }
                } else {
                    let needed = usize::from(byte - min) + 1;
                    if needed > slots.len() {
                        slots.resize_with(needed, || None);
                    }
                    Children::Dense { min, slots }
                }
            }
        }
    }

    fn child_or_insert(&mut self, byte: u8) -> &mut TrieNode {
        let admitted = mem::take(self).admit(byte);
        *self = admitted;

        match self {
            Children::Single(_, node) => node.as_mut(),
            Children::Dense { min, slots } => slots[usize::from(byte - *min)]
                .get_or_insert_with(Box::default)
                .as_mut(),
            Children::Empty => unreachable!("admit always leaves a slot for the byte"),
        }
    }
}

/// Prefix-match filter engine.
#[derive(Debug, Default)]
pub struct PrefixFilter {
    root: TrieNode,
    live_rules: usize,
}

impl PrefixFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&mut self, transition: RuleTransition) -> RuleTransition {
        match transition {
            RuleTransition::RuleCreated => self.live_rules += 1,
            RuleTransition::RuleRemoved => self.live_rules -= 1,
            _ => {}
        }
        transition
    }
}

impl SubscriptionFilter for PrefixFilter {
    fn method(&self) -> FilterMethod {
        FilterMethod::PREFIX
    }

    fn add_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        let mut node = &mut self.root;
        for &byte in rule {
            node = node.children.child_or_insert(byte);
        }
        let transition = node.subscribers.add(peer);
        self.track(transition)
    }

    fn remove_rule(&mut self, rule: &[u8], peer: PeerId) -> RuleTransition {
        let mut node = &mut self.root;
        for &byte in rule {
            match node.children.get_mut(byte) {
                Some(next) => node = next,
                None => return RuleTransition::Unknown,
            }
        }
        let transition = node.subscribers.remove(peer);
        self.track(transition)
    }

    fn remove_peer(&mut self, peer: PeerId, on_removed: &mut dyn FnMut(&[u8], FilterMethod)) {
        let mut prefix = Vec::new();
        let mut dropped = 0;
        let mut stack: Vec<(usize, Option<u8>, &mut TrieNode)> = vec![(0, None, &mut self.root)];

        while let Some((depth, byte, node)) = stack.pop() {
            prefix.truncate(depth);
            if let Some(byte) = byte {
                prefix.push(byte);
            }

            let TrieNode {
                subscribers,
                children,
            } = node;

            if subscribers.remove_peer(peer) == Some(RuleTransition::RuleRemoved) {
                dropped += 1;
                on_removed(&prefix, FilterMethod::PREFIX);
            }

            let depth = prefix.len();
            match children {
                Children::Empty => {}
                Children::Single(byte, child) => stack.push((depth, Some(*byte), child.as_mut())),
                Children::Dense { min, slots } => {
                    for (offset, slot) in slots.iter_mut().enumerate().rev() {
                        if let Some(child) = slot {
                            stack.push((depth, Some(byte_at(*min, offset)), child.as_mut()));
                        }
                    }
                }
            }
        }

        self.live_rules -= dropped;
    }

    fn match_peers(&self, topic: &[u8], on_match: &mut dyn FnMut(PeerId)) {
        let mut node = &self.root;
        let mut rest = topic;
        loop {
            node.subscribers.peers().for_each(&mut *on_match);

            let Some((&byte, tail)) = rest.split_first() else {
                return;
            };
            match node.children.get(byte) {
                Some(next) => node = next,
                None => return,
            }
            rest = tail;
        }
    }

    fn matches(&self, topic: &[u8]) -> bool {
        let mut node = &self.root;
        let mut rest = topic;
        loop {
            if node.subscribers.is_live() {
                return true;
            }

            let Some((&byte, tail)) = rest.split_first() else {
                return false;
            };
            match node.children.get(byte) {
                Some(next) => node = next,
                None => return false,
            }
            rest = tail;
        }
    }

    fn for_each_rule(&self, visit: &mut dyn FnMut(&[u8], FilterMethod)) {
        let mut prefix = Vec::new();
        let mut stack: Vec<(usize, Option<u8>, &TrieNode)> = vec![(0, None, &self.root)];

        while let Some((depth, byte, node)) = stack.pop() {
            prefix.truncate(depth);
            if let Some(byte) = byte {
                prefix.push(byte);
            }

            if node.subscribers.is_live() {
                visit(&prefix, FilterMethod::PREFIX);
            }

            let depth = prefix.len();
            match &node.children {
                Children::Empty => {}
                Children::Single(byte, child) => stack.push((depth, Some(*byte), child.as_ref())),
                Children::Dense { min, slots } => {
                    for (offset, slot) in slots.iter().enumerate().rev() {
                        if let Some(child) = slot {
                            stack.push((depth, Some(byte_at(*min, offset)), child.as_ref()));
                        }
                    }
                }
            }
        }
    }

    fn rule_count(&self) -> usize {
        self.live_rules
    }
}
