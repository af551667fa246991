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

//! Fan-out of outbound frames to attached peers.

use std::collections::HashMap;
use tracing::debug;

use crate::frame::Frame;
use crate::observability::events;
use crate::pipe::{PeerId, PipeTable};

const COMPONENT: &str = "distributor";

#[derive(Debug, Default)]
struct Slot {
    // the pipe has capacity as far as we know
    eligible: bool,
    // the pipe takes part in the message currently being sent
    active: bool,
    matching: bool,
}

/// Tracks which attached peers can be written to and which ones were selected for
/// the message in progress.
///
/// A peer that becomes writable in the middle of a multi-frame message only joins
/// from the next message on, so nobody ever sees a message without its first frame.
#[derive(Debug, Default)]
pub struct Distributor {
    slots: HashMap<PeerId, Slot>,
    order: Vec<PeerId>,
    more: bool,
}

impl Distributor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, peer: PeerId) {
        if self.slots.contains_key(&peer) {
            return;
        }
        self.slots.insert(
            peer,
            Slot {
                eligible: true,
                active: !self.more,
                matching: false,
            },
        );
        self.order.push(peer);
    }

    /// The peer's pipe has room again.
    pub fn activated(&mut self, peer: PeerId) {
        let more = self.more;
        if let Some(slot) = self.slots.get_mut(&peer) {
            slot.eligible = true;
            if !more {
                slot.active = true;
            }
        }
    }

    pub fn terminated(&mut self, peer: PeerId) {
        if self.slots.remove(&peer).is_some() {
            self.order.retain(|attached| *attached != peer);
        }
    }

    /// Selects `peer` for the message in progress. Inactive peers are ignored.
    pub fn mark_matching(&mut self, peer: PeerId) {
        if let Some(slot) = self.slots.get_mut(&peer) {
            if slot.active {
                slot.matching = true;
            }
        }
    }

    pub fn unmatch(&mut self) {
        for slot in self.slots.values_mut() {
            slot.matching = false;
        }
    }

    pub fn matching_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.matching).count()
    }

    /// Writes `frame` to every selected peer. Returns how many peers accepted it.
    ///
    /// A peer whose pipe is full loses the rest of the message and is skipped until
    /// [`Distributor::activated`] reports it writable again.
    pub fn send_to_matching(&mut self, frame: &Frame, pipes: &mut PipeTable) -> usize {
        let more = frame.more();
        let mut delivered = 0;

        for peer in &self.order {
            let Some(slot) = self.slots.get_mut(peer) else {
                continue;
            };
            if !slot.matching {
                continue;
            }

            let Some(pipe) = pipes.get_mut(*peer) else {
                continue;
            };
            if pipe.write(frame.clone()) {
                delivered += 1;
                if !more {
                    pipe.flush();
                }
            } else {
                pipe.rollback();
                slot.matching = false;
                slot.active = false;
                slot.eligible = false;
                debug!(
                    event = events::PIPE_FULL,
                    component = COMPONENT,
                    peer = %peer,
                    "dropping message for peer at high-water mark"
                );
            }
        }

        self.more = more;
        if !more {
            for slot in self.slots.values_mut() {
                slot.active = slot.eligible;
            }
        }

        delivered
    }

    /// Writes `frame` to every active peer.
    pub fn send_to_all(&mut self, frame: &Frame, pipes: &mut PipeTable) -> usize {
        for slot in self.slots.values_mut() {
            slot.matching = slot.active;
        }
        let delivered = self.send_to_matching(frame, pipes);
        if !frame.more() {
            self.unmatch();
        }
        delivered
    }

    /// Publishing never blocks: frames for full peers are dropped instead.
    pub fn has_out(&self) -> bool {
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
