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

//! Round-robin reading across attached peers.

use crate::frame::Frame;
use crate::pipe::{PeerId, PipeTable};

/// Reads from active peers in turn, keeping every multi-frame message contiguous.
///
/// A peer with nothing to read is parked until [`FairQueue::activated`] is called
/// for it.
#[derive(Debug, Default)]
pub struct FairQueue {
    // active peers occupy the first `active` slots
    peers: Vec<PeerId>,
    active: usize,
    current: usize,
    more: bool,
}

impl FairQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, peer: PeerId) {
        if self.peers.contains(&peer) {
            return;
        }
        self.peers.push(peer);
        let last = self.peers.len() - 1;
        self.peers.swap(self.active, last);
        self.active += 1;
    }

    /// The peer has data to read again.
    pub fn activated(&mut self, peer: PeerId) {
        let Some(index) = self.position(peer) else {
            return;
        };
        if index >= self.active {
            self.peers.swap(index, self.active);
            self.active += 1;
        }
    }

    pub fn terminated(&mut self, peer: PeerId) {
        let Some(mut index) = self.position(peer) else {
            return;
        };
        if index < self.active {
            // a message cut short by its sender cannot be resumed elsewhere
            if index == self.current {
                self.more = false;
            }
            self.active -= 1;
            self.peers.swap(index, self.active);
            index = self.active;
            if self.current >= self.active {
                self.current = 0;
            }
        }
        self.peers.remove(index);
    }

    /// Returns the next frame together with the peer it came from.
    pub fn recv(&mut self, pipes: &mut PipeTable) -> Option<(PeerId, Frame)> {
        while self.active > 0 {
            let peer = self.peers[self.current];
            let frame = pipes.get_mut(peer).and_then(|pipe| pipe.read());

            if let Some(frame) = frame {
                self.more = frame.more();
                if !self.more {
                    self.current = (self.current + 1) % self.active;
                }
                return Some((peer, frame));
            }

            self.more = false;
            self.active -= 1;
            self.peers.swap(self.current, self.active);
            if self.current == self.active {
                self.current = 0;
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn position(&self, peer: PeerId) -> Option<usize> {
        self.peers.iter().position(|attached| *attached == peer)
    }
}
