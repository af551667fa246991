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

//! Peer-handle keyed ownership of attached pipes.

use std::collections::HashMap;

use crate::pipe::{PeerId, Pipe};

/// Pipes attached to one socket actor, keyed by their peer handle.
///
/// Attach order is kept so that fan-out and replay visit peers deterministically.
#[derive(Debug, Default)]
pub struct PipeTable {
    pipes: HashMap<PeerId, Pipe>,
    order: Vec<PeerId>,
}

impl PipeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a pipe. Returns its peer handle.
    pub fn insert(&mut self, pipe: Pipe) -> PeerId {
        let peer = pipe.peer();
        if self.pipes.insert(peer, pipe).is_none() {
            self.order.push(peer);
        }
        peer
    }

    pub fn remove(&mut self, peer: PeerId) -> Option<Pipe> {
        let pipe = self.pipes.remove(&peer)?;
        self.order.retain(|attached| *attached != peer);
        Some(pipe)
    }

    pub fn get_mut(&mut self, peer: PeerId) -> Option<&mut Pipe> {
        self.pipes.get_mut(&peer)
    }

    pub fn contains(&self, peer: PeerId) -> bool {
        self.pipes.contains_key(&peer)
    }

    /// Peer handles in attach order.
    pub fn peers(&self) -> &[PeerId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
