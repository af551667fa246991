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

//! One-way publisher front-end.

use std::sync::Arc;

use crate::config::SocketConfig;
use crate::error::{PubSubError, Result};
use crate::filter::{FilterRegistry, FilterTable};
use crate::frame::Frame;
use crate::pipe::{PeerId, Pipe};
use crate::socket::{SocketActor, XPub};

/// An [`XPub`] whose owner never sees subscription traffic. Subscriptions still
/// drive fan-out; they are just not surfaced.
#[derive(Debug)]
pub struct Pub {
    inner: XPub,
}

impl Pub {
    pub fn new(config: &SocketConfig) -> Self {
        Self::with_registry(config, Arc::new(FilterRegistry::default()))
    }

    pub fn with_registry(config: &SocketConfig, registry: Arc<FilterRegistry>) -> Self {
        let mut inner = XPub::with_registry(config, registry);
        inner.suppress_events();
        Self { inner }
    }

    pub fn filters(&self) -> &FilterTable {
        self.inner.filters()
    }
}

impl Default for Pub {
    fn default() -> Self {
        Self::new(&SocketConfig::default())
    }
}

impl SocketActor for Pub {
    fn attach_peer(&mut self, pipe: Pipe) -> PeerId {
        self.inner.attach_peer(pipe)
    }

    fn read_activated(&mut self, peer: PeerId) {
        self.inner.read_activated(peer);
    }

    fn write_activated(&mut self, peer: PeerId) {
        self.inner.write_activated(peer);
    }

    fn peer_terminated(&mut self, peer: PeerId) {
        self.inner.peer_terminated(peer);
    }

    fn send(&mut self, frame: Frame) -> Result<()> {
        self.inner.send(frame)
    }

    fn receive(&mut self) -> Result<Frame> {
        Err(PubSubError::NotSupported("receive on a PUB socket"))
    }

    fn has_outbound_capacity(&mut self) -> bool {
        self.inner.has_outbound_capacity()
    }

    fn has_inbound_data(&mut self) -> bool {
        false
    }
}
