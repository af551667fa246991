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


use pubsub_filter::{Frame, PeerId, Pipe, SocketActor};
use tracing::debug;

/// One pipe pair between a publishing actor and a subscribing actor, together
/// with the peer handle each side assigned to it.
///
/// Actors are passed in on every call so tests keep ownership of them; the wire
/// only remembers which handle belongs to which side.
#[derive(Clone, Copy, Debug)]
pub struct Wire {
    publisher_peer: PeerId,
    subscriber_peer: PeerId,
    high_water_mark: usize,
}

impl Wire {
    /// Connects the two actors with a pipe pair of `high_water_mark` frames per
    /// direction. The subscriber attaches first so its rule replay is already
    /// queued when the publisher attaches.
    pub fn connect(
        publisher: &mut dyn SocketActor,
        subscriber: &mut dyn SocketActor,
        high_water_mark: usize,
    ) -> Self {
        let (publisher_end, subscriber_end) = Pipe::pair(high_water_mark);
        let subscriber_peer = subscriber.attach_peer(subscriber_end);
        let publisher_peer = publisher.attach_peer(publisher_end);
        debug!(
            publisher_peer = %publisher_peer,
            subscriber_peer = %subscriber_peer,
            "wire connected"
        );

        Self {
            publisher_peer,
            subscriber_peer,
            high_water_mark,
        }
    }

    pub fn publisher_peer(&self) -> PeerId {
        self.publisher_peer
    }

    pub fn subscriber_peer(&self) -> PeerId {
        self.subscriber_peer
    }

    /// Delivers the activation notifications a transport would raise after
    /// traffic crossed the wire in either direction.
    pub fn pump(&self, publisher: &mut dyn SocketActor, subscriber: &mut dyn SocketActor) {
        publisher.read_activated(self.publisher_peer);
        publisher.write_activated(self.publisher_peer);
        subscriber.read_activated(self.subscriber_peer);
        subscriber.write_activated(self.subscriber_peer);
    }

    /// Simulates a reconnect of the transport. The publisher loses the old pipe
    /// together with every rule it carried and gets a fresh one; the subscriber
    /// replays its rules onto the new pipe.
    pub fn hiccup(&mut self, publisher: &mut dyn SocketActor, subscriber: &mut dyn SocketActor) {
        publisher.peer_terminated(self.publisher_peer);
        subscriber.peer_terminated(self.subscriber_peer);
        *self = Wire::connect(publisher, subscriber, self.high_water_mark);
        debug!(
            publisher_peer = %self.publisher_peer,
            subscriber_peer = %self.subscriber_peer,
            "wire reconnected"
        );
        self.pump(publisher, subscriber);
    }

    /// Tears the wire down on both sides.
    pub fn disconnect(self, publisher: &mut dyn SocketActor, subscriber: &mut dyn SocketActor) {
        subscriber.peer_terminated(self.subscriber_peer);
        publisher.peer_terminated(self.publisher_peer);
    }
}

/// Receives until the actor reports nothing left.
pub fn receive_all(actor: &mut dyn SocketActor) -> Vec<Frame> {
    std::iter::from_fn(|| actor.receive().ok()).collect()
}

/// Payloads of [`receive_all`].
pub fn received_payloads(actor: &mut dyn SocketActor) -> Vec<Vec<u8>> {
    receive_all(actor)
        .into_iter()
        .map(|frame| frame.data().to_vec())
        .collect()
}
