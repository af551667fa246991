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

//! Owner-facing socket actors.
//!
//! Each actor is driven by its owner on a single thread: pipe notifications come in
//! through [`SocketActor::attach_peer`], [`SocketActor::read_activated`],
//! [`SocketActor::write_activated`] and [`SocketActor::peer_terminated`], and
//! application traffic through [`SocketActor::send`] and [`SocketActor::receive`].
//! No call blocks; "nothing to do right now" is reported as
//! [`PubSubError::WouldBlock`](crate::PubSubError::WouldBlock).

mod publisher;
mod sub;
mod xpub;
mod xsub;

pub use publisher::Pub;
pub use sub::{SocketOption, Sub};
pub use xpub::XPub;
pub use xsub::XSub;

use crate::error::Result;
use crate::frame::Frame;
use crate::pipe::{PeerId, Pipe};

/// Notifications and traffic a socket actor accepts from its owner.
pub trait SocketActor: Send {
    /// Takes ownership of a freshly connected pipe and returns its handle.
    fn attach_peer(&mut self, pipe: Pipe) -> PeerId;

    /// The peer has new inbound frames.
    fn read_activated(&mut self, peer: PeerId);

    /// The peer's pipe has room for writes again.
    fn write_activated(&mut self, peer: PeerId);

    /// The transport under the peer's pipe was re-established.
    fn hiccuped(&mut self, _peer: PeerId) {}

    /// The peer went away. Its pipe is closed and all of its state is dropped.
    fn peer_terminated(&mut self, peer: PeerId);

    fn send(&mut self, frame: Frame) -> Result<()>;

    fn receive(&mut self) -> Result<Frame>;

    fn has_outbound_capacity(&mut self) -> bool;

    fn has_inbound_data(&mut self) -> bool;
}
