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

//! # pubsub-filter
//!
//! `pubsub-filter` is the subscription-filtering core of a publish/subscribe socket
//! layer. Subscribers register interest in topics by prefix or exact match; the
//! publisher side aggregates those rules per peer and decides, per message, which
//! peers receive it.
//!
//! Socket actors talk to each other over [`Pipe`] pairs. Subscriptions travel on the
//! same pipes as data, as 4-byte-header control frames (see [`SubscriptionFrame`]).
//!
//! ```
//! use pubsub_filter::{Frame, Pipe, Pub, SocketActor, Sub};
//!
//! let mut publisher = Pub::default();
//! let mut subscriber = Sub::default();
//!
//! let (upstream, downstream) = Pipe::pair(16);
//! let sub_peer = subscriber.attach_peer(upstream);
//! let pub_peer = publisher.attach_peer(downstream);
//!
//! subscriber.subscribe(b"a").unwrap();
//! publisher.read_activated(pub_peer);
//!
//! publisher.send(Frame::new("abc")).unwrap();
//! publisher.send(Frame::new("def")).unwrap();
//! subscriber.read_activated(sub_peer);
//!
//! assert_eq!(subscriber.receive().unwrap().data(), b"abc");
//! assert!(subscriber.receive().unwrap_err().is_would_block());
//! ```
//!
//! ## Internal architecture map
//!
//! - Codec: the subscribe/unsubscribe control frame format
//! - Filter engines: prefix trie, exact table and a coarse fallback for unknown
//!   methods, created lazily per socket through a method registry
//! - Pipe: bounded frame channels and peer handles
//! - Data plane: fan-out to matching peers and fair queueing across peers
//! - Sockets: XPUB/PUB aggregation and XSUB/SUB subscription handling
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber. Tests and
//! applications are responsible for one-time `tracing_subscriber` initialization.

pub mod config;
mod data_plane;
mod error;
pub mod filter;
mod frame;
#[doc(hidden)]
pub mod observability;
mod pipe;
mod socket;
mod subscription_codec;

pub use data_plane::{Distributor, FairQueue};
pub use error::{PubSubError, Result};
pub use frame::Frame;
pub use pipe::{PeerId, Pipe, PipeTable};
pub use socket::{Pub, SocketActor, SocketOption, Sub, XPub, XSub};
pub use subscription_codec::{
    encode_subscription, FilterMethod, SubscriptionCommand, SubscriptionFrame,
    SUBSCRIPTION_HEADER_LEN,
};
