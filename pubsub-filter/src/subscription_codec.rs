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

//! Subscribe/unsubscribe control frames.
//!
//! A control frame shares the data channel with ordinary messages and is laid out as:
//!
//! | bytes  | content                                   |
//! |--------|-------------------------------------------|
//! | 0..2   | command id, big-endian (0 unsub, 1 sub)   |
//! | 2..4   | filter method tag, big-endian             |
//! | 4..    | rule payload (topic or prefix, may be "") |
//!
//! ```
//! use pubsub_filter::{FilterMethod, SubscriptionCommand, SubscriptionFrame};
//!
//! let frame = SubscriptionFrame::subscribe(FilterMethod::PREFIX, "weather.");
//! let wire = frame.encode();
//! assert_eq!(&wire.data()[..4], &[0, 1, 0, 0]);
//!
//! let decoded = SubscriptionFrame::decode(wire.data()).unwrap();
//! assert_eq!(decoded.command(), SubscriptionCommand::Subscribe);
//! assert_eq!(decoded.rule(), b"weather.");
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt::{self, Display, Formatter};

use crate::error::{PubSubError, Result};
use crate::frame::Frame;

/// Size of the fixed control-frame header.
pub const SUBSCRIPTION_HEADER_LEN: usize = 4;

/// Tag selecting the matching algorithm a rule is evaluated under.
///
/// Any value other than [`FilterMethod::PREFIX`] and [`FilterMethod::EXACT`] is carried
/// through unchanged and handled by the generic fallback filter.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FilterMethod(u16);

impl FilterMethod {
    pub const PREFIX: FilterMethod = FilterMethod(0);
    pub const EXACT: FilterMethod = FilterMethod(1);

    pub const fn new(tag: u16) -> Self {
        FilterMethod(tag)
    }

    pub const fn tag(self) -> u16 {
        self.0
    }

    /// Returns `true` for the methods this build matches structurally.
    pub fn is_known(self) -> bool {
        self == FilterMethod::PREFIX || self == FilterMethod::EXACT
    }
}

impl Display for FilterMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            FilterMethod::PREFIX => write!(f, "prefix"),
            FilterMethod::EXACT => write!(f, "exact"),
            FilterMethod(tag) => write!(f, "method-{tag:#06x}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SubscriptionCommand {
    Unsubscribe,
    Subscribe,
}

impl SubscriptionCommand {
    fn id(self) -> u16 {
        match self {
            SubscriptionCommand::Unsubscribe => 0,
            SubscriptionCommand::Subscribe => 1,
        }
    }

    fn from_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(SubscriptionCommand::Unsubscribe),
            1 => Some(SubscriptionCommand::Subscribe),
            _ => None,
        }
    }
}

/// Decoded subscribe/unsubscribe instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionFrame {
    command: SubscriptionCommand,
    method: FilterMethod,
    rule: Bytes,
}

impl SubscriptionFrame {
    pub fn new(command: SubscriptionCommand, method: FilterMethod, rule: impl Into<Bytes>) -> Self {
        Self {
            command,
            method,
            rule: rule.into(),
        }
    }

    pub fn subscribe(method: FilterMethod, rule: impl Into<Bytes>) -> Self {
        Self::new(SubscriptionCommand::Subscribe, method, rule)
    }

    pub fn unsubscribe(method: FilterMethod, rule: impl Into<Bytes>) -> Self {
        Self::new(SubscriptionCommand::Unsubscribe, method, rule)
    }

    pub fn command(&self) -> SubscriptionCommand {
        self.command
    }

    pub fn method(&self) -> FilterMethod {
        self.method
    }

    pub fn rule(&self) -> &[u8] {
        &self.rule
    }

    /// Parses a control frame, copying the rule payload.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (command, method) = Self::decode_header(data)?;
        Ok(Self {
            command,
            method,
            rule: Bytes::copy_from_slice(&data[SUBSCRIPTION_HEADER_LEN..]),
        })
    }

    /// Parses a control frame, sharing the rule payload with the frame.
    pub fn decode_frame(frame: &Frame) -> Result<Self> {
        let (command, method) = Self::decode_header(frame.data())?;
        Ok(Self {
            command,
            method,
            rule: frame.bytes().slice(SUBSCRIPTION_HEADER_LEN..),
        })
    }

    fn decode_header(data: &[u8]) -> Result<(SubscriptionCommand, FilterMethod)> {
        if data.len() < SUBSCRIPTION_HEADER_LEN {
            return Err(PubSubError::invalid_argument(format!(
                "subscription frame of {} bytes is shorter than the {SUBSCRIPTION_HEADER_LEN}-byte header",
                data.len()
            )));
        }

        let command_id = u16::from_be_bytes([data[0], data[1]]);
        let command = SubscriptionCommand::from_id(command_id).ok_or_else(|| {
            PubSubError::invalid_argument(format!("unknown subscription command id {command_id}"))
        })?;
        let method = FilterMethod(u16::from_be_bytes([data[2], data[3]]));

        Ok((command, method))
    }

    /// Serializes into a single final frame.
    pub fn encode(&self) -> Frame {
        Frame::new(encode_subscription(self.command, self.method, &self.rule))
    }
}

/// Builds the wire bytes of one control frame.
pub fn encode_subscription(
    command: SubscriptionCommand,
    method: FilterMethod,
    rule: &[u8],
) -> Bytes {
    let mut buf = BytesMut::with_capacity(SUBSCRIPTION_HEADER_LEN + rule.len());
    buf.put_u16(command.id());
    buf.put_u16(method.tag());
    buf.put_slice(rule);
    buf.freeze()
}
