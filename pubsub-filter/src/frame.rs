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

//! Message envelope carried through pipes and socket actors.

use bytes::Bytes;

/// One frame of a (possibly multi-frame) message.
///
/// Cloning a frame is cheap: the payload is reference counted, so fan-out to many
/// peers never copies the bytes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    data: Bytes,
    more: bool,
}

impl Frame {
    /// Creates a final (single or last) frame.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            more: false,
        }
    }

    /// Creates a frame that is followed by further frames of the same message.
    pub fn with_more(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            more: true,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when further frames of the same message follow.
    pub fn more(&self) -> bool {
        self.more
    }

    pub fn set_more(&mut self, more: bool) {
        self.more = more;
    }

    /// Gives up the frame, handing over its payload without copying.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub(crate) fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl From<&'static str> for Frame {
    fn from(data: &'static str) -> Self {
        Frame::new(Bytes::from_static(data.as_bytes()))
    }
}

impl From<Bytes> for Frame {
    fn from(data: Bytes) -> Self {
        Frame::new(data)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(data: Vec<u8>) -> Self {
        Frame::new(data)
    }
}
