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

//! Bounded single-producer/single-consumer pipe endpoints.

use std::collections::VecDeque;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::trace;

use crate::config::SocketConfig;
use crate::frame::Frame;
use crate::observability::events;
use crate::pipe::PeerId;

const COMPONENT: &str = "pipe";

/// One end of a bidirectional pipe.
///
/// Writes are staged locally and only become visible to the other end on
/// [`Pipe::flush`]. The staged backlog plus frames in flight never exceed the
/// high-water mark the pair was created with; a write beyond that fails instead
/// of blocking.
pub struct Pipe {
    peer: PeerId,
    outbound: Option<mpsc::Sender<Frame>>,
    inbound: mpsc::Receiver<Frame>,
    staged: VecDeque<Frame>,
    peer_gone: bool,
}

impl std::fmt::Debug for Pipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipe")
            .field("peer", &self.peer)
            .field("staged", &self.staged.len())
            .field("peer_gone", &self.peer_gone)
            .finish()
    }
}

impl Pipe {
    /// Creates two connected endpoints with `high_water_mark` frames of capacity in
    /// each direction.
    pub fn pair(high_water_mark: usize) -> (Pipe, Pipe) {
        let capacity = high_water_mark.max(1);
        let (left_tx, right_rx) = mpsc::channel(capacity);
        let (right_tx, left_rx) = mpsc::channel(capacity);

        (Pipe::new(left_tx, left_rx), Pipe::new(right_tx, right_rx))
    }

    pub fn pair_with_config(config: &SocketConfig) -> (Pipe, Pipe) {
        Pipe::pair(config.high_water_mark)
    }

    fn new(outbound: mpsc::Sender<Frame>, inbound: mpsc::Receiver<Frame>) -> Self {
        Self {
            peer: PeerId::next(),
            outbound: Some(outbound),
            inbound,
            staged: VecDeque::new(),
            peer_gone: false,
        }
    }

    /// Handle under which a socket actor refers to this endpoint.
    pub fn peer(&self) -> PeerId {
        self.peer
    }

    /// Reads the next frame sent by the other end, if any has been flushed.
    pub fn read(&mut self) -> Option<Frame> {
        match self.inbound.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.peer_gone = true;
                None
            }
        }
    }

    /// Returns `true` when a write would currently be accepted.
    pub fn check_write(&self) -> bool {
        match &self.outbound {
            Some(outbound) => self.staged.len() < outbound.capacity(),
            None => false,
        }
    }

    /// Stages a frame for the other end. Returns `false` when the pipe is full or
    /// terminated; the frame is dropped in that case.
    pub fn write(&mut self, frame: Frame) -> bool {
        if !self.check_write() {
            trace!(
                event = events::PIPE_FULL,
                component = COMPONENT,
                peer = %self.peer,
                staged = self.staged.len(),
                "pipe refused write"
            );
            return false;
        }
        self.staged.push_back(frame);
        true
    }

    /// Stages a frame regardless of the high-water mark. Frames that do not fit
    /// stay staged and go out on later flushes, in order. Returns `false` only when
    /// the pipe is terminated.
    pub fn force_write(&mut self, frame: Frame) -> bool {
        if self.outbound.is_none() {
            return false;
        }
        self.staged.push_back(frame);
        true
    }

    /// Number of frames written but not yet handed to the other end.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Publishes staged complete messages to the other end. A message becomes
    /// visible as a whole or not at all; frames of a message whose last frame has
    /// not been written yet stay staged.
    pub fn flush(&mut self) {
        let Some(outbound) = &self.outbound else {
            self.staged.clear();
            return;
        };

        while let Some(end) = self.staged.iter().position(|frame| !frame.more()) {
            let message_len = end + 1;
            if outbound.capacity() < message_len {
                break;
            }
            // capacity was checked above, so only a closed channel fails here
            let closed = self
                .staged
                .drain(..message_len)
                .any(|frame| outbound.try_send(frame).is_err());
            if closed {
                self.peer_gone = true;
                self.staged.clear();
                return;
            }
        }
    }

    /// Discards the staged frames of an unfinished message.
    pub fn rollback(&mut self) {
        while self.staged.back().is_some_and(Frame::more) {
            self.staged.pop_back();
        }
    }

    /// Returns `true` once the other end has gone away.
    pub fn is_peer_terminated(&self) -> bool {
        self.peer_gone
            || self
                .outbound
                .as_ref()
                .map_or(true, |outbound| outbound.is_closed())
    }

    /// Flushes what is staged and closes both directions.
    pub fn terminate(&mut self) {
        self.flush();
        self.outbound = None;
        self.inbound.close();
    }
}
