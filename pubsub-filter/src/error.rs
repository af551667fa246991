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

//! Error taxonomy shared by filters, codec and socket actors.

use thiserror::Error;

/// Failures surfaced to the owner of a socket actor.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum PubSubError {
    /// Malformed subscription frame or out-of-range option value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not available on this socket type.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// Nothing to receive, or no peer can currently take the frame. Poll again later.
    #[error("resource temporarily unavailable")]
    WouldBlock,

    #[error("configuration error: {0}")]
    Config(String),
}

impl PubSubError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        PubSubError::InvalidArgument(reason.into())
    }

    /// Returns `true` for the non-fatal "try again" condition.
    pub fn is_would_block(&self) -> bool {
        matches!(self, PubSubError::WouldBlock)
    }
}

pub type Result<T> = std::result::Result<T, PubSubError>;

#[cfg(test)]
mod tests {
    use super::PubSubError;

    #[test]
    fn display_includes_reason() {
        let err = PubSubError::invalid_argument("frame shorter than 4 bytes");
        assert_eq!(
            err.to_string(),
            "invalid argument: frame shorter than 4 bytes"
        );
        assert!(!err.is_would_block());
        assert!(PubSubError::WouldBlock.is_would_block());
    }
}
