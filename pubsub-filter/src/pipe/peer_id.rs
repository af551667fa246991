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

//! Opaque peer handles issued by the pipe layer.

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

// Zero is reserved for the local owner of a subscriber socket.
static NEXT_PEER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one attached pipe endpoint.
///
/// Handles come from a process-wide counter and are never reused, so a stale handle
/// can never alias a peer that attached later.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PeerId(u64);

impl PeerId {
    /// Handle under which a subscriber socket records its own rules.
    pub const LOCAL: PeerId = PeerId(0);

    pub(crate) fn next() -> Self {
        PeerId(NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for PeerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if *self == PeerId::LOCAL {
            write!(f, "peer-local")
        } else {
            write!(f, "peer-{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PeerId;

    #[test]
    fn issued_handles_are_unique_and_never_local() {
        let a = PeerId::next();
        let b = PeerId::next();

        assert_ne!(a, b);
        assert_ne!(a, PeerId::LOCAL);
        assert!(b > a);
        assert_eq!(PeerId::LOCAL.to_string(), "peer-local");
    }
}
