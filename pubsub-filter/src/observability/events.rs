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

//! Canonical structured event names used across `pubsub-filter`.

// Filter engine events.
pub const FILTER_CREATED: &str = "filter_created";
pub const FILTER_METHOD_CHANGED: &str = "filter_method_changed";

// Subscription lifecycle events.
pub const SUBSCRIPTION_ADDED: &str = "subscription_added";
pub const SUBSCRIPTION_REMOVED: &str = "subscription_removed";
pub const SUBSCRIPTION_DUPLICATE: &str = "subscription_duplicate";
pub const SUBSCRIPTION_UNKNOWN: &str = "subscription_unknown";
pub const SUBSCRIPTION_MALFORMED: &str = "subscription_malformed";
pub const SUBSCRIPTION_FORWARDED: &str = "subscription_forwarded";
pub const SUBSCRIPTION_REPLAY: &str = "subscription_replay";
pub const SUBSCRIPTION_EVENT_QUEUED: &str = "subscription_event_queued";

// Peer lifecycle events.
pub const PEER_ATTACHED: &str = "peer_attached";
pub const PEER_TERMINATED: &str = "peer_terminated";
pub const PEER_HICCUPED: &str = "peer_hiccuped";
pub const PEER_UNKNOWN: &str = "peer_unknown";

// Data path events.
pub const PUBLISH_FANOUT: &str = "publish_fanout";
pub const PIPE_FULL: &str = "pipe_full";
pub const INBOUND_DROPPED: &str = "inbound_dropped";
pub const INBOUND_READ_AHEAD: &str = "inbound_read_ahead";
